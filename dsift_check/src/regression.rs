use std::time::Instant;

use nalgebra::DMatrix;
use tracing::info;

use crate::comparison::ToleranceCheck;
use crate::error::{Error, Result};
use crate::extractor::DescriptorExtractor;
use crate::fixture::{FixtureDir, REFERENCE_IMAGE, REFERENCE_MATRIX};

/// Environment variable that turns on per-phase timing.
///
/// Any non-empty value enables it. Replaces the dead profiler hook of the
/// original harness with a plain flag.
pub const PROFILE_ENV: &str = "DSIFT_CHECK_PROFILE";

/// The regression: load the image fixture, run an extractor over it, and
/// compare the leading descriptor rows against the stored reference within
/// an absolute tolerance.
pub struct RegressionCheck {
    /// Where the fixture files live.
    pub fixtures: FixtureDir,
    /// Image fixture name, resolved under `fixtures`.
    pub image_file: String,
    /// Reference matrix fixture name, resolved under `fixtures`.
    pub reference_file: String,
    /// Row count and tolerance of the comparison.
    pub check: ToleranceCheck,
    /// Emit per-phase wall times through `tracing` when set.
    pub profile: bool,
}

/// Outcome of a passed regression run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionReport {
    /// Total descriptors the extractor produced (only the leading
    /// `rows_checked` of them were compared).
    pub descriptors_produced: usize,
    /// Rows that were compared against the reference.
    pub rows_checked: usize,
    /// Width of one descriptor.
    pub descriptor_width: usize,
    /// Largest absolute difference seen across all compared cells.
    pub max_delta: f32,
}

/// Outcome of a reference capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureReport {
    /// Descriptors written to the reference file.
    pub descriptors: usize,
    /// Width of one descriptor.
    pub descriptor_width: usize,
}

impl RegressionCheck {
    /// Creates the check with the conventional fixture names and the pinned
    /// row count and tolerance.
    pub fn new(fixtures: FixtureDir) -> Self {
        RegressionCheck {
            fixtures,
            image_file: REFERENCE_IMAGE.to_string(),
            reference_file: REFERENCE_MATRIX.to_string(),
            check: ToleranceCheck::default(),
            profile: profile_from_env(),
        }
    }

    /// Runs the regression with the given extractor.
    ///
    /// Nothing on disk is modified; every failure mode (missing fixture,
    /// shape mismatch, tolerance violation) surfaces as a typed error.
    pub fn run(&self, extractor: &dyn DescriptorExtractor) -> Result<RegressionReport> {
        let image = self.timed("load_image", || self.fixtures.load_image(&self.image_file))?;
        self.run_on(&image, extractor)
    }

    /// Like `run`, but against an already-loaded image.
    ///
    /// For callers that had to load the image anyway, typically to size the
    /// extractor, so the fixture is decoded once per invocation.
    pub fn run_on(
        &self,
        image: &DMatrix<f32>,
        extractor: &dyn DescriptorExtractor,
    ) -> Result<RegressionReport> {
        let produced = self.timed("extract", || extractor.extract(image))?;
        let reference = self.timed("load_reference", || {
            self.fixtures.load_matrix(&self.reference_file)
        })?;
        let report = self.timed("compare", || self.check.compare(&produced, &reference))?;

        Ok(RegressionReport {
            descriptors_produced: produced.nrows(),
            rows_checked: report.rows_checked,
            descriptor_width: report.descriptor_width,
            max_delta: report.max_delta,
        })
    }

    /// Captures a fresh reference: runs the extractor over the image fixture
    /// and writes the full descriptor matrix to the reference file.
    ///
    /// This is the only operation in the crate that writes to disk.
    pub fn capture(&self, extractor: &dyn DescriptorExtractor) -> Result<CaptureReport> {
        let image = self.timed("load_image", || self.fixtures.load_image(&self.image_file))?;
        self.capture_on(&image, extractor)
    }

    /// Like `capture`, but against an already-loaded image.
    pub fn capture_on(
        &self,
        image: &DMatrix<f32>,
        extractor: &dyn DescriptorExtractor,
    ) -> Result<CaptureReport> {
        let produced = self.timed("extract", || extractor.extract(image))?;
        if produced.nrows() == 0 {
            return Err(Error::EmptyOutput);
        }
        self.timed("save_reference", || {
            self.fixtures.save_matrix(&self.reference_file, &produced)
        })?;

        Ok(CaptureReport {
            descriptors: produced.nrows(),
            descriptor_width: produced.ncols(),
        })
    }

    fn timed<T>(&self, phase: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if !self.profile {
            return f();
        }
        let start = Instant::now();
        let result = f();
        info!(phase, elapsed_ms = start.elapsed().as_millis() as u64, "phase finished");
        result
    }
}

/// Reads the `DSIFT_CHECK_PROFILE` flag from the environment.
pub fn profile_from_env() -> bool {
    std::env::var(PROFILE_ENV).map(|v| !v.is_empty()).unwrap_or(false)
}
