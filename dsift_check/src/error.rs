//! Error type shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while loading fixtures, running the
/// extractor, or comparing descriptor matrices.
#[derive(Debug, Error)]
pub enum Error {
    /// The fixture file could not be read (missing, unreadable, ...).
    #[error("failed to read fixture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image fixture exists but could not be decoded.
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A stored matrix file contains something that is not a number,
    /// or its rows do not all have the same width.
    #[error("malformed matrix file {path}, line {line}: {reason}")]
    MalformedMatrix {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The extractor was configured for one image shape and handed another.
    #[error("extractor configured for {expected_rows}x{expected_cols} image, got {rows}x{cols}")]
    GeometryMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// The produced and reference matrices do not have the same width,
    /// so an elementwise comparison would be meaningless.
    #[error("descriptor width mismatch: produced {produced}, reference {reference}")]
    WidthMismatch { produced: usize, reference: usize },

    /// Fewer rows are available than the check wants to compare.
    /// Surfaced explicitly rather than silently truncating the check.
    #[error("{which} matrix has {available} rows, {requested} requested")]
    RowOutOfRange {
        which: &'static str,
        requested: usize,
        available: usize,
    },

    /// First cell where the produced value left the tolerance band.
    #[error(
        "descriptor mismatch at row {row}, column {col}: \
         |{produced} - {reference}| = {delta:e} >= {epsilon:e}"
    )]
    ToleranceExceeded {
        row: usize,
        col: usize,
        produced: f32,
        reference: f32,
        delta: f32,
        epsilon: f32,
    },

    /// The native extractor produced no descriptors at all.
    #[error("extractor returned an empty descriptor matrix")]
    EmptyOutput,
}
