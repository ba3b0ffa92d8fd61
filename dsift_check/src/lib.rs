//! # dsift_check Library
//!
//! The `dsift_check` library is a regression harness for a dense SIFT
//! feature extractor. It loads a fixed image fixture, runs an extractor over
//! it, and compares the leading descriptor rows numerically against a stored
//! reference matrix within an absolute tolerance. The extraction algorithm
//! itself lives behind a trait; the crate only owns fixture loading, the
//! extractor seam, and the comparison.
//!
//! ## Overview of Modules
//!
//! - **`fixture`**: Resolves fixture names against an injected base
//!   directory, loads image files as `f32` matrices (RGB decode, red plane),
//!   and reads/writes stored descriptor matrices in a plain text format.
//!
//! - **`extractor`**: Defines the `DescriptorExtractor` trait (image in,
//!   one-descriptor-per-row matrix out) and `DenseSiftConfig`, the parameter
//!   block an extractor is built from. A config is pinned to one image shape.
//!
//! - **`comparison`**: The `ToleranceCheck` comparator. Compares the first
//!   `row_count` rows of two equal-width matrices elementwise against a
//!   strict absolute epsilon and reports the first violating cell, or a
//!   summary of the pass.
//!
//! - **`regression`**: Ties the above together: `RegressionCheck::run` does
//!   load, extract, load reference, compare, with optional per-phase timing
//!   gated on the `DSIFT_CHECK_PROFILE` environment variable. Also supports
//!   capturing a fresh reference matrix.
//!
//! - **`vlfeat`** (feature `vlfeat`): Raw bindings to the native VLFeat
//!   dense SIFT filter plus the safe `VlDenseSift` wrapper implementing
//!   `DescriptorExtractor`.
//!
//! - **`error`**: One `Error` enum for the whole crate and its `Result`
//!   alias.

pub mod comparison;
pub mod error;
pub mod extractor;
pub mod fixture;
pub mod regression;

// Conditional compilation for the native VLFeat backend
#[cfg(feature = "vlfeat")]
pub mod vlfeat;

pub use comparison::{CheckReport, ToleranceCheck, DEFAULT_EPSILON, DEFAULT_ROW_COUNT};
pub use error::{Error, Result};
pub use extractor::{DenseSiftConfig, DescriptorExtractor};
pub use fixture::FixtureDir;
pub use regression::{CaptureReport, RegressionCheck, RegressionReport};

#[cfg(feature = "vlfeat")]
pub use vlfeat::VlDenseSift;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
