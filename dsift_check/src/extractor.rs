use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// A dense feature extractor: maps a grayscale image to a matrix with one
/// descriptor per row.
///
/// The descriptor row order is defined by the implementation and must match
/// the order the reference matrix was captured with, otherwise a regression
/// comparison is meaningless.
pub trait DescriptorExtractor {
    /// Runs the extractor over `image` and returns the descriptor matrix.
    fn extract(&self, image: &DMatrix<f32>) -> Result<DMatrix<f32>>;
}

/// Parameters for a dense SIFT extractor, mirroring the constructor surface
/// of the VLFeat dense SIFT filter.
///
/// An extractor is built for a fixed image shape; applying it to an image of
/// any other shape is an error rather than a silent rescan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DenseSiftConfig {
    /// Number of image rows (height) the extractor is built for.
    pub rows: usize,
    /// Number of image columns (width) the extractor is built for.
    pub cols: usize,
    /// Sampling step of the dense grid, in pixels.
    pub step: usize,
    /// Side of one spatial bin of the descriptor, in pixels.
    pub block_size: usize,
    /// Use a flat rather than Gaussian weighting window.
    pub use_flat_window: bool,
    /// Gaussian window size override; `None` keeps the library default.
    pub window_size: Option<f64>,
}

impl DenseSiftConfig {
    /// Creates a configuration for a `rows` x `cols` image with the default
    /// grid step (5), block size (5) and Gaussian window.
    pub fn new(rows: usize, cols: usize) -> Self {
        DenseSiftConfig {
            rows,
            cols,
            step: 5,
            block_size: 5,
            use_flat_window: false,
            window_size: None,
        }
    }

    /// Checks that `image` has the shape this extractor was built for.
    pub fn check_geometry(&self, image: &DMatrix<f32>) -> Result<()> {
        if image.nrows() != self.rows || image.ncols() != self.cols {
            return Err(Error::GeometryMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                rows: image.nrows(),
                cols: image.ncols(),
            });
        }
        Ok(())
    }
}
