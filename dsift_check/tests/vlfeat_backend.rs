//! Smoke tests for the native VLFeat backend.
//!
//! Built only with the `vlfeat` feature, so running them needs a libvl on
//! the link path. They pin down what the safe wrapper promises: the filter
//! picks up the configured geometry (descriptor width, grid step) and the
//! extraction is a pure function of the image.

#![cfg(feature = "vlfeat")]

use dsift_check::{DenseSiftConfig, DescriptorExtractor, VlDenseSift};
use nalgebra::DMatrix;

fn ramp_image(rows: usize, cols: usize) -> DMatrix<f32> {
    DMatrix::from_fn(rows, cols, |r, c| (r * cols + c) as f32 / (rows * cols) as f32)
}

#[test]
fn default_geometry_yields_128_wide_descriptors() {
    let extractor = VlDenseSift::new(DenseSiftConfig::new(48, 64));
    let out = extractor.extract(&ramp_image(48, 64)).unwrap();

    // 4 x 4 spatial bins x 8 orientation bins.
    assert_eq!(out.ncols(), 128);
    assert!(out.nrows() > 0);
}

#[test]
fn extraction_is_deterministic() {
    let extractor = VlDenseSift::new(DenseSiftConfig::new(48, 64));
    let image = ramp_image(48, 64);

    let first = extractor.extract(&image).unwrap();
    let second = extractor.extract(&image).unwrap();
    assert_eq!(first, second);
}

#[test]
fn configured_step_changes_the_grid_density() {
    let coarse = VlDenseSift::new(DenseSiftConfig::new(48, 64));

    let mut fine_config = DenseSiftConfig::new(48, 64);
    fine_config.step = 2;
    let fine = VlDenseSift::new(fine_config);

    let image = ramp_image(48, 64);
    let coarse_out = coarse.extract(&image).unwrap();
    let fine_out = fine.extract(&image).unwrap();

    assert!(fine_out.nrows() > coarse_out.nrows());
    assert_eq!(fine_out.ncols(), coarse_out.ncols());
}

#[test]
fn flat_window_extracts_different_values() {
    let mut flat_config = DenseSiftConfig::new(48, 64);
    flat_config.use_flat_window = true;
    let flat = VlDenseSift::new(flat_config);
    let gaussian = VlDenseSift::new(DenseSiftConfig::new(48, 64));

    let image = ramp_image(48, 64);
    let flat_out = flat.extract(&image).unwrap();
    let gaussian_out = gaussian.extract(&image).unwrap();

    assert_eq!(flat_out.nrows(), gaussian_out.nrows());
    assert_ne!(flat_out, gaussian_out);
}
