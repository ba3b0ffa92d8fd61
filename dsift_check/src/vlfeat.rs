//! Raw bindings to the VLFeat dense SIFT filter and a safe wrapper around
//! them.
//!
//! Only compiled with the `vlfeat` feature, since it links against the native
//! `libvl`. The getter and setter functions of the C API are `VL_INLINE` and
//! therefore not exported symbols, so the filter struct layout is mirrored
//! here and its fields are written and read directly; only the `VL_EXPORT`
//! entry points are declared in the extern block. After writing parameters,
//! `_vl_dsift_update_buffers` (exported) must run so the filter's internal
//! allocations match the new geometry, exactly what the inline setters do.

use std::os::raw::{c_double, c_float, c_int};

use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::extractor::{DenseSiftConfig, DescriptorExtractor};

/// Descriptor geometry block of the filter (vl/dsift.h).
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct VlDsiftDescriptorGeometry {
    num_bin_t: c_int,
    num_bin_x: c_int,
    num_bin_y: c_int,
    bin_size_x: c_int,
    bin_size_y: c_int,
}

/// One keypoint of the dense grid (vl/dsift.h).
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(dead_code)]
struct VlDsiftKeypoint {
    x: c_double,
    y: c_double,
    s: c_double,
    norm: c_double,
}

/// Leading fields of `VlDsiftFilter_` (vl/dsift.h). Only the fields up to
/// the result pointers are mirrored; the trailing scratch buffers are never
/// touched from this side. The parameter fields are written at construction
/// time, the result fields read after processing, the rest exist for layout.
#[repr(C)]
#[allow(dead_code)]
struct VlDsiftFilter {
    im_width: c_int,
    im_height: c_int,
    step_x: c_int,
    step_y: c_int,
    bound_min_x: c_int,
    bound_min_y: c_int,
    bound_max_x: c_int,
    bound_max_y: c_int,
    geom: VlDsiftDescriptorGeometry,
    use_flat_window: c_int,
    window_size: c_double,
    num_frames: c_int,
    descr_size: c_int,
    frames: *mut VlDsiftKeypoint,
    descrs: *mut c_float,
}

#[link(name = "vl")]
extern "C" {
    fn vl_dsift_new(im_width: c_int, im_height: c_int) -> *mut VlDsiftFilter;
    fn vl_dsift_delete(filter: *mut VlDsiftFilter);
    fn vl_dsift_process(filter: *mut VlDsiftFilter, im: *const c_float);
    fn _vl_dsift_update_buffers(filter: *mut VlDsiftFilter);
}

/// Dense SIFT extractor backed by VLFeat.
///
/// Holds one `VlDsiftFilter` for the image shape given at construction time.
/// The filter is not thread-safe; the raw pointer keeps this type `!Send`.
pub struct VlDenseSift {
    config: DenseSiftConfig,
    filter: *mut VlDsiftFilter,
}

impl VlDenseSift {
    /// Creates a filter for the image shape and parameters in `config`.
    pub fn new(config: DenseSiftConfig) -> Self {
        // VLFeat takes (width, height); config carries (rows, cols).
        let filter = unsafe { vl_dsift_new(config.cols as c_int, config.rows as c_int) };
        assert!(!filter.is_null(), "vl_dsift_new returned null");

        unsafe {
            let f = &mut *filter;
            f.step_x = config.step as c_int;
            f.step_y = config.step as c_int;
            f.geom = VlDsiftDescriptorGeometry {
                num_bin_t: 8,
                num_bin_x: 4,
                num_bin_y: 4,
                bin_size_x: config.block_size as c_int,
                bin_size_y: config.block_size as c_int,
            };
            f.use_flat_window = config.use_flat_window as c_int;
            if let Some(window_size) = config.window_size {
                f.window_size = window_size;
            }
            // Resizes the internal buffers for the geometry and steps just
            // written; without this the filter stays sized for the
            // constructor defaults and vl_dsift_process writes out of
            // bounds. The inline C setters end with the same call.
            _vl_dsift_update_buffers(filter);
        }

        VlDenseSift { config, filter }
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &DenseSiftConfig {
        &self.config
    }
}

impl DescriptorExtractor for VlDenseSift {
    fn extract(&self, image: &DMatrix<f32>) -> Result<DMatrix<f32>> {
        self.config.check_geometry(image)?;

        // VLFeat wants the image as a row-major float buffer; nalgebra
        // stores column-major, so repack.
        let (rows, cols) = (image.nrows(), image.ncols());
        let mut buffer = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                buffer.push(image[(r, c)]);
            }
        }

        let (num_frames, descr_size, descrs) = unsafe {
            vl_dsift_process(self.filter, buffer.as_ptr());
            let filter = &*self.filter;
            (
                filter.num_frames as usize,
                filter.descr_size as usize,
                filter.descrs,
            )
        };
        if num_frames == 0 || descr_size == 0 || descrs.is_null() {
            return Err(Error::EmptyOutput);
        }

        // Descriptors are stored descriptor-major: descrs[frame * size + bin].
        let raw = unsafe { std::slice::from_raw_parts(descrs, num_frames * descr_size) };
        Ok(DMatrix::from_row_slice(num_frames, descr_size, raw))
    }
}

impl Drop for VlDenseSift {
    fn drop(&mut self) {
        unsafe { vl_dsift_delete(self.filter) };
    }
}
