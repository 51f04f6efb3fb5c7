//! Geometric estimation between point sets and calibration-pattern search.

use nalgebra::Matrix3x4;
use serde::Serialize;

use crate::error::Result;
use crate::geometry::{Point3f, Size2i};
use crate::handle::{InputArray, OutputArray};
use crate::lease::BufferLease;
use crate::mat::{Mat, MatDepth};
use crate::native::{self, sym};
use crate::vector::VectorOfU8;

/// Optimal affine transform between two 3-D point sets, over array handles.
///
/// `estimate` receives the 3x4 transform as 64-bit floats; `inliers` is a
/// per-point byte mask. Returns the native result value unchanged (nonzero
/// when an estimate was found).
pub fn estimate_affine_3d(
    src: &impl InputArray,
    dst: &impl InputArray,
    estimate: &impl OutputArray,
    inliers: &impl OutputArray,
    ransac_threshold: f64,
    confidence: f64,
) -> Result<i32> {
    let api = native::api()?;
    let src = src.input_array().require(sym::ESTIMATE_AFFINE_3D)?;
    let dst = dst.input_array().require(sym::ESTIMATE_AFFINE_3D)?;
    let estimate = estimate.output_array().require(sym::ESTIMATE_AFFINE_3D)?;
    let inliers = inliers.output_array().require(sym::ESTIMATE_AFFINE_3D)?;
    let mut status = 0i32;
    // SAFETY: all four handles are live for the duration of the call.
    let result = unsafe {
        (api.estimate_affine_3d)(
            src,
            dst,
            estimate,
            inliers,
            ransac_threshold,
            confidence,
            &mut status,
        )
    };
    native::check_status(sym::ESTIMATE_AFFINE_3D, status)?;
    Ok(result)
}

/// Affine estimate produced by [`estimate_affine_3d_points`].
#[derive(Clone, Debug, Serialize)]
pub struct AffineEstimate {
    /// Native result value of the underlying call.
    pub result: i32,
    /// Row-major `[R | t]` transform.
    pub transform: Matrix3x4<f64>,
    /// One flag per input point pair; nonzero marks an inlier.
    pub inliers: Vec<u8>,
}

/// Convenience overload of [`estimate_affine_3d`] over plain point slices.
///
/// Leases both slices, wraps them in temporary single-row 3-channel matrix
/// headers, allocates the estimate buffer and the inlier vector, delegates
/// to the handle-based shape, and drains the outputs before every temporary
/// is released. Mismatched slice lengths are the native side's to reject,
/// like any other shape error.
pub fn estimate_affine_3d_points(
    src: &[Point3f],
    dst: &[Point3f],
    ransac_threshold: f64,
    confidence: f64,
) -> Result<AffineEstimate> {
    let point_bytes = std::mem::size_of::<Point3f>();

    let src_lease = BufferLease::pin(src);
    let dst_lease = BufferLease::pin(dst);
    let mut estimate_data = [0f64; 12];
    let estimate_lease = BufferLease::pin_mut(&mut estimate_data);

    let src_mat = Mat::from_lease(
        1,
        src.len() as i32,
        MatDepth::F32,
        3,
        &src_lease,
        src.len() * point_bytes,
    )?;
    let dst_mat = Mat::from_lease(
        1,
        dst.len() as i32,
        MatDepth::F32,
        3,
        &dst_lease,
        dst.len() * point_bytes,
    )?;
    let estimate_mat = Mat::from_lease_mut(
        3,
        4,
        MatDepth::F64,
        1,
        &estimate_lease,
        4 * std::mem::size_of::<f64>(),
    )?;
    let inlier_vec = VectorOfU8::new()?;

    let result = estimate_affine_3d(
        &src_mat,
        &dst_mat,
        &estimate_mat,
        &inlier_vec,
        ransac_threshold,
        confidence,
    )?;
    let inliers = inlier_vec.to_vec();

    // Release the estimate header and its lease before reading the buffer.
    drop(inlier_vec);
    drop(estimate_mat);
    drop(estimate_lease);

    Ok(AffineEstimate {
        result,
        transform: Matrix3x4::from_row_slice(&estimate_data),
        inliers,
    })
}

/// Flags for [`find_circles_grid`]; combinable with `|`.
pub mod circles_grid {
    pub const SYMMETRIC: i32 = 1;
    pub const ASYMMETRIC: i32 = 2;
    pub const CLUSTERING: i32 = 4;
}

/// Locates a circle-grid calibration pattern of `pattern_size` circles.
///
/// `centers` receives the detected centers; the boolean result crosses the
/// boundary in the shim's one-byte width.
pub fn find_circles_grid(
    image: &impl InputArray,
    pattern_size: Size2i,
    centers: &impl OutputArray,
    flags: i32,
) -> Result<bool> {
    let api = native::api()?;
    let image = image.input_array().require(sym::FIND_CIRCLES_GRID)?;
    let centers = centers.output_array().require(sym::FIND_CIRCLES_GRID)?;
    let mut pattern = pattern_size;
    let mut status = 0i32;
    // SAFETY: handles are live for the call; `pattern` crosses by address.
    let found =
        unsafe { (api.find_circles_grid)(image, &mut pattern, centers, flags, &mut status) };
    native::check_status(sym::FIND_CIRCLES_GRID, status)?;
    Ok(native::from_cbool(found))
}
