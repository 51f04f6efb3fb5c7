#![doc = include_str!("../README.md")]

// Public surface: the facade operations plus the container/handle types
// they consume.
pub mod error;
pub mod geometry;
pub mod handle;
pub mod lease;
pub mod mat;
pub mod native;
pub mod ops;
pub mod vector;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{Error, Result};
pub use crate::geometry::{Point2i, Point3f, Rect2i, Size2i};
pub use crate::handle::{ArrayHandle, InputArray, InputOutputArray, OutputArray};
pub use crate::lease::BufferLease;
pub use crate::mat::{Mat, MatDepth};
pub use crate::native::{init, init_with, install, LibraryConfig, NativeApi, LIBRARY_NAME};
pub use crate::vector::{VectorOfF32, VectorOfU8, VectorOfVectorOfPoint};

// --- Prelude ---------------------------------------------------------------

/// Everything a typical caller needs.
///
/// ```no_run
/// use cvextern::prelude::*;
///
/// # fn main() -> cvextern::Result<()> {
/// cvextern::init()?;
///
/// let src = [Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
/// let dst = src;
/// let estimate = estimate_affine_3d_points(&src, &dst, 3.0, 0.99)?;
/// println!("inliers: {}", estimate.inliers.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::geometry::{Point2i, Point3f, Rect2i, Size2i};
    pub use crate::handle::{InputArray, InputOutputArray, OutputArray};
    pub use crate::mat::{Mat, MatDepth};
    pub use crate::ops::calib3d::{estimate_affine_3d, estimate_affine_3d_points};
    pub use crate::ops::contrib::chamfer_matching;
    pub use crate::ops::core::{check_range, min_max_idx, solve_lp, sqrt};
    pub use crate::ops::imgproc::{
        adaptive_bilateral_filter, apply_color_map, clahe, filter_2d, grab_cut,
    };
    pub use crate::ops::photo::{fast_nl_means_denoising, fast_nl_means_denoising_colored};
    pub use crate::ops::video::calc_optical_flow_dual_tvl1;
}
