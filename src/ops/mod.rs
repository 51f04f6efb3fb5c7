//! The binding facade, grouped by native module.
//!
//! Every operation follows the same shape: resolve handles (null for absent
//! optional arguments), lease buffers the native side writes through,
//! marshal POD structures by address, dispatch through the process-wide
//! table, release scoped resources on every exit path, and forward the
//! native result unchanged.

pub mod calib3d;
pub mod contrib;
pub mod core;
pub mod imgproc;
pub mod photo;
pub mod video;
