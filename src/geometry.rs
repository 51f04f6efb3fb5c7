//! Plain-old-data value structures crossing the native boundary.
//!
//! Every type here is `#[repr(C)]` and passed by address so the native side
//! can read (and for some calls, write) the fields in place. Field order and
//! widths match the shim's `CvPoint`/`CvSize`/`CvRect`/`CvPoint3D32f`; the
//! load-time handshake in [`crate::native`] re-checks the sizes against the
//! running library.

use serde::{Deserialize, Serialize};

/// Integer point, e.g. a filter anchor or an out-of-range position.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Single-precision 3-D point, the element type of affine point sets.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3f {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer size (tile grids, kernel apertures, pattern sizes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size2i {
    pub width: i32,
    pub height: i32,
}

impl Size2i {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned integer rectangle (grab-cut initialization region).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect2i {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect2i {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
