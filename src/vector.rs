//! Native growable output vectors.
//!
//! Operations that report variable-length results (inlier masks, contours,
//! per-match costs) fill a native vector the facade creates beforehand. The
//! lifecycle is fixed: create, let the native call populate, drain into a
//! `Vec`, dispose exactly once via `Drop` — also on failure paths, where the
//! vector is dropped undrained.

use crate::error::Result;
use crate::geometry::Point2i;
use crate::handle::{ArrayHandle, InputArray, OutputArray};
use crate::native;

macro_rules! flat_vector {
    ($name:ident, $elem:ty, $create:ident, $release:ident, $size:ident, $copy:ident,
     $create_sym:expr) => {
        pub struct $name {
            handle: ArrayHandle,
        }

        impl $name {
            pub fn new() -> Result<Self> {
                let api = native::api()?;
                // SAFETY: plain allocation on the native side.
                let raw = unsafe { (api.$create)() };
                let handle = ArrayHandle::from_raw(raw);
                handle.require($create_sym)?;
                Ok(Self { handle })
            }

            pub fn len(&self) -> usize {
                let api = native::api().expect("vector outlived dispatch table");
                // SAFETY: handle is live until `Drop`.
                unsafe { (api.$size)(self.handle.as_ptr()) }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// Drains the native contents into a fixed-size result.
            pub fn to_vec(&self) -> Vec<$elem> {
                let len = self.len();
                let mut out = vec![<$elem>::default(); len];
                if len > 0 {
                    let api = native::api().expect("vector outlived dispatch table");
                    // SAFETY: `out` has exactly `len` elements and the
                    // native side copies no more than that.
                    unsafe { (api.$copy)(self.handle.as_ptr(), out.as_mut_ptr()) };
                }
                out
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                if let Ok(api) = native::api() {
                    // SAFETY: created by `new`, released exactly once.
                    unsafe { (api.$release)(self.handle.as_ptr()) };
                }
            }
        }

        impl InputArray for $name {
            fn input_array(&self) -> ArrayHandle {
                self.handle
            }
        }

        impl OutputArray for $name {
            fn output_array(&self) -> ArrayHandle {
                self.handle
            }
        }
    };
}

flat_vector!(
    VectorOfU8,
    u8,
    vec_u8_create,
    vec_u8_release,
    vec_u8_size,
    vec_u8_copy_data,
    native::sym::VEC_U8_CREATE
);

flat_vector!(
    VectorOfF32,
    f32,
    vec_f32_create,
    vec_f32_release,
    vec_f32_size,
    vec_f32_copy_data,
    native::sym::VEC_F32_CREATE
);

/// Vector of point polylines (chamfer contours).
pub struct VectorOfVectorOfPoint {
    handle: ArrayHandle,
}

impl VectorOfVectorOfPoint {
    pub fn new() -> Result<Self> {
        let api = native::api()?;
        // SAFETY: plain allocation on the native side.
        let raw = unsafe { (api.vec_vec_point_create)() };
        let handle = ArrayHandle::from_raw(raw);
        handle.require(native::sym::VEC_VEC_POINT_CREATE)?;
        Ok(Self { handle })
    }

    pub fn len(&self) -> usize {
        let api = native::api().expect("vector outlived dispatch table");
        // SAFETY: handle is live until `Drop`.
        unsafe { (api.vec_vec_point_size)(self.handle.as_ptr()) }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_vec(&self) -> Vec<Vec<Point2i>> {
        let api = native::api().expect("vector outlived dispatch table");
        let outer = self.len();
        let mut out = Vec::with_capacity(outer);
        for index in 0..outer {
            // SAFETY: `index < outer` and the inner buffer is sized to the
            // reported element count before the copy.
            let inner_len = unsafe { (api.vec_vec_point_size_at)(self.handle.as_ptr(), index) };
            let mut inner = vec![Point2i::default(); inner_len];
            if inner_len > 0 {
                // SAFETY: see above.
                unsafe {
                    (api.vec_vec_point_copy_at)(self.handle.as_ptr(), index, inner.as_mut_ptr())
                };
            }
            out.push(inner);
        }
        out
    }
}

impl Drop for VectorOfVectorOfPoint {
    fn drop(&mut self) {
        if let Ok(api) = native::api() {
            // SAFETY: created by `new`, released exactly once.
            unsafe { (api.vec_vec_point_release)(self.handle.as_ptr()) };
        }
    }
}

impl OutputArray for VectorOfVectorOfPoint {
    fn output_array(&self) -> ArrayHandle {
        self.handle
    }
}
