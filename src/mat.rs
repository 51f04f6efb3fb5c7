//! Matrix headers over externally leased memory.
//!
//! A [`Mat`] is a native `cv::Mat` header describing caller-owned storage:
//! the composed overloads lease a Rust buffer, wrap it in a header with an
//! explicit row stride, and hand the header's handle to an operation. The
//! header is released exactly once when the `Mat` drops; the storage stays
//! with the lease.

use std::marker::PhantomData;

use crate::error::Result;
use crate::handle::{ArrayHandle, InputArray, InputOutputArray, OutputArray};
use crate::lease::BufferLease;
use crate::native;

/// Element depth codes shared with the native side.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatDepth {
    U8 = 0,
    S8 = 1,
    U16 = 2,
    S16 = 3,
    S32 = 4,
    F32 = 5,
    F64 = 6,
}

/// Native matrix header borrowing a leased buffer.
pub struct Mat<'a> {
    handle: ArrayHandle,
    writable: bool,
    _lease: PhantomData<&'a ()>,
}

impl<'a> Mat<'a> {
    /// Read-only header over a leased buffer. `step_bytes` is the distance
    /// between consecutive rows.
    pub fn from_lease<T>(
        rows: i32,
        cols: i32,
        depth: MatDepth,
        channels: i32,
        lease: &'a BufferLease<'_, T>,
        step_bytes: usize,
    ) -> Result<Self> {
        // Read-only: the handle is only ever resolved through `InputArray`.
        Self::create(rows, cols, depth, channels, lease.as_ptr() as *mut _, step_bytes, false)
    }

    /// Header the native side may write through. Requires a writable lease.
    pub fn from_lease_mut<T>(
        rows: i32,
        cols: i32,
        depth: MatDepth,
        channels: i32,
        lease: &'a BufferLease<'_, T>,
        step_bytes: usize,
    ) -> Result<Self> {
        Self::create(rows, cols, depth, channels, lease.as_mut_ptr(), step_bytes, true)
    }

    fn create(
        rows: i32,
        cols: i32,
        depth: MatDepth,
        channels: i32,
        data: *mut std::ffi::c_void,
        step_bytes: usize,
        writable: bool,
    ) -> Result<Self> {
        let api = native::api()?;
        let mut status = 0i32;
        // SAFETY: `data` is pinned by the caller's lease for at least the
        // lifetime `'a`; the native header stores, never frees, the address.
        let raw = unsafe {
            (api.mat_create_from_buffer)(
                rows,
                cols,
                depth as i32,
                channels,
                data,
                step_bytes,
                &mut status,
            )
        };
        native::check_status(native::sym::MAT_CREATE_FROM_BUFFER, status)?;
        let handle = ArrayHandle::from_raw(raw);
        handle.require(native::sym::MAT_CREATE_FROM_BUFFER)?;
        Ok(Self {
            handle,
            writable,
            _lease: PhantomData,
        })
    }
}

impl Drop for Mat<'_> {
    fn drop(&mut self) {
        // A `Mat` can only exist after the table is installed.
        if let Ok(api) = native::api() {
            // SAFETY: the handle came from `mat_create_from_buffer` and is
            // released exactly once, here.
            unsafe { (api.mat_release)(self.handle.as_ptr()) };
        }
    }
}

impl InputArray for Mat<'_> {
    fn input_array(&self) -> ArrayHandle {
        self.handle
    }
}

impl OutputArray for Mat<'_> {
    fn output_array(&self) -> ArrayHandle {
        assert!(self.writable, "output use of a read-only Mat header");
        self.handle
    }
}

impl InputOutputArray for Mat<'_> {
    fn input_output_array(&self) -> ArrayHandle {
        // Read-write use needs the same writable backing as output use.
        self.output_array()
    }
}
