//! Opaque array handles and the capability traits the facade consumes.
//!
//! A handle is a borrowed native address: the binding never interprets the
//! bytes behind it, never frees it, and only holds it for the duration of a
//! single call. Ownership stays with whatever container produced the handle
//! ([`crate::mat::Mat`], the vectors in [`crate::vector`], or an external
//! collaborator implementing one of the traits below).

use std::ffi::c_void;

use crate::error::{Error, Result};

/// Non-owning reference to a native-side array/image/matrix object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayHandle(*mut c_void);

impl ArrayHandle {
    /// The null handle, used for optional arguments that are absent.
    pub const fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    /// Wraps a raw native address.
    ///
    /// The address must either be null or point at a live native object; the
    /// binding forwards it verbatim.
    pub const fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    pub(crate) fn as_ptr(self) -> *mut c_void {
        self.0
    }

    /// Rejects null handles for required arguments before native dispatch.
    pub(crate) fn require(self, op: &'static str) -> Result<*mut c_void> {
        if self.0.is_null() {
            return Err(Error::NullHandle { op });
        }
        Ok(self.0)
    }
}

/// Read-only array argument.
pub trait InputArray {
    fn input_array(&self) -> ArrayHandle;
}

/// Write-only array argument.
pub trait OutputArray {
    fn output_array(&self) -> ArrayHandle;
}

/// Argument the native side both reads and writes (masks, model buffers).
pub trait InputOutputArray: InputArray + OutputArray {
    fn input_output_array(&self) -> ArrayHandle {
        self.input_array()
    }
}

/// Maps an optional input to its handle, null when absent.
pub(crate) fn optional_input(arr: Option<&dyn InputArray>) -> ArrayHandle {
    arr.map_or(ArrayHandle::null(), InputArray::input_array)
}

/// Maps an optional read-write argument to its handle, null when absent.
pub(crate) fn optional_input_output(arr: Option<&dyn InputOutputArray>) -> ArrayHandle {
    arr.map_or(ArrayHandle::null(), InputOutputArray::input_output_array)
}
