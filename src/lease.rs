//! Scoped buffer leases for native calls that write through raw pointers.
//!
//! A [`BufferLease`] fixes a Rust buffer's address for the duration of one
//! native call: acquire immediately before dispatch, hand the address to the
//! native side, release when the lease drops. Release runs on every exit
//! path, including an unwind out of the native call, so the address is never
//! read after the lease is gone.
//!
//! A process-wide counter tracks live leases; integration tests assert it
//! returns to zero after failure paths.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

static ACTIVE_LEASES: AtomicUsize = AtomicUsize::new(0);

/// Number of leases currently alive in the process.
pub fn active_leases() -> usize {
    ACTIVE_LEASES.load(Ordering::SeqCst)
}

/// A pinned borrow of a slice, valid for the lease's lifetime.
pub struct BufferLease<'a, T> {
    ptr: *mut T,
    len: usize,
    writable: bool,
    _borrow: PhantomData<&'a [T]>,
}

impl<'a, T> BufferLease<'a, T> {
    /// Leases a read-only buffer. Native code may read through the address
    /// until the lease drops.
    pub fn pin(data: &'a [T]) -> Self {
        ACTIVE_LEASES.fetch_add(1, Ordering::SeqCst);
        Self {
            ptr: data.as_ptr() as *mut T,
            len: data.len(),
            writable: false,
            _borrow: PhantomData,
        }
    }

    /// Leases a buffer the native side is allowed to write in place.
    pub fn pin_mut(data: &'a mut [T]) -> Self {
        ACTIVE_LEASES.fetch_add(1, Ordering::SeqCst);
        Self {
            ptr: data.as_mut_ptr(),
            len: data.len(),
            writable: true,
            _borrow: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const c_void {
        self.ptr as *const c_void
    }

    /// Address for in-place native writes. Only leases taken with
    /// [`BufferLease::pin_mut`] may be written through.
    pub fn as_mut_ptr(&self) -> *mut c_void {
        assert!(self.writable, "write access to a read-only lease");
        self.ptr as *mut c_void
    }
}

impl<T> Drop for BufferLease<'_, T> {
    fn drop(&mut self) {
        ACTIVE_LEASES.fetch_sub(1, Ordering::SeqCst);
    }
}
