//! Array-wide operations from the native core module.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::geometry::Point2i;
use crate::handle::{optional_input, InputArray, OutputArray};
use crate::lease::BufferLease;
use crate::native::{self, sym};

/// Element-wise square root of a floating-point array. Destination gets the
/// source's size and type; no state is carried between calls.
pub fn sqrt(src: &impl InputArray, dst: &impl OutputArray) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::SQRT)?;
    let dst = dst.output_array().require(sym::SQRT)?;
    let mut status = 0i32;
    // SAFETY: both handles are live for the duration of the call.
    unsafe { (api.sqrt)(src, dst, &mut status) };
    native::check_status(sym::SQRT, status)
}

/// Outcome of the quiet [`check_range`] shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RangeCheck {
    InRange,
    /// Position of the first element outside `[min_val, max_val)`.
    OutOfRange(Point2i),
}

/// Checks every element against `[min_val, max_val)` and for NaN/inf.
///
/// With `quiet = true` an out-of-range element is reported as
/// [`RangeCheck::OutOfRange`] with its position; with `quiet = false` the
/// native side signals the same condition through its status channel, which
/// surfaces here as [`Error::Native`]. Both shapes are kept because callers
/// rely on either.
pub fn check_range(
    arr: &impl InputArray,
    quiet: bool,
    min_val: f64,
    max_val: f64,
) -> Result<RangeCheck> {
    let api = native::api()?;
    let arr = arr.input_array().require(sym::CHECK_RANGE)?;
    let mut pos = Point2i::default();
    let mut status = 0i32;
    // SAFETY: `pos` and `status` are valid out-pointers for the call.
    let ok = unsafe {
        (api.check_range)(
            arr,
            native::to_cbool(quiet),
            &mut pos,
            min_val,
            max_val,
            &mut status,
        )
    };
    native::check_status(sym::CHECK_RANGE, status)?;
    if native::from_cbool(ok) {
        Ok(RangeCheck::InRange)
    } else {
        Ok(RangeCheck::OutOfRange(pos))
    }
}

/// Global extrema of a single-channel array, with their positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct MinMax {
    pub min_val: f64,
    pub max_val: f64,
    pub min_idx: [i32; 2],
    pub max_idx: [i32; 2],
}

/// Finds the global minimum and maximum in `src`.
///
/// `mask` restricts the scan to its nonzero elements; `None` scans the whole
/// array. The index buffers are leased for the call because the native side
/// fills them in place.
pub fn min_max_idx(src: &impl InputArray, mask: Option<&dyn InputArray>) -> Result<MinMax> {
    let api = native::api()?;
    let src = src.input_array().require(sym::MIN_MAX_IDX)?;
    let mask = optional_input(mask);

    let mut min_val = 0f64;
    let mut max_val = 0f64;
    let mut min_idx = [0i32; 2];
    let mut max_idx = [0i32; 2];
    let min_lease = BufferLease::pin_mut(&mut min_idx);
    let max_lease = BufferLease::pin_mut(&mut max_idx);

    let mut status = 0i32;
    // SAFETY: scalar out-pointers live on this frame; the index addresses
    // stay pinned by the leases until after the call returns.
    unsafe {
        (api.min_max_idx)(
            src,
            &mut min_val,
            &mut max_val,
            min_lease.as_mut_ptr() as *mut i32,
            max_lease.as_mut_ptr() as *mut i32,
            mask.as_ptr(),
            &mut status,
        )
    };
    drop(max_lease);
    drop(min_lease);
    native::check_status(sym::MIN_MAX_IDX, status)?;

    Ok(MinMax {
        min_val,
        max_val,
        min_idx,
        max_idx,
    })
}

/// Result codes of the simplex solver, matching the native enumeration.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SolveLpResult {
    Unbounded = -2,
    Infeasible = -1,
    Single = 0,
    Multiple = 1,
}

/// Solves `maximize c·x subject to Ax <= b, x >= 0` with the simplex method.
///
/// `function` is the row vector `c`, `constraints` the `m x (n+1)` matrix
/// `[A | b]`, and `solution` receives `x` as a 64-bit column vector. An
/// unknown result code is forwarded unchanged as [`Error::Native`].
pub fn solve_lp(
    function: &impl InputArray,
    constraints: &impl InputArray,
    solution: &impl OutputArray,
) -> Result<SolveLpResult> {
    let api = native::api()?;
    let function = function.input_array().require(sym::SOLVE_LP)?;
    let constraints = constraints.input_array().require(sym::SOLVE_LP)?;
    let solution = solution.output_array().require(sym::SOLVE_LP)?;
    let mut status = 0i32;
    // SAFETY: all three handles are live for the duration of the call.
    let code = unsafe { (api.solve_lp)(function, constraints, solution, &mut status) };
    native::check_status(sym::SOLVE_LP, status)?;
    match code {
        -2 => Ok(SolveLpResult::Unbounded),
        -1 => Ok(SolveLpResult::Infeasible),
        0 => Ok(SolveLpResult::Single),
        1 => Ok(SolveLpResult::Multiple),
        other => Err(Error::Native {
            op: sym::SOLVE_LP,
            code: other,
        }),
    }
}
