//! Dense optical flow.

use crate::error::Result;
use crate::handle::{InputArray, OutputArray};
use crate::native::{self, sym};

/// Dual TV-L1 optical flow between two 8-bit single-channel frames.
///
/// `flow` receives a two-channel 32-bit field of the same size as `prev`.
pub fn calc_optical_flow_dual_tvl1(
    prev: &impl InputArray,
    next: &impl InputArray,
    flow: &impl OutputArray,
) -> Result<()> {
    let api = native::api()?;
    let prev = prev
        .input_array()
        .require(sym::CALC_OPTICAL_FLOW_DUAL_TVL1)?;
    let next = next
        .input_array()
        .require(sym::CALC_OPTICAL_FLOW_DUAL_TVL1)?;
    let flow = flow
        .output_array()
        .require(sym::CALC_OPTICAL_FLOW_DUAL_TVL1)?;
    let mut status = 0i32;
    // SAFETY: all three handles are live for the duration of the call.
    unsafe { (api.calc_optical_flow_dual_tvl1)(prev, next, flow, &mut status) };
    native::check_status(sym::CALC_OPTICAL_FLOW_DUAL_TVL1, status)
}
