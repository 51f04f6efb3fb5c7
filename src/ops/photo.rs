//! Non-local-means denoising (8-bit images, gaussian white noise model).

use crate::error::Result;
use crate::handle::{InputArray, OutputArray};
use crate::native::{self, sym};

/// Single-channel/grayscale variant.
///
/// Recommended values: `h = 3.0`, `template_window = 7`, `search_window = 21`
/// (both window sizes odd). Larger `search_window` scales running time
/// linearly.
pub fn fast_nl_means_denoising(
    src: &impl InputArray,
    dst: &impl OutputArray,
    h: f32,
    template_window: i32,
    search_window: i32,
) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::FAST_NL_MEANS_DENOISING)?;
    let dst = dst.output_array().require(sym::FAST_NL_MEANS_DENOISING)?;
    let mut status = 0i32;
    // SAFETY: both handles are live for the duration of the call.
    unsafe {
        (api.fast_nl_means_denoising)(src, dst, h, template_window, search_window, &mut status)
    };
    native::check_status(sym::FAST_NL_MEANS_DENOISING, status)
}

/// Color variant: converts to CIELAB and denoises L and AB separately,
/// with `h` applied to luminance and `h_color` to the color components
/// (`h_color = 10.0` removes most colored noise without distortion).
pub fn fast_nl_means_denoising_colored(
    src: &impl InputArray,
    dst: &impl OutputArray,
    h: f32,
    h_color: f32,
    template_window: i32,
    search_window: i32,
) -> Result<()> {
    let api = native::api()?;
    let src = src
        .input_array()
        .require(sym::FAST_NL_MEANS_DENOISING_COLORED)?;
    let dst = dst
        .output_array()
        .require(sym::FAST_NL_MEANS_DENOISING_COLORED)?;
    let mut status = 0i32;
    // SAFETY: both handles are live for the duration of the call.
    unsafe {
        (api.fast_nl_means_denoising_colored)(
            src,
            dst,
            h,
            h_color,
            template_window,
            search_window,
            &mut status,
        )
    };
    native::check_status(sym::FAST_NL_MEANS_DENOISING_COLORED, status)
}
