//! Image-processing entry points: segmentation, color maps, filtering.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Point2i, Rect2i, Size2i};
use crate::handle::{optional_input_output, InputArray, InputOutputArray, OutputArray};
use crate::native::{self, sym};

/// Grab-cut initialization mode.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrabCutInit {
    /// Initialize state and mask from `rect`; pixels outside are background.
    WithRect = 0,
    /// Initialize from the provided mask.
    WithMask = 1,
    /// Resume iterations on previously initialized state.
    Eval = 2,
}

/// Pixel extrapolation at filter borders.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderType {
    Constant = 0,
    Replicate = 1,
    Reflect = 2,
    Wrap = 3,
    Reflect101 = 4,
    Transparent = 5,
    Isolated = 16,
}

/// False-color palettes for [`apply_color_map`].
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMap {
    Autumn = 0,
    Bone = 1,
    Jet = 2,
    Winter = 3,
    Rainbow = 4,
    Ocean = 5,
    Summer = 6,
    Spring = 7,
    Cool = 8,
    Hsv = 9,
    Pink = 10,
    Hot = 11,
}

/// Grab-cut segmentation of an 8-bit 3-channel image.
///
/// `mask` is the 8-bit single-channel label image; it may be absent when
/// `mode` is [`GrabCutInit::WithRect`], in which case the native side
/// initializes it. `bgd_model` and `fgd_model` are scratch state the caller
/// must keep unchanged between iterations on the same image. `rect` crosses
/// by address because the native side may clamp it.
#[allow(clippy::too_many_arguments)]
pub fn grab_cut(
    image: &impl InputArray,
    mask: Option<&dyn InputOutputArray>,
    rect: Rect2i,
    bgd_model: &impl InputOutputArray,
    fgd_model: &impl InputOutputArray,
    iter_count: i32,
    mode: GrabCutInit,
) -> Result<()> {
    let api = native::api()?;
    let image = image.input_array().require(sym::GRAB_CUT)?;
    let mask = optional_input_output(mask);
    let bgd = bgd_model.input_output_array().require(sym::GRAB_CUT)?;
    let fgd = fgd_model.input_output_array().require(sym::GRAB_CUT)?;
    let mut rect = rect;
    let mut status = 0i32;
    // SAFETY: handles are live for the call; `rect` is a local the native
    // side may mutate in place.
    unsafe {
        (api.grab_cut)(
            image,
            mask.as_ptr(),
            &mut rect,
            bgd,
            fgd,
            iter_count,
            mode as i32,
            &mut status,
        )
    };
    native::check_status(sym::GRAB_CUT, status)
}

/// Applies a false-color palette to an 8-bit image.
pub fn apply_color_map(src: &impl InputArray, dst: &impl OutputArray, map: ColorMap) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::APPLY_COLOR_MAP)?;
    let dst = dst.output_array().require(sym::APPLY_COLOR_MAP)?;
    let mut status = 0i32;
    // SAFETY: both handles are live for the duration of the call.
    unsafe { (api.apply_color_map)(src, dst, map as i32, &mut status) };
    native::check_status(sym::APPLY_COLOR_MAP, status)
}

/// Arbitrary linear filter; in-place operation is supported.
///
/// `anchor` is the filtered point's position inside the kernel; `(-1, -1)`
/// means the kernel center.
pub fn filter_2d(
    src: &impl InputArray,
    dst: &impl OutputArray,
    kernel: &impl InputArray,
    anchor: Point2i,
    delta: f64,
    border: BorderType,
) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::FILTER_2D)?;
    let dst = dst.output_array().require(sym::FILTER_2D)?;
    let kernel = kernel.input_array().require(sym::FILTER_2D)?;
    let mut anchor = anchor;
    let mut status = 0i32;
    // SAFETY: handles are live for the call; `anchor` crosses by address.
    unsafe { (api.filter_2d)(src, dst, kernel, &mut anchor, delta, border as i32, &mut status) };
    native::check_status(sym::FILTER_2D, status)
}

/// Contrast-limited adaptive histogram equalization.
///
/// Common defaults: `clip_limit = 40.0`, `tile_grid_size = 8x8`.
pub fn clahe(
    src: &impl InputArray,
    clip_limit: f64,
    tile_grid_size: Size2i,
    dst: &impl OutputArray,
) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::CLAHE)?;
    let dst = dst.output_array().require(sym::CLAHE)?;
    let mut tile = tile_grid_size;
    let mut status = 0i32;
    // SAFETY: handles are live for the call; `tile` crosses by address.
    unsafe { (api.clahe)(src, clip_limit, &mut tile, dst, &mut status) };
    native::check_status(sym::CLAHE, status)
}

/// Edge-preserving smoothing with a per-pixel adapted bilateral kernel.
#[allow(clippy::too_many_arguments)]
pub fn adaptive_bilateral_filter(
    src: &impl InputArray,
    dst: &impl OutputArray,
    ksize: Size2i,
    sigma_space: f64,
    max_sigma_color: f64,
    anchor: Point2i,
    border: BorderType,
) -> Result<()> {
    let api = native::api()?;
    let src = src.input_array().require(sym::ADAPTIVE_BILATERAL_FILTER)?;
    let dst = dst.output_array().require(sym::ADAPTIVE_BILATERAL_FILTER)?;
    let mut ksize = ksize;
    let mut anchor = anchor;
    let mut status = 0i32;
    // SAFETY: handles are live for the call; `ksize` and `anchor` cross by
    // address.
    unsafe {
        (api.adaptive_bilateral_filter)(
            src,
            dst,
            &mut ksize,
            sigma_space,
            max_sigma_color,
            &mut anchor,
            border as i32,
            &mut status,
        )
    };
    native::check_status(sym::ADAPTIVE_BILATERAL_FILTER, status)
}
