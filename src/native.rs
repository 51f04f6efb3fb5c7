//! Raw ABI of the `cvextern` shim and the process-wide dispatch table.
//!
//! - Every entry point uses the `extern "C-unwind"` calling convention so an
//!   unwind out of the native call still runs the facade's scoped releases.
//! - Fallible entry points carry a trailing `status: *mut i32` out-parameter;
//!   zero means success, anything else is a native error code forwarded
//!   verbatim by [`check_status`].
//! - Booleans cross the boundary as one byte (`u8`), the shim's bool width.
//! - The table is resolved once per process (library identifier + calling
//!   convention are fixed at startup) and injected into every call site via
//!   [`api`]. Embedders and tests may [`install`] a pre-resolved table
//!   instead of loading a shared library.

use std::ffi::c_void;
use std::path::PathBuf;
use std::sync::OnceLock;

use libloading::Library;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Point2i, Rect2i, Size2i};

/// Opaque native address of an array/image/matrix/vector object.
pub type Handle = *mut c_void;

/// Base name of the shared library every entry point lives in.
pub const LIBRARY_NAME: &str = "cvextern";

/// Structure sizes reported by the native side for the load-time handshake.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct StructSizes {
    pub point: u32,
    pub size: u32,
    pub rect: u32,
}

/// Symbol names, declared once so entry-point aliases live in one place.
///
/// Most wrappers share their native symbol's `cve` stem; the handful whose
/// native name predates the convention keep their historical spelling.
pub mod sym {
    pub const STRUCT_SIZES: &str = "getCvStructSizes";

    pub const MAT_CREATE_FROM_BUFFER: &str = "cveMatCreateFromBuffer";
    pub const MAT_RELEASE: &str = "cveMatRelease";

    pub const VEC_U8_CREATE: &str = "cveVectorOfByteCreate";
    pub const VEC_U8_RELEASE: &str = "cveVectorOfByteRelease";
    pub const VEC_U8_SIZE: &str = "cveVectorOfByteGetSize";
    pub const VEC_U8_COPY_DATA: &str = "cveVectorOfByteCopyData";

    pub const VEC_F32_CREATE: &str = "cveVectorOfFloatCreate";
    pub const VEC_F32_RELEASE: &str = "cveVectorOfFloatRelease";
    pub const VEC_F32_SIZE: &str = "cveVectorOfFloatGetSize";
    pub const VEC_F32_COPY_DATA: &str = "cveVectorOfFloatCopyData";

    pub const VEC_VEC_POINT_CREATE: &str = "cveVectorOfVectorOfPointCreate";
    pub const VEC_VEC_POINT_RELEASE: &str = "cveVectorOfVectorOfPointRelease";
    pub const VEC_VEC_POINT_SIZE: &str = "cveVectorOfVectorOfPointGetSize";
    pub const VEC_VEC_POINT_SIZE_AT: &str = "cveVectorOfVectorOfPointGetSizeAt";
    pub const VEC_VEC_POINT_COPY_AT: &str = "cveVectorOfVectorOfPointCopyDataAt";

    pub const SQRT: &str = "cveSqrt";
    pub const CHECK_RANGE: &str = "cveCheckRange";
    pub const MIN_MAX_IDX: &str = "cveMinMaxIdx";
    // Historical symbol, kept as an explicit alias of the `solve_lp` wrapper.
    pub const SOLVE_LP: &str = "cvSolveLP";

    pub const GRAB_CUT: &str = "cveGrabCut";
    // Alias: the shim exports the color-map entry under its legacy name.
    pub const APPLY_COLOR_MAP: &str = "CvApplyColorMap";
    pub const FILTER_2D: &str = "cveFilter2D";
    pub const CLAHE: &str = "cveCLAHE";
    pub const ADAPTIVE_BILATERAL_FILTER: &str = "cveAdaptiveBilateralFilter";

    pub const FAST_NL_MEANS_DENOISING: &str = "cveFastNlMeansDenoising";
    pub const FAST_NL_MEANS_DENOISING_COLORED: &str = "cveFastNlMeansDenoisingColored";

    pub const CALC_OPTICAL_FLOW_DUAL_TVL1: &str = "cvCalcOpticalFlowDualTVL1";

    pub const ESTIMATE_AFFINE_3D: &str = "cveEstimateAffine3D";
    pub const FIND_CIRCLES_GRID: &str = "cvFindCirclesGrid";

    pub const CHAMFER_MATCHING: &str = "cvChamferMatching";
}

/// Per-entry-point function pointers, all sharing one calling convention.
///
/// Field order mirrors [`sym`]. The table is plain data: copying it is cheap
/// and a fake table (tests, embedders) is just a struct literal.
#[derive(Clone, Copy)]
#[allow(clippy::type_complexity)]
pub struct NativeApi {
    pub get_struct_sizes: unsafe extern "C-unwind" fn(sizes: *mut StructSizes),

    pub mat_create_from_buffer: unsafe extern "C-unwind" fn(
        rows: i32,
        cols: i32,
        depth: i32,
        channels: i32,
        data: *mut c_void,
        step: usize,
        status: *mut i32,
    ) -> Handle,
    pub mat_release: unsafe extern "C-unwind" fn(mat: Handle),

    pub vec_u8_create: unsafe extern "C-unwind" fn() -> Handle,
    pub vec_u8_release: unsafe extern "C-unwind" fn(vec: Handle),
    pub vec_u8_size: unsafe extern "C-unwind" fn(vec: Handle) -> usize,
    pub vec_u8_copy_data: unsafe extern "C-unwind" fn(vec: Handle, dst: *mut u8),

    pub vec_f32_create: unsafe extern "C-unwind" fn() -> Handle,
    pub vec_f32_release: unsafe extern "C-unwind" fn(vec: Handle),
    pub vec_f32_size: unsafe extern "C-unwind" fn(vec: Handle) -> usize,
    pub vec_f32_copy_data: unsafe extern "C-unwind" fn(vec: Handle, dst: *mut f32),

    pub vec_vec_point_create: unsafe extern "C-unwind" fn() -> Handle,
    pub vec_vec_point_release: unsafe extern "C-unwind" fn(vec: Handle),
    pub vec_vec_point_size: unsafe extern "C-unwind" fn(vec: Handle) -> usize,
    pub vec_vec_point_size_at: unsafe extern "C-unwind" fn(vec: Handle, index: usize) -> usize,
    pub vec_vec_point_copy_at:
        unsafe extern "C-unwind" fn(vec: Handle, index: usize, dst: *mut Point2i),

    pub sqrt: unsafe extern "C-unwind" fn(src: Handle, dst: Handle, status: *mut i32),
    pub check_range: unsafe extern "C-unwind" fn(
        arr: Handle,
        quiet: u8,
        pos: *mut Point2i,
        min_val: f64,
        max_val: f64,
        status: *mut i32,
    ) -> u8,
    pub min_max_idx: unsafe extern "C-unwind" fn(
        src: Handle,
        min_val: *mut f64,
        max_val: *mut f64,
        min_idx: *mut i32,
        max_idx: *mut i32,
        mask: Handle,
        status: *mut i32,
    ),
    pub solve_lp: unsafe extern "C-unwind" fn(
        function: Handle,
        constraints: Handle,
        solution: Handle,
        status: *mut i32,
    ) -> i32,

    pub grab_cut: unsafe extern "C-unwind" fn(
        img: Handle,
        mask: Handle,
        rect: *mut Rect2i,
        bgd_model: Handle,
        fgd_model: Handle,
        iter_count: i32,
        mode: i32,
        status: *mut i32,
    ),
    pub apply_color_map:
        unsafe extern "C-unwind" fn(src: Handle, dst: Handle, map: i32, status: *mut i32),
    pub filter_2d: unsafe extern "C-unwind" fn(
        src: Handle,
        dst: Handle,
        kernel: Handle,
        anchor: *mut Point2i,
        delta: f64,
        border: i32,
        status: *mut i32,
    ),
    pub clahe: unsafe extern "C-unwind" fn(
        src: Handle,
        clip_limit: f64,
        tile_grid_size: *mut Size2i,
        dst: Handle,
        status: *mut i32,
    ),
    pub adaptive_bilateral_filter: unsafe extern "C-unwind" fn(
        src: Handle,
        dst: Handle,
        ksize: *mut Size2i,
        sigma_space: f64,
        max_sigma_color: f64,
        anchor: *mut Point2i,
        border: i32,
        status: *mut i32,
    ),

    pub fast_nl_means_denoising: unsafe extern "C-unwind" fn(
        src: Handle,
        dst: Handle,
        h: f32,
        template_window: i32,
        search_window: i32,
        status: *mut i32,
    ),
    pub fast_nl_means_denoising_colored: unsafe extern "C-unwind" fn(
        src: Handle,
        dst: Handle,
        h: f32,
        h_color: f32,
        template_window: i32,
        search_window: i32,
        status: *mut i32,
    ),

    pub calc_optical_flow_dual_tvl1:
        unsafe extern "C-unwind" fn(prev: Handle, next: Handle, flow: Handle, status: *mut i32),

    pub estimate_affine_3d: unsafe extern "C-unwind" fn(
        src: Handle,
        dst: Handle,
        estimate: Handle,
        inliers: Handle,
        ransac_threshold: f64,
        confidence: f64,
        status: *mut i32,
    ) -> i32,
    pub find_circles_grid: unsafe extern "C-unwind" fn(
        image: Handle,
        pattern_size: *mut Size2i,
        centers: Handle,
        flags: i32,
        status: *mut i32,
    ) -> u8,

    pub chamfer_matching: unsafe extern "C-unwind" fn(
        img: Handle,
        templ: Handle,
        contours: Handle,
        cost: Handle,
        template_scale: f64,
        max_matches: i32,
        min_match_distance: f64,
        pad_x: i32,
        pad_y: i32,
        scales: i32,
        min_scale: f64,
        max_scale: f64,
        orientation_weight: f64,
        truncate: f64,
        status: *mut i32,
    ) -> i32,
}

macro_rules! resolve {
    ($lib:expr, $sym:expr) => {{
        // SAFETY: the pointer type is fixed by the shim's exported C API.
        match unsafe { $lib.get($sym.as_bytes()) } {
            Ok(symbol) => *symbol,
            Err(err) => {
                return Err(Error::Symbol {
                    symbol: $sym,
                    reason: err.to_string(),
                })
            }
        }
    }};
}

impl NativeApi {
    /// Resolves every entry point from an opened shared library.
    fn resolve(lib: &Library) -> Result<Self> {
        Ok(Self {
            get_struct_sizes: resolve!(lib, sym::STRUCT_SIZES),

            mat_create_from_buffer: resolve!(lib, sym::MAT_CREATE_FROM_BUFFER),
            mat_release: resolve!(lib, sym::MAT_RELEASE),

            vec_u8_create: resolve!(lib, sym::VEC_U8_CREATE),
            vec_u8_release: resolve!(lib, sym::VEC_U8_RELEASE),
            vec_u8_size: resolve!(lib, sym::VEC_U8_SIZE),
            vec_u8_copy_data: resolve!(lib, sym::VEC_U8_COPY_DATA),

            vec_f32_create: resolve!(lib, sym::VEC_F32_CREATE),
            vec_f32_release: resolve!(lib, sym::VEC_F32_RELEASE),
            vec_f32_size: resolve!(lib, sym::VEC_F32_SIZE),
            vec_f32_copy_data: resolve!(lib, sym::VEC_F32_COPY_DATA),

            vec_vec_point_create: resolve!(lib, sym::VEC_VEC_POINT_CREATE),
            vec_vec_point_release: resolve!(lib, sym::VEC_VEC_POINT_RELEASE),
            vec_vec_point_size: resolve!(lib, sym::VEC_VEC_POINT_SIZE),
            vec_vec_point_size_at: resolve!(lib, sym::VEC_VEC_POINT_SIZE_AT),
            vec_vec_point_copy_at: resolve!(lib, sym::VEC_VEC_POINT_COPY_AT),

            sqrt: resolve!(lib, sym::SQRT),
            check_range: resolve!(lib, sym::CHECK_RANGE),
            min_max_idx: resolve!(lib, sym::MIN_MAX_IDX),
            solve_lp: resolve!(lib, sym::SOLVE_LP),

            grab_cut: resolve!(lib, sym::GRAB_CUT),
            apply_color_map: resolve!(lib, sym::APPLY_COLOR_MAP),
            filter_2d: resolve!(lib, sym::FILTER_2D),
            clahe: resolve!(lib, sym::CLAHE),
            adaptive_bilateral_filter: resolve!(lib, sym::ADAPTIVE_BILATERAL_FILTER),

            fast_nl_means_denoising: resolve!(lib, sym::FAST_NL_MEANS_DENOISING),
            fast_nl_means_denoising_colored: resolve!(lib, sym::FAST_NL_MEANS_DENOISING_COLORED),

            calc_optical_flow_dual_tvl1: resolve!(lib, sym::CALC_OPTICAL_FLOW_DUAL_TVL1),

            estimate_affine_3d: resolve!(lib, sym::ESTIMATE_AFFINE_3D),
            find_circles_grid: resolve!(lib, sym::FIND_CIRCLES_GRID),

            chamfer_matching: resolve!(lib, sym::CHAMFER_MATCHING),
        })
    }
}

/// Where to find the shared library. `path: None` searches the platform's
/// default locations for [`LIBRARY_NAME`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub path: Option<PathBuf>,
}

struct Runtime {
    // Keeps the shared library mapped for as long as the table is live.
    _lib: Option<Library>,
    api: NativeApi,
}

// SAFETY: the table holds plain function pointers and the library handle is
// only kept to pin the mapping; neither is mutated after installation.
static RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Loads the shared library from the default search path and resolves the
/// dispatch table. Idempotent: later calls return `Ok` without reloading.
pub fn init() -> Result<()> {
    init_with(&LibraryConfig::default())
}

/// Loads the shared library described by `config`.
pub fn init_with(config: &LibraryConfig) -> Result<()> {
    if RUNTIME.get().is_some() {
        return Ok(());
    }

    let path = config
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(libloading::library_filename(LIBRARY_NAME)));

    // SAFETY: loading runs the library's initializers; the shim has none
    // beyond the C runtime's.
    let lib = unsafe { Library::new(&path) }.map_err(|err| Error::Library(err.to_string()))?;
    let api = NativeApi::resolve(&lib)?;
    verify_abi(&api)?;

    debug!("loaded native library from {}", path.display());
    let _ = RUNTIME.set(Runtime {
        _lib: Some(lib),
        api,
    });
    Ok(())
}

/// Installs a pre-resolved dispatch table (embedders linking statically, or
/// test harnesses providing a fake native layer). Fails once a table is
/// already live, since the table is fixed for the process lifetime.
pub fn install(api: NativeApi) -> Result<()> {
    verify_abi(&api)?;
    RUNTIME
        .set(Runtime { _lib: None, api })
        .map_err(|_| Error::Library("dispatch table already installed".into()))
}

/// The process-wide table, or [`Error::NotLoaded`] before initialization.
pub(crate) fn api() -> Result<&'static NativeApi> {
    RUNTIME.get().map(|rt| &rt.api).ok_or(Error::NotLoaded)
}

/// Struct-size handshake: refuse to run against a shim whose POD layout
/// disagrees with this crate's `#[repr(C)]` types.
fn verify_abi(api: &NativeApi) -> Result<()> {
    let mut sizes = StructSizes::default();
    // SAFETY: `sizes` is a valid out-pointer for the duration of the call.
    unsafe { (api.get_struct_sizes)(&mut sizes) };

    let expected = [
        ("Point2i", sizes.point, std::mem::size_of::<Point2i>() as u32),
        ("Size2i", sizes.size, std::mem::size_of::<Size2i>() as u32),
        ("Rect2i", sizes.rect, std::mem::size_of::<Rect2i>() as u32),
    ];
    for (name, native, crate_size) in expected {
        if native != crate_size {
            return Err(Error::AbiMismatch {
                name,
                native,
                expected: crate_size,
            });
        }
    }
    debug!("native struct sizes verified");
    Ok(())
}

/// Forwards a native status code unchanged; zero is success.
pub(crate) fn check_status(op: &'static str, status: i32) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        debug!("native call `{op}` reported code {status}");
        Err(Error::Native { op, code: status })
    }
}

pub(crate) fn to_cbool(value: bool) -> u8 {
    u8::from(value)
}

pub(crate) fn from_cbool(value: u8) -> bool {
    value != 0
}
