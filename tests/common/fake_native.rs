//! Fake native layer backing the integration tests.
//!
//! Implements the whole dispatch table in Rust: matrix headers become boxed
//! descriptors over the leased buffers, output vectors become boxed `Vec`s,
//! and the handful of operations the behavioral tests exercise (sqrt,
//! check_range, min_max_idx, affine estimation, chamfer) get just enough
//! real behavior to verify the binding's marshaling. Knobs inject failures
//! and panics; counters observe create/release pairing.

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use nalgebra::DMatrix;

use cvextern::native::{Handle, StructSizes};
use cvextern::{NativeApi, Point2i, Rect2i, Size2i};

// --- Knobs and counters ----------------------------------------------------

/// Serializes tests that flip knobs; knob-free tests may run concurrently.
pub static KNOBS: Mutex<()> = Mutex::new(());

/// Makes the next `cveMinMaxIdx` call panic after the binding has pinned.
pub static PANIC_MIN_MAX: AtomicBool = AtomicBool::new(false);
/// Makes the next `cvChamferMatching` call panic after the vectors exist.
pub static PANIC_CHAMFER: AtomicBool = AtomicBool::new(false);
/// Overrides the `cvSolveLP` return code when nonzero.
pub static SOLVE_LP_CODE: AtomicI32 = AtomicI32::new(0);

pub static MATS_CREATED: AtomicUsize = AtomicUsize::new(0);
pub static MATS_RELEASED: AtomicUsize = AtomicUsize::new(0);
pub static VECS_CREATED: AtomicUsize = AtomicUsize::new(0);
pub static VECS_RELEASED: AtomicUsize = AtomicUsize::new(0);

pub static GRAB_CUT_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static COLOR_MAP_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static FILTER_2D_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static CLAHE_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static ABF_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static NLM_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static NLM_COLOR_CALLS: AtomicUsize = AtomicUsize::new(0);
pub static FLOW_CALLS: AtomicUsize = AtomicUsize::new(0);

const ERR_OUT_OF_RANGE: i32 = -211;
const ERR_BAD_ARG: i32 = -215;

/// Installs the fake table exactly once per test binary.
pub fn install() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        cvextern::install(fake_api()).expect("install fake dispatch table");
    });
}

// --- Fake containers -------------------------------------------------------

struct FakeMat {
    rows: i32,
    cols: i32,
    depth: i32,
    channels: i32,
    data: *mut u8,
    step: usize,
}

struct FakeVecU8(Vec<u8>);
struct FakeVecF32(Vec<f32>);
struct FakeVecVecPoint(Vec<Vec<Point2i>>);

unsafe fn mat<'a>(handle: Handle) -> &'a FakeMat {
    &*(handle as *const FakeMat)
}

unsafe fn f64_elems<'a>(m: &FakeMat) -> &'a [f64] {
    debug_assert_eq!(m.depth, 6, "expected an f64 matrix");
    let len = (m.rows * m.cols * m.channels) as usize;
    std::slice::from_raw_parts(m.data as *const f64, len)
}

unsafe fn f64_elems_mut<'a>(m: &FakeMat) -> &'a mut [f64] {
    debug_assert_eq!(m.depth, 6, "expected an f64 matrix");
    let len = (m.rows * m.cols * m.channels) as usize;
    std::slice::from_raw_parts_mut(m.data as *mut f64, len)
}

unsafe fn u8_elems<'a>(m: &FakeMat) -> &'a [u8] {
    let len = (m.rows * m.cols * m.channels) as usize;
    std::slice::from_raw_parts(m.data, len)
}

unsafe fn f32_elems<'a>(m: &FakeMat) -> &'a [f32] {
    debug_assert_eq!(m.depth, 5, "expected an f32 matrix");
    let len = (m.rows * m.cols * m.channels) as usize;
    std::slice::from_raw_parts(m.data as *const f32, len)
}

// --- Handshake and containers ----------------------------------------------

unsafe extern "C-unwind" fn get_struct_sizes(sizes: *mut StructSizes) {
    (*sizes).point = std::mem::size_of::<Point2i>() as u32;
    (*sizes).size = std::mem::size_of::<Size2i>() as u32;
    (*sizes).rect = std::mem::size_of::<Rect2i>() as u32;
}

unsafe extern "C-unwind" fn mat_create_from_buffer(
    rows: i32,
    cols: i32,
    depth: i32,
    channels: i32,
    data: *mut c_void,
    step: usize,
    status: *mut i32,
) -> Handle {
    *status = 0;
    MATS_CREATED.fetch_add(1, Ordering::SeqCst);
    Box::into_raw(Box::new(FakeMat {
        rows,
        cols,
        depth,
        channels,
        data: data as *mut u8,
        step,
    })) as Handle
}

unsafe extern "C-unwind" fn mat_release(mat: Handle) {
    MATS_RELEASED.fetch_add(1, Ordering::SeqCst);
    drop(Box::from_raw(mat as *mut FakeMat));
}

macro_rules! fake_flat_vec {
    ($ty:ident, $elem:ty, $create:ident, $release:ident, $size:ident, $copy:ident) => {
        unsafe extern "C-unwind" fn $create() -> Handle {
            VECS_CREATED.fetch_add(1, Ordering::SeqCst);
            Box::into_raw(Box::new($ty(Vec::new()))) as Handle
        }

        unsafe extern "C-unwind" fn $release(vec: Handle) {
            VECS_RELEASED.fetch_add(1, Ordering::SeqCst);
            drop(Box::from_raw(vec as *mut $ty));
        }

        unsafe extern "C-unwind" fn $size(vec: Handle) -> usize {
            (*(vec as *const $ty)).0.len()
        }

        unsafe extern "C-unwind" fn $copy(vec: Handle, dst: *mut $elem) {
            let items = &(*(vec as *const $ty)).0;
            std::ptr::copy_nonoverlapping(items.as_ptr(), dst, items.len());
        }
    };
}

fake_flat_vec!(
    FakeVecU8,
    u8,
    vec_u8_create,
    vec_u8_release,
    vec_u8_size,
    vec_u8_copy_data
);
fake_flat_vec!(
    FakeVecF32,
    f32,
    vec_f32_create,
    vec_f32_release,
    vec_f32_size,
    vec_f32_copy_data
);

unsafe extern "C-unwind" fn vec_vec_point_create() -> Handle {
    VECS_CREATED.fetch_add(1, Ordering::SeqCst);
    Box::into_raw(Box::new(FakeVecVecPoint(Vec::new()))) as Handle
}

unsafe extern "C-unwind" fn vec_vec_point_release(vec: Handle) {
    VECS_RELEASED.fetch_add(1, Ordering::SeqCst);
    drop(Box::from_raw(vec as *mut FakeVecVecPoint));
}

unsafe extern "C-unwind" fn vec_vec_point_size(vec: Handle) -> usize {
    (*(vec as *const FakeVecVecPoint)).0.len()
}

unsafe extern "C-unwind" fn vec_vec_point_size_at(vec: Handle, index: usize) -> usize {
    (&(*(vec as *const FakeVecVecPoint)).0)[index].len()
}

unsafe extern "C-unwind" fn vec_vec_point_copy_at(vec: Handle, index: usize, dst: *mut Point2i) {
    let inner = &(&(*(vec as *const FakeVecVecPoint)).0)[index];
    std::ptr::copy_nonoverlapping(inner.as_ptr(), dst, inner.len());
}

// --- core ------------------------------------------------------------------

unsafe extern "C-unwind" fn sqrt(src: Handle, dst: Handle, status: *mut i32) {
    *status = 0;
    let src = f64_elems(mat(src));
    let dst = f64_elems_mut(mat(dst));
    for (d, s) in dst.iter_mut().zip(src) {
        *d = s.sqrt();
    }
}

unsafe extern "C-unwind" fn check_range(
    arr: Handle,
    quiet: u8,
    pos: *mut Point2i,
    min_val: f64,
    max_val: f64,
    status: *mut i32,
) -> u8 {
    *status = 0;
    let m = mat(arr);
    let elems = f64_elems(m);
    for (i, &v) in elems.iter().enumerate() {
        if v.is_nan() || v.is_infinite() || v < min_val || v >= max_val {
            let cols = m.cols as usize;
            *pos = Point2i::new((i % cols) as i32, (i / cols) as i32);
            if quiet != 0 {
                return 0;
            }
            *status = ERR_OUT_OF_RANGE;
            return 0;
        }
    }
    1
}

unsafe extern "C-unwind" fn min_max_idx(
    src: Handle,
    min_val: *mut f64,
    max_val: *mut f64,
    min_idx: *mut i32,
    max_idx: *mut i32,
    mask: Handle,
    status: *mut i32,
) {
    *status = 0;
    if PANIC_MIN_MAX.load(Ordering::SeqCst) {
        panic!("injected native failure in cveMinMaxIdx");
    }

    let m = mat(src);
    let elems = f64_elems(m);
    let mask_bytes = if mask.is_null() {
        None
    } else {
        Some(u8_elems(mat(mask)))
    };
    if let Some(bytes) = mask_bytes {
        if bytes.iter().all(|&b| b == 0) {
            *status = ERR_BAD_ARG;
            return;
        }
    }

    let cols = m.cols as usize;
    let mut best: Option<(usize, f64, usize, f64)> = None;
    for (i, &v) in elems.iter().enumerate() {
        if let Some(bytes) = mask_bytes {
            if bytes[i] == 0 {
                continue;
            }
        }
        best = Some(match best {
            None => (i, v, i, v),
            Some((mi, mv, xi, xv)) => {
                let (mi, mv) = if v < mv { (i, v) } else { (mi, mv) };
                let (xi, xv) = if v > xv { (i, v) } else { (xi, xv) };
                (mi, mv, xi, xv)
            }
        });
    }

    match best {
        Some((mi, mv, xi, xv)) => {
            *min_val = mv;
            *max_val = xv;
            *min_idx = (mi / cols) as i32;
            *min_idx.add(1) = (mi % cols) as i32;
            *max_idx = (xi / cols) as i32;
            *max_idx.add(1) = (xi % cols) as i32;
        }
        None => *status = ERR_BAD_ARG,
    }
}

unsafe extern "C-unwind" fn solve_lp(
    _function: Handle,
    _constraints: Handle,
    _solution: Handle,
    status: *mut i32,
) -> i32 {
    *status = 0;
    SOLVE_LP_CODE.load(Ordering::SeqCst)
}

// --- imgproc / photo / video -----------------------------------------------

macro_rules! counted_stub {
    ($name:ident, $counter:ident, ($($arg:ident: $ty:ty),*)) => {
        unsafe extern "C-unwind" fn $name($($arg: $ty,)* status: *mut i32) {
            $(let _ = $arg;)*
            *status = 0;
            $counter.fetch_add(1, Ordering::SeqCst);
        }
    };
}

counted_stub!(
    grab_cut,
    GRAB_CUT_CALLS,
    (
        img: Handle,
        mask: Handle,
        rect: *mut Rect2i,
        bgd: Handle,
        fgd: Handle,
        iter_count: i32,
        mode: i32
    )
);
counted_stub!(
    apply_color_map,
    COLOR_MAP_CALLS,
    (src: Handle, dst: Handle, map: i32)
);
counted_stub!(
    filter_2d,
    FILTER_2D_CALLS,
    (
        src: Handle,
        dst: Handle,
        kernel: Handle,
        anchor: *mut Point2i,
        delta: f64,
        border: i32
    )
);
counted_stub!(
    clahe,
    CLAHE_CALLS,
    (src: Handle, clip: f64, tile: *mut Size2i, dst: Handle)
);
counted_stub!(
    adaptive_bilateral_filter,
    ABF_CALLS,
    (
        src: Handle,
        dst: Handle,
        ksize: *mut Size2i,
        sigma_space: f64,
        max_sigma_color: f64,
        anchor: *mut Point2i,
        border: i32
    )
);
counted_stub!(
    fast_nl_means_denoising,
    NLM_CALLS,
    (src: Handle, dst: Handle, h: f32, template_window: i32, search_window: i32)
);
counted_stub!(
    fast_nl_means_denoising_colored,
    NLM_COLOR_CALLS,
    (
        src: Handle,
        dst: Handle,
        h: f32,
        h_color: f32,
        template_window: i32,
        search_window: i32
    )
);
counted_stub!(
    calc_optical_flow_dual_tvl1,
    FLOW_CALLS,
    (prev: Handle, next: Handle, flow: Handle)
);

// --- calib3d / contrib -----------------------------------------------------

/// Least-squares affine fit; enough native behavior to validate marshaling.
unsafe extern "C-unwind" fn estimate_affine_3d(
    src: Handle,
    dst: Handle,
    estimate: Handle,
    inliers: Handle,
    _ransac_threshold: f64,
    _confidence: f64,
    status: *mut i32,
) -> i32 {
    *status = 0;
    let src_m = mat(src);
    let dst_m = mat(dst);
    let n = (src_m.cols * src_m.rows) as usize;
    if n < 4 || n != (dst_m.cols * dst_m.rows) as usize {
        *status = ERR_BAD_ARG;
        return 0;
    }
    let src_pts = f32_elems(src_m);
    let dst_pts = f32_elems(dst_m);

    // Solve X * w = b column-wise, X = [x y z 1] per point.
    let x = DMatrix::<f64>::from_fn(n, 4, |r, c| {
        if c == 3 {
            1.0
        } else {
            f64::from(src_pts[r * 3 + c])
        }
    });
    let b = DMatrix::<f64>::from_fn(n, 3, |r, c| f64::from(dst_pts[r * 3 + c]));
    let xtx = x.transpose() * &x;
    let xtb = x.transpose() * b;
    let Some(w) = xtx.lu().solve(&xtb) else {
        *status = ERR_BAD_ARG;
        return 0;
    };

    let est = mat(estimate);
    for row in 0..3 {
        let out = est.data.add(row * est.step) as *mut f64;
        for col in 0..4 {
            // `w` is 4x3; the estimate matrix is its transpose.
            *out.add(col) = w[(col, row)];
        }
    }

    (*(inliers as *mut FakeVecU8)).0 = vec![1u8; n];
    1
}

unsafe extern "C-unwind" fn find_circles_grid(
    _image: Handle,
    _pattern_size: *mut Size2i,
    _centers: Handle,
    _flags: i32,
    status: *mut i32,
) -> u8 {
    *status = 0;
    1
}

unsafe extern "C-unwind" fn chamfer_matching(
    _img: Handle,
    _templ: Handle,
    contours: Handle,
    cost: Handle,
    _template_scale: f64,
    max_matches: i32,
    _min_match_distance: f64,
    _pad_x: i32,
    _pad_y: i32,
    _scales: i32,
    _min_scale: f64,
    _max_scale: f64,
    _orientation_weight: f64,
    _truncate: f64,
    status: *mut i32,
) -> i32 {
    *status = 0;
    if PANIC_CHAMFER.load(Ordering::SeqCst) {
        panic!("injected native failure in cvChamferMatching");
    }
    let _ = max_matches;
    (*(contours as *mut FakeVecVecPoint)).0 = vec![vec![Point2i::new(0, 0), Point2i::new(1, 0)]];
    (*(cost as *mut FakeVecF32)).0 = vec![0.5];
    1
}

// --- Table -----------------------------------------------------------------

pub fn fake_api() -> NativeApi {
    NativeApi {
        get_struct_sizes,
        mat_create_from_buffer,
        mat_release,
        vec_u8_create,
        vec_u8_release,
        vec_u8_size,
        vec_u8_copy_data,
        vec_f32_create,
        vec_f32_release,
        vec_f32_size,
        vec_f32_copy_data,
        vec_vec_point_create,
        vec_vec_point_release,
        vec_vec_point_size,
        vec_vec_point_size_at,
        vec_vec_point_copy_at,
        sqrt,
        check_range,
        min_max_idx,
        solve_lp,
        grab_cut,
        apply_color_map,
        filter_2d,
        clahe,
        adaptive_bilateral_filter,
        fast_nl_means_denoising,
        fast_nl_means_denoising_colored,
        calc_optical_flow_dual_tvl1,
        estimate_affine_3d,
        find_circles_grid,
        chamfer_matching,
    }
}
