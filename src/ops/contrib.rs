//! Chamfer matching of edge images.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Point2i;
use crate::handle::{InputArray, OutputArray};
use crate::native::{self, sym};
use crate::vector::{VectorOfF32, VectorOfVectorOfPoint};

/// Tuning knobs of [`chamfer_matching`]; the defaults are the ones the
/// native documentation recommends.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChamferOptions {
    pub template_scale: f64,
    pub max_matches: i32,
    pub min_match_distance: f64,
    pub pad_x: i32,
    pub pad_y: i32,
    pub scales: i32,
    pub min_scale: f64,
    pub max_scale: f64,
    pub orientation_weight: f64,
    pub truncate: f64,
}

impl Default for ChamferOptions {
    fn default() -> Self {
        Self {
            template_scale: 1.0,
            max_matches: 20,
            min_match_distance: 1.0,
            pad_x: 3,
            pad_y: 3,
            scales: 5,
            min_scale: 0.6,
            max_scale: 1.6,
            orientation_weight: 0.5,
            truncate: 20.0,
        }
    }
}

/// Matches found by [`chamfer_matching`], drained from the native vectors.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChamferMatches {
    /// Native match count, forwarded unchanged.
    pub count: i32,
    /// One contour (point polyline) per match.
    pub contours: Vec<Vec<Point2i>>,
    /// One cost per match.
    pub costs: Vec<f32>,
}

/// Chamfer matching between an edge image and an edge template, scoring both
/// pixel distance and orientation alignment.
///
/// Creates the two output vector handles, lets the native call populate
/// them, drains both into fixed-size results, and disposes them exactly once
/// on every exit path.
pub fn chamfer_matching(
    image: &impl InputArray,
    template: &impl InputArray,
    options: &ChamferOptions,
) -> Result<ChamferMatches> {
    let api = native::api()?;
    let image = image.input_array().require(sym::CHAMFER_MATCHING)?;
    let template = template.input_array().require(sym::CHAMFER_MATCHING)?;

    let contours = VectorOfVectorOfPoint::new()?;
    let costs = VectorOfF32::new()?;

    let mut status = 0i32;
    // SAFETY: image/template handles and both vector handles are live for
    // the duration of the call.
    let count = unsafe {
        (api.chamfer_matching)(
            image,
            template,
            contours.output_array().as_ptr(),
            costs.output_array().as_ptr(),
            options.template_scale,
            options.max_matches,
            options.min_match_distance,
            options.pad_x,
            options.pad_y,
            options.scales,
            options.min_scale,
            options.max_scale,
            options.orientation_weight,
            options.truncate,
            &mut status,
        )
    };
    native::check_status(sym::CHAMFER_MATCHING, status)?;

    Ok(ChamferMatches {
        count,
        contours: contours.to_vec(),
        costs: costs.to_vec(),
    })
}
