//! fWHR box construction and the width/height ratio.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmarks::{Landmark, LandmarkSet};
use crate::pose::PoseCheck;
use crate::types::Point;

/// Heights below this many pixels are rejected as degenerate.
pub const MIN_HEIGHT_PX: f32 = 1e-3;

/// The eyelid top line is raised by this many pixels so it sits on the lid
/// instead of the eye opening.
pub const EYELID_OFFSET_PX: f32 = 4.0;

/// Which feature bounds the face height from above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopLine {
    /// Lower edge of the eyebrows (18/25)
    Eyebrow,
    /// Upper eyelids (37/43)
    #[default]
    Eyelid,
}

/// Which side of the face the top/bottom y coordinates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightMethod {
    /// Mean of left and right, which absorbs small head roll
    #[default]
    Average,
    Left,
    Right,
}

impl FromStr for TopLine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eyebrow" => Ok(TopLine::Eyebrow),
            "eyelid" => Ok(TopLine::Eyelid),
            other => Err(format!(
                "invalid top line '{other}', use either 'eyebrow' or 'eyelid'"
            )),
        }
    }
}

impl FromStr for HeightMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(HeightMethod::Average),
            "left" => Ok(HeightMethod::Left),
            "right" => Ok(HeightMethod::Right),
            other => Err(format!(
                "invalid height method '{other}', use 'average', 'left' or 'right'"
            )),
        }
    }
}

impl fmt::Display for TopLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopLine::Eyebrow => "eyebrow",
            TopLine::Eyelid => "eyelid",
        })
    }
}

impl fmt::Display for HeightMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeightMethod::Average => "average",
            HeightMethod::Left => "left",
            HeightMethod::Right => "right",
        })
    }
}

/// Measurement settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FwhrOptions {
    pub top: TopLine,
    pub method: HeightMethod,
    /// Reject faces that fail the frontal pose check.
    pub pose_check: bool,
}

impl Default for FwhrOptions {
    fn default() -> Self {
        Self {
            top: TopLine::default(),
            method: HeightMethod::default(),
            pose_check: true,
        }
    }
}

/// The four points the ratio is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioPoints {
    pub width_left: Point,
    pub width_right: Point,
    pub height_top: Point,
    pub height_bottom: Point,
}

impl RatioPoints {
    /// Select the ratio points for a face according to `options`.
    pub fn from_set(set: &LandmarkSet, options: &FwhrOptions) -> Result<Self> {
        Ok(FwhrBox::from_set(set, options)?.ratio_points())
    }

    pub fn width(&self) -> f32 {
        self.width_left.distance(&self.width_right)
    }

    pub fn height(&self) -> f32 {
        self.height_top.distance(&self.height_bottom)
    }
}

/// Facial width-to-height ratio: Euclidean width distance over Euclidean
/// height distance.
///
/// Fails with [`Error::DegenerateGeometry`] when a coordinate is not finite,
/// the height is below [`MIN_HEIGHT_PX`], or a distance overflows.
pub fn calculate(points: &RatioPoints) -> Result<f32> {
    let corners = [
        points.width_left,
        points.width_right,
        points.height_top,
        points.height_bottom,
    ];
    if !corners.iter().all(Point::is_finite) {
        return Err(Error::DegenerateGeometry(format!(
            "non-finite landmark coordinates {corners:?}"
        )));
    }

    let width = points.width();
    let height = points.height();

    if !width.is_finite() || !height.is_finite() {
        return Err(Error::DegenerateGeometry(format!(
            "non-finite distance (width {width}, height {height})"
        )));
    }
    if height < MIN_HEIGHT_PX {
        return Err(Error::DegenerateGeometry(format!(
            "height distance {height}px is below {MIN_HEIGHT_PX}px"
        )));
    }

    Ok(width / height)
}

/// Axis-aligned box spanning the face width and the brow/eyelid-to-lip height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FwhrBox {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl FwhrBox {
    pub fn from_set(set: &LandmarkSet, options: &FwhrOptions) -> Result<Self> {
        let face_left = set.get(Landmark::FaceLeft)?;
        let face_right = set.get(Landmark::FaceRight)?;

        let (top_left, top_right) = match options.top {
            TopLine::Eyebrow => (set.get(Landmark::BrowLeft)?, set.get(Landmark::BrowRight)?),
            TopLine::Eyelid => (
                set.get(Landmark::EyelidLeft)?,
                set.get(Landmark::EyelidRight)?,
            ),
        };
        let bottom_left = set.get(Landmark::UpperLipLeft)?;
        let bottom_right = set.get(Landmark::UpperLipRight)?;

        let (mut top_y, bottom_y) = match options.method {
            HeightMethod::Left => (top_left.y, bottom_left.y),
            HeightMethod::Right => (top_right.y, bottom_right.y),
            HeightMethod::Average => (
                top_left.midpoint(&top_right).y,
                bottom_left.midpoint(&bottom_right).y,
            ),
        };
        if options.top == TopLine::Eyelid {
            top_y -= EYELID_OFFSET_PX;
        }

        tracing::debug!(
            left_x = face_left.x,
            right_x = face_right.x,
            top_y,
            bottom_y,
            top = %options.top,
            method = %options.method,
            "fWHR box"
        );

        Ok(Self {
            top_left: Point::new(face_left.x, top_y),
            top_right: Point::new(face_right.x, top_y),
            bottom_left: Point::new(face_left.x, bottom_y),
            bottom_right: Point::new(face_right.x, bottom_y),
        })
    }

    /// Width along the top edge, height along the left edge.
    pub fn ratio_points(&self) -> RatioPoints {
        RatioPoints {
            width_left: self.top_left,
            width_right: self.top_right,
            height_top: self.top_left,
            height_bottom: self.bottom_left,
        }
    }
}

/// Result of measuring one face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub ratio: f32,
    pub width: f32,
    pub height: f32,
    #[serde(rename = "box")]
    pub fwhr_box: FwhrBox,
    /// Pose metrics, when the pose landmarks were available.
    pub pose: Option<PoseCheck>,
    pub options: FwhrOptions,
}

/// Measure the fWHR of one face.
///
/// With `options.pose_check` set, a face that is not frontal fails with
/// [`Error::UnsuitablePose`]. Otherwise the pose metrics are reported when
/// the landmarks allow it and never block the measurement.
pub fn measure(set: &LandmarkSet, options: &FwhrOptions) -> Result<Measurement> {
    let pose = if options.pose_check {
        let check = PoseCheck::from_set(set)?;
        if !check.is_frontal() {
            return Err(Error::UnsuitablePose(check));
        }
        Some(check)
    } else {
        PoseCheck::from_set(set).ok()
    };

    let fwhr_box = FwhrBox::from_set(set, options)?;
    let points = fwhr_box.ratio_points();
    let ratio = calculate(&points)?;

    Ok(Measurement {
        ratio,
        width: points.width(),
        height: points.height(),
        fwhr_box,
        pose,
        options: *options,
    })
}
