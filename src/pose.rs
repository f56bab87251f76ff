//! Frontal pose check.
//!
//! A face turned or tilted away from the camera foreshortens one axis and
//! skews the ratio. These rules flag such pictures from the landmarks alone.
//! Tilt and skew are expressed in percent of the face width so the thresholds
//! hold at any image scale.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::landmarks::{Landmark, LandmarkSet};

/// Right eye lower than the left by more than this (% of face width) fails.
pub const MAX_EYE_TILT: f32 = 5.0;

/// Nose tip right of the bridge by more than this (% of face width) fails.
pub const MAX_NOSE_SKEW: f32 = 3.5;

/// Left cheek space more than this many times the right one fails.
pub const MAX_SPACE_RATIO: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PoseCheck {
    /// Vertical offset of the right eye against the left, % of face width.
    pub eye_tilt: f32,
    /// Horizontal offset of the nose tip against the bridge, % of face width.
    pub nose_skew: f32,
    /// Face edge to outer eye corner, left over right.
    pub space_ratio: f32,
}

impl PoseCheck {
    pub fn from_set(set: &LandmarkSet) -> Result<Self> {
        let face_left = set.get(Landmark::FaceLeft)?;
        let face_right = set.get(Landmark::FaceRight)?;

        let unit = (face_right.x - face_left.x) / 100.0;
        if unit == 0.0 || !unit.is_finite() {
            return Err(Error::DegenerateGeometry(format!(
                "face width {} is unusable, cannot check pose",
                unit * 100.0
            )));
        }

        let left_eye_y =
            (set.get(Landmark::EyelidLeft)?.y + set.get(Landmark::EyeLeftLower)?.y) / 2.0;
        let right_eye_y =
            (set.get(Landmark::EyeRightUpper)?.y + set.get(Landmark::EyeRightLower)?.y) / 2.0;
        let eye_tilt = (right_eye_y - left_eye_y) / unit;

        let nose_skew = (set.get(Landmark::NoseTip)?.x - set.get(Landmark::NoseBridge)?.x) / unit;

        let left_space = set.get(Landmark::EyeLeftOuter)?.x - face_left.x;
        let right_space = face_right.x - set.get(Landmark::EyeRightOuter)?.x;
        if right_space == 0.0 {
            return Err(Error::DegenerateGeometry(
                "right eye corner lies on the face edge, cannot check pose".to_string(),
            ));
        }
        let space_ratio = left_space / right_space;

        if ![eye_tilt, nose_skew, space_ratio].iter().all(|v| v.is_finite()) {
            return Err(Error::DegenerateGeometry(
                "non-finite landmark coordinates, cannot check pose".to_string(),
            ));
        }

        Ok(Self {
            eye_tilt,
            nose_skew,
            space_ratio,
        })
    }

    /// True when the subject is looking straight at the camera.
    pub fn is_frontal(&self) -> bool {
        self.eye_tilt <= MAX_EYE_TILT
            && self.nose_skew <= MAX_NOSE_SKEW
            && self.space_ratio <= MAX_SPACE_RATIO
    }
}

impl fmt::Display for PoseCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eye tilt {:.2} (max {MAX_EYE_TILT}), nose skew {:.2} (max {MAX_NOSE_SKEW}), space ratio {:.2} (max {MAX_SPACE_RATIO})",
            self.eye_tilt, self.nose_skew, self.space_ratio
        )
    }
}
