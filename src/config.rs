use std::path::PathBuf;
use std::str::FromStr;

use crate::fwhr::{FwhrOptions, HeightMethod, TopLine};

/// Default SeetaFace frontal detector model for the `detect` feature.
pub const DEFAULT_DETECTOR_MODEL: &str = "seeta_fd_frontal_v1.0.bin";

/// Default dlib 68-point landmark model for the `detect` feature.
pub const DEFAULT_PREDICTOR_MODEL: &str = "shape_predictor_68_face_landmarks.dat";

/// Measurement defaults, loaded from environment variables.
/// Command-line flags override these.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `FWHR_TOP`: eyebrow or eyelid (default: eyelid).
    pub top: TopLine,
    /// `FWHR_METHOD`: average, left or right (default: average).
    pub method: HeightMethod,
    /// `FWHR_POSE_CHECK`: "0", "false", "off" or "no" disables the frontal
    /// pose check. Any other value leaves it on.
    pub pose_check: bool,
    /// `FWHR_DETECTOR_MODEL`: face detector model path.
    pub detector_model: PathBuf,
    /// `FWHR_PREDICTOR_MODEL`: landmark model path.
    pub predictor_model: PathBuf,
    /// `FWHR_MIN_FACE_SIZE`: smallest face the detector reports, in pixels.
    pub min_face_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from `FWHR_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Unparseable values
    /// fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            top: parse_var(&lookup, "FWHR_TOP").unwrap_or_default(),
            method: parse_var(&lookup, "FWHR_METHOD").unwrap_or_default(),
            pose_check: lookup("FWHR_POSE_CHECK").map_or(true, |v| !is_off(&v)),
            detector_model: lookup("FWHR_DETECTOR_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DETECTOR_MODEL)),
            predictor_model: lookup("FWHR_PREDICTOR_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PREDICTOR_MODEL)),
            min_face_size: parse_var(&lookup, "FWHR_MIN_FACE_SIZE").unwrap_or(20),
        }
    }

    pub fn options(&self) -> FwhrOptions {
        FwhrOptions {
            top: self.top,
            method: self.method,
            pose_check: self.pose_check,
        }
    }
}

/// "0", "false", "off" and "no" (any case) switch a flag off.
fn is_off(value: &str) -> bool {
    ["0", "false", "off", "no"]
        .iter()
        .any(|off| value.trim().eq_ignore_ascii_case(off))
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok())
}
