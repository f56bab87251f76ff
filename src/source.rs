//! Where landmark sets come from.
//!
//! Detection and landmark localisation are external collaborators. Anything
//! that turns an image path into per-face [`LandmarkSet`]s implements
//! [`LandmarkSource`]. The sidecar source reads landmarks another tool has
//! already computed; the `detect` feature adds a dlib-backed source.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fwhr::{measure, FwhrOptions, Measurement};
use crate::landmarks::{Landmark, LandmarkSet};
use crate::types::{Point, Shape};

/// Produces landmark sets, one per detected face, for an image.
pub trait LandmarkSource {
    /// Landmark sets for every face found in `image`, in detection order.
    /// An image without faces yields an empty vector.
    fn landmarks(&mut self, image: &Path) -> Result<Vec<LandmarkSet>>;
}

/// Pick face `index` out of a source result.
pub fn select_face(mut sets: Vec<LandmarkSet>, index: usize) -> Result<LandmarkSet> {
    if sets.is_empty() {
        return Err(Error::NoFaceDetected);
    }
    if index >= sets.len() {
        return Err(Error::FaceIndexOutOfRange {
            index,
            count: sets.len(),
        });
    }
    Ok(sets.swap_remove(index))
}

/// Query `source` for `image` and measure face `face`.
pub fn measure_image<S: LandmarkSource + ?Sized>(
    source: &mut S,
    image: &Path,
    face: usize,
    options: &FwhrOptions,
) -> Result<Measurement> {
    if !image.is_file() {
        return Err(Error::FileNotFound(image.to_path_buf()));
    }

    let sets = source.landmarks(image)?;
    tracing::debug!(image = %image.display(), faces = sets.len(), "landmarks received");

    let set = select_face(sets, face)?;
    let measurement = measure(&set, options)?;
    tracing::info!(image = %image.display(), ratio = measurement.ratio, "measured fWHR");
    Ok(measurement)
}

/// Reads precomputed landmarks from a JSON file.
///
/// By default the file sits next to the image as `<image>.landmarks.json`,
/// e.g. `portrait.jpg.landmarks.json`. The file holds an array of faces.
/// Each face is either an array of `[x, y]` pairs in 68-point order or an
/// object keyed by landmark name:
///
/// ```json
/// [
///   [[101, 198], [102, 221], ...],
///   {"face_left": [40, 80], "face_right": [120, 80], "eyelid_left": [60, 62], ...}
/// ]
/// ```
#[derive(Debug, Clone, Default)]
pub struct SidecarSource {
    path: Option<PathBuf>,
}

impl SidecarSource {
    /// Look for `<image>.landmarks.json` next to each image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always read landmarks from `path`, whatever the image.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name = image.as_os_str().to_os_string();
        name.push(".landmarks.json");
        PathBuf::from(name)
    }
}

impl LandmarkSource for SidecarSource {
    fn landmarks(&mut self, image: &Path) -> Result<Vec<LandmarkSet>> {
        if !image.is_file() {
            return Err(Error::FileNotFound(image.to_path_buf()));
        }

        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::sidecar_path(image),
        };
        if !path.is_file() {
            return Err(Error::FileNotFound(path));
        }

        tracing::debug!(sidecar = %path.display(), "reading landmarks");
        parse_sidecar(&fs::read_to_string(&path)?)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Pair([f32; 2]),
    Object { x: f32, y: f32 },
}

impl From<RawPoint> for Point {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Pair([x, y]) => Point::new(x, y),
            RawPoint::Object { x, y } => Point::new(x, y),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFace {
    Ordered(Vec<RawPoint>),
    Named(BTreeMap<String, RawPoint>),
}

/// Parse the contents of a landmark sidecar file.
pub fn parse_sidecar(json: &str) -> Result<Vec<LandmarkSet>> {
    let faces: Vec<RawFace> = serde_json::from_str(json)?;

    faces
        .into_iter()
        .map(|face| match face {
            RawFace::Ordered(points) => {
                let shape: Shape = points.into_iter().map(Point::from).collect();
                Ok(LandmarkSet::from_shape(&shape))
            }
            RawFace::Named(points) => points
                .into_iter()
                .map(|(name, p)| name.parse::<Landmark>().map(|lm| (lm, Point::from(p))))
                .collect(),
        })
        .collect()
}
