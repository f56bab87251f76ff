//! Built-in landmark source: rustface detection + dlib 68-point landmarks.
//!
//! Enabled with the `detect` feature. Needs two model files:
//!
//! - `seeta_fd_frontal_v1.0.bin`, the SeetaFace frontal face detector
//!   shipped with rustface
//! - `shape_predictor_68_face_landmarks.dat` from the dlib-models repository
//!
//! ```ignore
//! use fwhr::dlib::DlibSource;
//! use fwhr::LandmarkSource;
//!
//! let mut source = DlibSource::open(
//!     "seeta_fd_frontal_v1.0.bin".as_ref(),
//!     "shape_predictor_68_face_landmarks.dat".as_ref(),
//!     20,
//! )?;
//! let faces = source.landmarks("portrait.jpg".as_ref())?;
//! ```

use std::path::Path;

use dlib_face_recognition::{ImageMatrix, LandmarkPredictor, LandmarkPredictorTrait, Rectangle};
use rustface::{Detector, ImageData};

use crate::error::{Error, Result};
use crate::landmarks::LandmarkSet;
use crate::source::LandmarkSource;
use crate::types::{Point, Shape};

const SCORE_THRESHOLD: f64 = 2.0;
const PYRAMID_SCALE_FACTOR: f32 = 0.8;
const SLIDE_WINDOW_STEP: u32 = 4;

pub struct DlibSource {
    detector: Box<dyn Detector>,
    predictor: LandmarkPredictor,
}

impl DlibSource {
    pub fn open(detector_model: &Path, predictor_model: &Path, min_face_size: u32) -> Result<Self> {
        if !detector_model.is_file() {
            return Err(Error::FileNotFound(detector_model.to_path_buf()));
        }
        if !predictor_model.is_file() {
            return Err(Error::FileNotFound(predictor_model.to_path_buf()));
        }

        tracing::debug!(model = %detector_model.display(), "loading face detector");
        let detector_path = detector_model
            .to_str()
            .ok_or_else(|| Error::Model("detector path is not valid UTF-8".to_string()))?;
        let mut detector = rustface::create_detector(detector_path)
            .map_err(|e| Error::Model(format!("failed to load face detector: {e}")))?;
        detector.set_min_face_size(min_face_size);
        detector.set_score_thresh(SCORE_THRESHOLD);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        tracing::debug!(model = %predictor_model.display(), "loading landmark predictor");
        let predictor = LandmarkPredictor::open(predictor_model)
            .map_err(|e| Error::Model(format!("failed to load landmark predictor: {e}")))?;

        Ok(Self {
            detector,
            predictor,
        })
    }
}

impl LandmarkSource for DlibSource {
    fn landmarks(&mut self, image: &Path) -> Result<Vec<LandmarkSet>> {
        if !image.is_file() {
            return Err(Error::FileNotFound(image.to_path_buf()));
        }

        let img = image::open(image)?;
        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();

        let faces = self
            .detector
            .detect(&ImageData::new(gray.as_raw(), width, height));
        tracing::debug!(faces = faces.len(), "faces detected");
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let rgb = img.to_rgb8();
        // SAFETY: `rgb` is a packed width x height x 3 buffer that outlives `matrix`.
        let matrix =
            unsafe { ImageMatrix::new(width as usize, height as usize, rgb.as_raw().as_ptr()) };

        let sets = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                let rect = Rectangle {
                    left: bbox.x() as i64,
                    top: bbox.y() as i64,
                    right: bbox.x() as i64 + bbox.width() as i64,
                    bottom: bbox.y() as i64 + bbox.height() as i64,
                };
                let landmarks = self.predictor.face_landmarks(&matrix, &rect);
                let shape: Shape = landmarks
                    .iter()
                    .map(|p| Point::new(p.x() as f32, p.y() as f32))
                    .collect();
                LandmarkSet::from_shape(&shape)
            })
            .collect();

        Ok(sets)
    }
}
