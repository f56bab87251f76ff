use std::path::PathBuf;

use thiserror::Error;

use crate::landmarks::Landmark;
use crate::pose::PoseCheck;

#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No face detected")]
    NoFaceDetected,

    #[error("Face {index} requested but only {count} detected")]
    FaceIndexOutOfRange { index: usize, count: usize },

    #[error("Missing landmark: {0}")]
    MissingLandmark(Landmark),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Picture is not suitable for fWHR measurement ({0})")]
    UnsuitablePose(PoseCheck),

    #[error("Invalid landmarks: {0}")]
    InvalidLandmarks(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
