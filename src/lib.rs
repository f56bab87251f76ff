//! # fwhr
//!
//! Facial width-to-height ratio (fWHR) measurement from facial landmarks.
//!
//! This crate provides:
//! - **Landmark Sets**: named facial keypoints over the 68-point (iBUG 300-W) layout
//! - **Ratio Calculator**: width distance / height distance with explicit failure modes
//! - **fWHR Box**: cheekbone width against brow/eyelid-to-upper-lip height
//! - **Pose Check**: rejects faces that are not looking straight at the camera
//! - **Annotation & Bulk**: draw the measurement box, measure whole folders into CSV
//!
//! Face detection and landmark localisation are not done here. They come from a
//! [`LandmarkSource`]: a JSON sidecar of precomputed landmarks, or (with the
//! `detect` feature) rustface detection plus the dlib 68-point shape predictor.
//!
//! ## Measurement
//!
//! 1. Width line: x of the leftmost and rightmost jaw points (0 and 16)
//! 2. Top line: lower eyebrow (18/25) or upper eyelid (37/43, raised 4px)
//! 3. Bottom line: upper lip peaks (50/52)
//! 4. Top and bottom are taken from the left pair, the right pair, or their average
//! 5. fWHR = width / height
//!
//! ## Quick Start
//!
//! ```rust
//! use fwhr::{calculate, RatioPoints, Point};
//!
//! let points = RatioPoints {
//!     width_left: Point::new(10.0, 50.0),
//!     width_right: Point::new(90.0, 50.0),
//!     height_top: Point::new(50.0, 10.0),
//!     height_bottom: Point::new(50.0, 90.0),
//! };
//! let ratio = calculate(&points).unwrap();
//! assert!((ratio - 1.0).abs() < 1e-6);
//! ```
//!
//! ## From a landmark set
//!
//! ```rust
//! use fwhr::{measure, FwhrOptions, Landmark, LandmarkSet, Point};
//!
//! let set: LandmarkSet = [
//!     (Landmark::FaceLeft, Point::new(100.0, 200.0)),
//!     (Landmark::FaceRight, Point::new(300.0, 200.0)),
//!     (Landmark::BrowLeft, Point::new(140.0, 150.0)),
//!     (Landmark::BrowRight, Point::new(260.0, 150.0)),
//!     (Landmark::EyelidLeft, Point::new(145.0, 165.0)),
//!     (Landmark::EyelidRight, Point::new(255.0, 165.0)),
//!     (Landmark::UpperLipLeft, Point::new(190.0, 250.0)),
//!     (Landmark::UpperLipRight, Point::new(210.0, 250.0)),
//! ]
//! .into_iter()
//! .collect();
//!
//! let options = FwhrOptions { pose_check: false, ..Default::default() };
//! let m = measure(&set, &options).unwrap();
//! println!("fWHR = {:.3}", m.ratio);
//! ```

pub mod annotate;
pub mod bulk;
mod config;
#[cfg(feature = "detect")]
pub mod dlib;
mod error;
mod fwhr;
mod landmarks;
mod pose;
mod source;
mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use fwhr::{
    calculate, measure, FwhrBox, FwhrOptions, HeightMethod, Measurement, RatioPoints, TopLine,
    EYELID_OFFSET_PX, MIN_HEIGHT_PX,
};
pub use landmarks::{Landmark, LandmarkSet};
pub use pose::PoseCheck;
pub use source::{measure_image, parse_sidecar, select_face, LandmarkSource, SidecarSource};
pub use types::{Point, Shape};
