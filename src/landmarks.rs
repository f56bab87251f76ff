//! Named facial landmarks and per-face landmark sets.
//!
//! Landmark models return points by index. The measurement code only cares
//! about a handful of them, so each one gets a name here together with its
//! index in the 68-point (iBUG 300-W) layout used by dlib.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Point, Shape};

/// A facial feature point used by the fWHR measurement or the pose check.
///
/// "Left" and "right" follow image coordinates: left is the smaller x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    /// Leftmost jaw/cheek boundary (0)
    FaceLeft,
    /// Rightmost jaw/cheek boundary (16)
    FaceRight,
    /// Lower edge of the left eyebrow (18)
    BrowLeft,
    /// Lower edge of the right eyebrow (25)
    BrowRight,
    /// Top of the nose bridge (27)
    NoseBridge,
    /// Nose tip (30)
    NoseTip,
    /// Outer corner of the left eye (36)
    EyeLeftOuter,
    /// Upper lid of the left eye (37)
    EyelidLeft,
    /// Lower lid of the left eye (41)
    EyeLeftLower,
    /// Upper lid of the right eye, inner half (43)
    EyelidRight,
    /// Upper lid of the right eye, outer half (44)
    EyeRightUpper,
    /// Outer corner of the right eye (45)
    EyeRightOuter,
    /// Lower lid of the right eye (46)
    EyeRightLower,
    /// Left peak of the upper lip (50)
    UpperLipLeft,
    /// Right peak of the upper lip (52)
    UpperLipRight,
}

impl Landmark {
    pub const ALL: [Landmark; 15] = [
        Landmark::FaceLeft,
        Landmark::FaceRight,
        Landmark::BrowLeft,
        Landmark::BrowRight,
        Landmark::NoseBridge,
        Landmark::NoseTip,
        Landmark::EyeLeftOuter,
        Landmark::EyelidLeft,
        Landmark::EyeLeftLower,
        Landmark::EyelidRight,
        Landmark::EyeRightUpper,
        Landmark::EyeRightOuter,
        Landmark::EyeRightLower,
        Landmark::UpperLipLeft,
        Landmark::UpperLipRight,
    ];

    /// Index of this landmark in the 68-point layout.
    pub const fn index_68(self) -> usize {
        match self {
            Landmark::FaceLeft => 0,
            Landmark::FaceRight => 16,
            Landmark::BrowLeft => 18,
            Landmark::BrowRight => 25,
            Landmark::NoseBridge => 27,
            Landmark::NoseTip => 30,
            Landmark::EyeLeftOuter => 36,
            Landmark::EyelidLeft => 37,
            Landmark::EyeLeftLower => 41,
            Landmark::EyelidRight => 43,
            Landmark::EyeRightUpper => 44,
            Landmark::EyeRightOuter => 45,
            Landmark::EyeRightLower => 46,
            Landmark::UpperLipLeft => 50,
            Landmark::UpperLipRight => 52,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Landmark::FaceLeft => "face_left",
            Landmark::FaceRight => "face_right",
            Landmark::BrowLeft => "brow_left",
            Landmark::BrowRight => "brow_right",
            Landmark::NoseBridge => "nose_bridge",
            Landmark::NoseTip => "nose_tip",
            Landmark::EyeLeftOuter => "eye_left_outer",
            Landmark::EyelidLeft => "eyelid_left",
            Landmark::EyeLeftLower => "eye_left_lower",
            Landmark::EyelidRight => "eyelid_right",
            Landmark::EyeRightUpper => "eye_right_upper",
            Landmark::EyeRightOuter => "eye_right_outer",
            Landmark::EyeRightLower => "eye_right_lower",
            Landmark::UpperLipLeft => "upper_lip_left",
            Landmark::UpperLipRight => "upper_lip_right",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (point {})", self.name(), self.index_68())
    }
}

impl FromStr for Landmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Landmark::ALL
            .iter()
            .copied()
            .find(|lm| lm.name() == s)
            .ok_or_else(|| Error::InvalidLandmarks(format!("unknown landmark name '{s}'")))
    }
}

/// Named landmark points for a single detected face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: BTreeMap<Landmark, Point>,
}

impl LandmarkSet {
    /// Pick the named landmarks out of a 68-point shape.
    ///
    /// Shapes from smaller models (e.g. dlib's 5-point) produce a partial set;
    /// the absent labels surface as [`Error::MissingLandmark`] on lookup.
    pub fn from_shape(shape: &Shape) -> Self {
        Landmark::ALL
            .iter()
            .filter_map(|&lm| shape.get(lm.index_68()).map(|p| (lm, p)))
            .collect()
    }

    pub fn get(&self, landmark: Landmark) -> Result<Point> {
        self.points
            .get(&landmark)
            .copied()
            .ok_or(Error::MissingLandmark(landmark))
    }

    pub fn contains(&self, landmark: Landmark) -> bool {
        self.points.contains_key(&landmark)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Point)> + '_ {
        self.points.iter().map(|(&lm, &p)| (lm, p))
    }

    /// Returns a copy with `landmark` removed.
    pub fn without(&self, landmark: Landmark) -> Self {
        self.iter().filter(|&(lm, _)| lm != landmark).collect()
    }

    /// Returns a copy with every point multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        self.iter().map(|(lm, p)| (lm, p * factor)).collect()
    }
}

impl FromIterator<(Landmark, Point)> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = (Landmark, Point)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// A synthetic frontal 68-point face shared by unit tests.
///
/// Width line x = 100..300, brows at y = 150, eyelids at y = 165,
/// upper lip at y = 250.
#[cfg(test)]
pub(crate) fn frontal_face() -> Shape {
    let mut points = vec![Point::new(0.0, 0.0); 68];
    let mut place = |idx: usize, x: f32, y: f32| {
        points[idx] = Point::new(x, y);
    };
    place(0, 100.0, 200.0);
    place(16, 300.0, 200.0);
    place(18, 140.0, 150.0);
    place(25, 260.0, 150.0);
    place(27, 200.0, 160.0);
    place(30, 200.0, 220.0);
    place(36, 130.0, 170.0);
    place(37, 145.0, 165.0);
    place(41, 145.0, 175.0);
    place(43, 255.0, 165.0);
    place(44, 265.0, 165.0);
    place(45, 270.0, 170.0);
    place(46, 265.0, 175.0);
    place(50, 190.0, 250.0);
    place(52, 210.0, 250.0);
    Shape::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_unique() {
        let mut seen: Vec<usize> = Landmark::ALL.iter().map(|lm| lm.index_68()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Landmark::ALL.len());
        assert!(seen.iter().all(|&i| i < 68));
    }

    #[test]
    fn names_parse_back() {
        for lm in Landmark::ALL {
            assert_eq!(lm.name().parse::<Landmark>().unwrap(), lm);
        }
        assert!(matches!(
            "chin".parse::<Landmark>(),
            Err(Error::InvalidLandmarks(_))
        ));
    }

    #[test]
    fn full_shape_yields_every_landmark() {
        let set = LandmarkSet::from_shape(&frontal_face());
        assert_eq!(set.len(), Landmark::ALL.len());
        assert_eq!(set.get(Landmark::FaceRight).unwrap(), Point::new(300.0, 200.0));
        assert_eq!(set.get(Landmark::UpperLipLeft).unwrap(), Point::new(190.0, 250.0));
    }

    #[test]
    fn short_shape_yields_partial_set() {
        let shape = Shape::new(frontal_face().points[..20].to_vec());
        let set = LandmarkSet::from_shape(&shape);

        assert!(set.contains(Landmark::FaceLeft));
        assert!(set.contains(Landmark::BrowLeft));
        assert!(!set.contains(Landmark::BrowRight));
        assert!(matches!(
            set.get(Landmark::UpperLipLeft),
            Err(Error::MissingLandmark(Landmark::UpperLipLeft))
        ));
    }

    #[test]
    fn serializes_as_named_map() {
        let set: LandmarkSet = [(Landmark::NoseTip, Point::new(1.0, 2.0))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"nose_tip":{"x":1.0,"y":2.0}}"#);
    }

    #[test]
    fn without_and_scaled() {
        let set = LandmarkSet::from_shape(&frontal_face());
        let trimmed = set.without(Landmark::NoseTip);
        assert_eq!(trimmed.len(), set.len() - 1);
        assert!(!trimmed.contains(Landmark::NoseTip));

        let doubled = set.scaled(2.0);
        assert_eq!(doubled.get(Landmark::FaceLeft).unwrap(), Point::new(200.0, 400.0));
    }
}
