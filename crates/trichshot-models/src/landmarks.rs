//! Hand landmark models.
//!
//! Coordinates are normalized to the frame: (0, 0) is the top-left corner and
//! (1, 1) the bottom-right. Depth, when the model reports it, is relative to
//! the wrist and carries no fixed scale.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of keypoints in a full hand landmark set (wrist + 4 per finger).
pub const HAND_KEYPOINT_COUNT: usize = 21;

/// A single normalized keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Which hand the model believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// A normalized rectangle (0.0 to 1.0) representing a relative region of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormalizedRect {
    /// X coordinate of the top-left corner (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Y coordinate of the top-left corner (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Width of the rectangle (0.0 to 1.0)
    pub width: f64,
    /// Height of the rectangle (0.0 to 1.0)
    pub height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Keypoints describing one detected hand in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LandmarkSet {
    /// Keypoints in model order
    pub keypoints: Vec<Keypoint>,
    /// Handedness label, when the model provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    /// Detection confidence, when the model provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl LandmarkSet {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            handedness: None,
            confidence: None,
        }
    }

    /// Build a set from `(x, y)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().map(|&(x, y)| Keypoint::new(x, y)).collect())
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = Some(handedness);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Tight bounding box around every keypoint, `None` for an empty set.
    pub fn bounds(&self) -> Option<NormalizedRect> {
        let first = self.keypoints.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for kp in &self.keypoints[1..] {
            min_x = min_x.min(kp.x);
            max_x = max_x.max(kp.x);
            min_y = min_y.min(kp.y);
            max_y = max_y.max(kp.y);
        }
        Some(NormalizedRect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let set = LandmarkSet::from_points(&[(0.2, 0.4), (0.5, 0.1), (0.3, 0.7)]);
        let b = set.bounds().unwrap();
        assert!((b.x - 0.2).abs() < 1e-9);
        assert!((b.y - 0.1).abs() < 1e-9);
        assert!((b.right() - 0.5).abs() < 1e-9);
        assert!((b.bottom() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_empty_set_has_no_bounds() {
        assert!(LandmarkSet::new(Vec::new()).bounds().is_none());
    }

    #[test]
    fn test_serde_skips_missing_optionals() {
        let set = LandmarkSet::from_points(&[(0.1, 0.2)]).with_handedness(Handedness::Left);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"handedness\":\"left\""));
        assert!(!json.contains("confidence"));
        assert!(!json.contains("\"z\""));
    }
}
