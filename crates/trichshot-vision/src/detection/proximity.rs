//! Hand-to-zone proximity evaluation.

use serde::{Deserialize, Serialize};
use trichshot_models::{DangerZone, LandmarkSet, NormalizedRect};

/// Result of scoring one set of hands against the danger zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    /// At least one keypoint of some hand lies inside the zone
    pub any_in_zone: bool,
    /// Smallest normalized vertical distance from any keypoint to the zone
    /// (0 when a keypoint is inside the band); `None` without hands
    pub min_distance_to_zone: Option<f64>,
    /// `min_distance_to_zone` in pixel rows
    pub min_distance_px: Option<f64>,
    /// Hands with at least one keypoint inside the zone
    pub hands_in_zone: usize,
    /// Largest fraction of a single hand's keypoints inside the zone (0.0 - 1.0)
    pub score: f64,
    /// Bounding box of each hand, in input order
    pub hand_bounds: Vec<NormalizedRect>,
}

/// Score landmark sets against the zone.
///
/// A hand is in the zone when any of its keypoints has `y` within
/// `[top_pct, bottom_pct]` (and `x` within `[left_pct, right_pct]` when the
/// zone is narrowed). Distances are vertical only and feed the UI; they never
/// decide triggering.
pub fn evaluate(hands: &[LandmarkSet], zone: &DangerZone, frame_height: u32) -> ProximityResult {
    let mut result = ProximityResult::default();

    for hand in hands {
        if hand.is_empty() {
            continue;
        }
        if let Some(bounds) = hand.bounds() {
            result.hand_bounds.push(bounds);
        }

        let mut inside = 0usize;
        for kp in &hand.keypoints {
            if zone.contains(kp.x, kp.y) {
                inside += 1;
            }
            let distance = zone.vertical_distance(kp.y);
            result.min_distance_to_zone = Some(match result.min_distance_to_zone {
                Some(current) => current.min(distance),
                None => distance,
            });
        }

        if inside > 0 {
            result.hands_in_zone += 1;
            result.any_in_zone = true;
        }
        result.score = result.score.max(inside as f64 / hand.len() as f64);
    }

    result.min_distance_px = result
        .min_distance_to_zone
        .map(|d| d * frame_height as f64);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(top: f64, bottom: f64) -> DangerZone {
        DangerZone::new(top, bottom).unwrap()
    }

    #[test]
    fn test_no_landmarks_not_in_zone() {
        let result = evaluate(&[], &zone(0.3, 0.6), 480);
        assert!(!result.any_in_zone);
        assert_eq!(result.min_distance_to_zone, None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_keypoints_outside_never_in_zone() {
        let zones = [(0.0, 0.2), (0.3, 0.6), (0.5, 0.75), (0.8, 1.0)];
        for (top, bottom) in zones {
            let z = zone(top, bottom);
            let mut points = Vec::new();
            let mut y = 0.0;
            while y <= 1.0 {
                if y < top || y > bottom {
                    points.push((0.5, y));
                }
                y += 0.01;
            }
            let hand = LandmarkSet::from_points(&points);
            let result = evaluate(&[hand], &z, 480);
            assert!(!result.any_in_zone, "zone {}..{}", top, bottom);
            assert!(result.min_distance_to_zone.unwrap() > 0.0);
        }
    }

    #[test]
    fn test_single_keypoint_inside_triggers() {
        let z = zone(0.3, 0.6);
        for y in [0.3, 0.45, 0.6] {
            let hand = LandmarkSet::from_points(&[(0.1, 0.9), (0.2, y), (0.3, 0.05)]);
            let result = evaluate(&[hand], &z, 480);
            assert!(result.any_in_zone, "y={}", y);
            assert_eq!(result.hands_in_zone, 1);
            assert_eq!(result.min_distance_to_zone, Some(0.0));
        }
    }

    #[test]
    fn test_min_distance_to_nearest_boundary() {
        let z = zone(0.3, 0.6);
        let above = LandmarkSet::from_points(&[(0.5, 0.1), (0.5, 0.2)]);
        let below = LandmarkSet::from_points(&[(0.5, 0.95)]);
        let result = evaluate(&[above, below], &z, 500);
        let d = result.min_distance_to_zone.unwrap();
        assert!((d - 0.1).abs() < 1e-9);
        assert!((result.min_distance_px.unwrap() - 50.0).abs() < 1e-6);
        assert_eq!(result.hand_bounds.len(), 2);
    }

    #[test]
    fn test_score_is_largest_hand_fraction() {
        let z = zone(0.4, 0.6);
        let half = LandmarkSet::from_points(&[(0.5, 0.5), (0.5, 0.9)]);
        let quarter = LandmarkSet::from_points(&[(0.5, 0.5), (0.5, 0.1), (0.5, 0.1), (0.5, 0.1)]);
        let result = evaluate(&[quarter, half], &z, 480);
        assert_eq!(result.hands_in_zone, 2);
        assert!((result.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_narrowed_zone_checks_x() {
        let z = zone(0.3, 0.6).with_horizontal(0.25, 0.75).unwrap();
        let outside_x = LandmarkSet::from_points(&[(0.1, 0.5)]);
        let inside = LandmarkSet::from_points(&[(0.5, 0.5)]);
        assert!(!evaluate(&[outside_x], &z, 480).any_in_zone);
        assert!(evaluate(&[inside], &z, 480).any_in_zone);
    }
}
