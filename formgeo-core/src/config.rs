//! Tunable thresholds for the layout inference passes
//!
//! Every heuristic number used by the pipeline lives here, both as a named
//! constant and as a field of [`LayoutConfig`], so the passes can be tuned and
//! tested independently of the algorithms that consume them.
//!
//! # Example
//!
//! ```rust
//! use formgeo::config::LayoutConfig;
//!
//! let config = LayoutConfig::default()
//!     .with_proximity_threshold(40.0)
//!     .with_group_size_bounds(2, 4);
//!
//! assert_eq!(config.proximity_threshold, 40.0);
//! assert_eq!(config.max_group_size, 4);
//! ```

use serde::{Deserialize, Serialize};

/// Maximum center-to-center distance (points) between two checkboxes of one group
pub const PROXIMITY_THRESHOLD: f64 = 50.0;

/// Maximum axis offset (points) for two boxes to count as aligned
pub const ALIGNMENT_THRESHOLD: f64 = 8.0;

/// Smallest checkbox cluster converted into a radio group
pub const MIN_GROUP_SIZE: usize = 2;

/// Largest checkbox cluster converted into a radio group
pub const MAX_GROUP_SIZE: usize = 6;

/// Weight of the label match factor in the overall confidence
pub const LABEL_MATCH_WEIGHT: f64 = 0.30;

/// Weight of the position certainty factor in the overall confidence
pub const POSITION_CERTAINTY_WEIGHT: f64 = 0.50;

/// Weight of the type certainty factor in the overall confidence
pub const TYPE_CERTAINTY_WEIGHT: f64 = 0.20;

/// Bonus applied when the model saw a visual boundary around the field
pub const VISUAL_BOUNDARY_BOOST: f64 = 0.05;

/// Lowest overall score in the `high` quality bucket
pub const HIGH_QUALITY_CUTOFF: f64 = 0.85;

/// Lowest overall score in the `medium` quality bucket
pub const MEDIUM_QUALITY_CUTOFF: f64 = 0.70;

/// Fraction of a field's width that an RTL label typically occupies
pub const RTL_LABEL_SHIFT_RATIO: f64 = 0.15;

/// Upper bound (points) on a single RTL horizontal shift
pub const RTL_MAX_SHIFT: f64 = 40.0;

/// Relative weights of the three confidence factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfidenceWeights {
    pub label_match: f64,
    pub position_certainty: f64,
    pub type_certainty: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            label_match: LABEL_MATCH_WEIGHT,
            position_certainty: POSITION_CERTAINTY_WEIGHT,
            type_certainty: TYPE_CERTAINTY_WEIGHT,
        }
    }
}

/// Configuration for the field geometry pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Neighbor distance for checkbox clustering (points)
    pub proximity_threshold: f64,
    /// Same-row / same-column tolerance (points)
    pub alignment_threshold: f64,
    /// Smallest cluster converted to a radio group
    pub min_group_size: usize,
    /// Largest cluster converted to a radio group
    pub max_group_size: usize,
    /// Confidence factor weights
    pub confidence_weights: ConfidenceWeights,
    /// Bonus for a detected visual boundary
    pub visual_boundary_boost: f64,
    /// Threshold of the `high` bucket
    pub high_quality_cutoff: f64,
    /// Threshold of the `medium` bucket
    pub medium_quality_cutoff: f64,
    /// Fraction of width shifted for RTL text-like fields
    pub rtl_label_shift_ratio: f64,
    /// Cap on the RTL shift (points)
    pub rtl_max_shift: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: PROXIMITY_THRESHOLD,
            alignment_threshold: ALIGNMENT_THRESHOLD,
            min_group_size: MIN_GROUP_SIZE,
            max_group_size: MAX_GROUP_SIZE,
            confidence_weights: ConfidenceWeights::default(),
            visual_boundary_boost: VISUAL_BOUNDARY_BOOST,
            high_quality_cutoff: HIGH_QUALITY_CUTOFF,
            medium_quality_cutoff: MEDIUM_QUALITY_CUTOFF,
            rtl_label_shift_ratio: RTL_LABEL_SHIFT_RATIO,
            rtl_max_shift: RTL_MAX_SHIFT,
        }
    }
}

impl LayoutConfig {
    /// Set the checkbox neighbor distance
    pub fn with_proximity_threshold(mut self, threshold: f64) -> Self {
        self.proximity_threshold = threshold;
        self
    }

    /// Set the alignment tolerance
    pub fn with_alignment_threshold(mut self, threshold: f64) -> Self {
        self.alignment_threshold = threshold;
        self
    }

    /// Set the inclusive cluster size range converted to radio groups
    pub fn with_group_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_group_size = min.min(max);
        self.max_group_size = max.max(min);
        self
    }

    /// Set the confidence factor weights
    pub fn with_confidence_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.confidence_weights = weights;
        self
    }

    /// Set the visual boundary bonus
    pub fn with_visual_boundary_boost(mut self, boost: f64) -> Self {
        self.visual_boundary_boost = boost;
        self
    }

    /// Set the RTL shift ratio and cap
    pub fn with_rtl_shift(mut self, ratio: f64, max_shift: f64) -> Self {
        self.rtl_label_shift_ratio = ratio.max(0.0);
        self.rtl_max_shift = max_shift.max(0.0);
        self
    }

    /// Load a configuration from JSON; absent keys keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.proximity_threshold, PROXIMITY_THRESHOLD);
        assert_eq!(config.alignment_threshold, ALIGNMENT_THRESHOLD);
        assert_eq!(config.min_group_size, MIN_GROUP_SIZE);
        assert_eq!(config.max_group_size, MAX_GROUP_SIZE);
        assert_eq!(config.high_quality_cutoff, HIGH_QUALITY_CUTOFF);
        assert_eq!(config.medium_quality_cutoff, MEDIUM_QUALITY_CUTOFF);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ConfidenceWeights::default();
        let sum = w.label_match + w.position_certainty + w.type_certainty;
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_group_size_bounds_are_ordered() {
        let config = LayoutConfig::default().with_group_size_bounds(5, 3);
        assert_eq!(config.min_group_size, 3);
        assert_eq!(config.max_group_size, 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{"proximityThreshold": 30.0}"#).unwrap();
        assert_eq!(config.proximity_threshold, 30.0);
        assert_eq!(config.alignment_threshold, ALIGNMENT_THRESHOLD);
        assert_eq!(config.confidence_weights, ConfidenceWeights::default());
    }

    #[test]
    fn test_negative_rtl_shift_is_clamped() {
        let config = LayoutConfig::default().with_rtl_shift(-0.5, -10.0);
        assert_eq!(config.rtl_label_shift_ratio, 0.0);
        assert_eq!(config.rtl_max_shift, 0.0);
    }
}
