//! Multi-factor confidence scoring
//!
//! The model reports three independent certainty signals per field. They are
//! combined with fixed weights into one overall score, optionally boosted when
//! a visual boundary (box, underline) was seen, and bucketed into a quality
//! tier.
//!
//! # Example
//!
//! ```rust
//! use formgeo::confidence::{ConfidenceFactors, ConfidenceScorer, Quality};
//!
//! let factors = ConfidenceFactors::new(1.0, 0.8, 0.9);
//! let result = ConfidenceScorer::new().score(&factors);
//!
//! assert!((result.overall - 0.88).abs() < 1e-9);
//! assert_eq!(result.quality, Quality::High);
//! ```

use crate::config::{ConfidenceWeights, LayoutConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Certainty signals reported by the model, each in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceFactors {
    pub label_match: f64,
    pub position_certainty: f64,
    pub type_certainty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_boundary: Option<bool>,
}

impl ConfidenceFactors {
    pub fn new(label_match: f64, position_certainty: f64, type_certainty: f64) -> Self {
        Self {
            label_match,
            position_certainty,
            type_certainty,
            visual_boundary: None,
        }
    }

    pub fn with_visual_boundary(mut self, visual_boundary: bool) -> Self {
        self.visual_boundary = Some(visual_boundary);
        self
    }
}

/// Discrete confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    High,
    Medium,
    Low,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::High => write!(f, "high"),
            Quality::Medium => write!(f, "medium"),
            Quality::Low => write!(f, "low"),
        }
    }
}

/// The raw factors, echoed back unweighted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    pub label_match: f64,
    pub position_certainty: f64,
    pub type_certainty: f64,
}

/// Outcome of scoring one field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Weighted score in `[0, 1]`
    pub overall: f64,
    pub breakdown: ConfidenceBreakdown,
    pub quality: Quality,
}

/// Combines confidence factors into a [`ConfidenceResult`]
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ConfidenceWeights,
    visual_boundary_boost: f64,
    high_cutoff: f64,
    medium_cutoff: f64,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl ConfidenceScorer {
    /// Scorer with the default weights and cutoffs
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            weights: config.confidence_weights,
            visual_boundary_boost: config.visual_boundary_boost,
            high_cutoff: config.high_quality_cutoff,
            medium_cutoff: config.medium_quality_cutoff,
        }
    }

    /// Score one set of factors. Pure and deterministic.
    pub fn score(&self, factors: &ConfidenceFactors) -> ConfidenceResult {
        let mut overall = factors.label_match * self.weights.label_match
            + factors.position_certainty * self.weights.position_certainty
            + factors.type_certainty * self.weights.type_certainty;

        if factors.visual_boundary == Some(true) {
            overall += self.visual_boundary_boost;
        }

        let overall = if overall.is_finite() {
            overall.clamp(0.0, 1.0)
        } else {
            0.0
        };

        ConfidenceResult {
            overall,
            breakdown: ConfidenceBreakdown {
                label_match: factors.label_match,
                position_certainty: factors.position_certainty,
                type_certainty: factors.type_certainty,
            },
            quality: self.quality_for(overall),
        }
    }

    /// Bucket an overall score. Boundary values belong to the higher tier.
    pub fn quality_for(&self, overall: f64) -> Quality {
        if overall >= self.high_cutoff {
            Quality::High
        } else if overall >= self.medium_cutoff {
            Quality::Medium
        } else {
            Quality::Low
        }
    }
}
