//! Converted field records handed to the editor

use crate::confidence::ConfidenceResult;
use crate::detection::{Direction, FieldKind};
use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// A detection after box conversion, scoring and optional RTL correction
///
/// Serializes flat: the kind's `type` tag and attributes, the box's
/// `x`/`y`/`width`/`height`, and the `_calibrated`/`_originalX` audit keys
/// all sit at the top level of the JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibratedField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub page_number: u32,
    #[serde(flatten)]
    pub bounds: BoundingBox,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceResult>,
    #[serde(rename = "_calibrated", default)]
    pub calibrated: bool,
    #[serde(
        rename = "_originalX",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_x: Option<f64>,
}

impl CalibratedField {
    pub fn new(name: impl Into<String>, kind: FieldKind, page_number: u32, bounds: BoundingBox) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            page_number,
            bounds,
            required: false,
            direction: Direction::Ltr,
            confidence: None,
            calibrated: false,
            original_x: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == Direction::Rtl
    }
}

/// Guidance text with converted geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedGuidanceText {
    pub text: String,
    pub page_number: u32,
    #[serde(flatten)]
    pub bounds: BoundingBox,
}

/// Anchor point with converted geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedAnchor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub page_number: u32,
    #[serde(flatten)]
    pub bounds: BoundingBox,
}
