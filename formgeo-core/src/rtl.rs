//! Right-to-left calibration
//!
//! On RTL forms the model tends to box the label, or a region straddling the
//! label and the blank, instead of the blank itself. Because the label sits
//! to the right of its input in RTL layouts, the correction shifts affected
//! boxes to the left by a fraction of their width.
//!
//! Only the horizontal axis is touched. Every corrected field records its
//! pre-correction `x` in `_originalX` and is flagged `_calibrated`.

use crate::config::LayoutConfig;
use crate::detection::{Direction, FieldKind, FormMetadata};
use crate::field::{CalibratedField, PlacedAnchor};
use crate::geometry::{round2, BoundingBox, PageInfo};

/// Decide whether a form reads right-to-left.
///
/// An explicit `formMetadata.direction` wins. Otherwise the form is RTL when
/// strictly more fields declare `rtl` than `ltr`.
pub fn classify_form_direction(
    fields: &[CalibratedField],
    metadata: Option<&FormMetadata>,
) -> Direction {
    if let Some(direction) = metadata.and_then(|m| m.direction) {
        return direction;
    }

    let rtl = fields.iter().filter(|f| f.is_rtl()).count();
    let ltr = fields.len() - rtl;
    if rtl > ltr {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

/// Horizontal span a corrected field may land in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    pub left: f64,
    pub right: f64,
}

impl ReferenceFrame {
    /// The whole page width
    pub fn page(page_width: f64) -> Self {
        Self {
            left: 0.0,
            right: page_width,
        }
    }

    /// Frame spanned by the anchors of one page.
    ///
    /// Anchors only narrow the frame when at least two of them span half the
    /// page or more; a lone logo says nothing about the margins.
    pub fn from_anchors<'a>(page_width: f64, anchors: impl IntoIterator<Item = &'a BoundingBox>) -> Self {
        let mut left = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut count = 0;
        for anchor in anchors {
            left = left.min(anchor.x);
            right = right.max(anchor.right());
            count += 1;
        }

        if count < 2 || right - left < page_width / 2.0 {
            return Self::page(page_width);
        }

        Self {
            left: left.max(0.0),
            right: right.min(page_width),
        }
    }
}

/// Shifts RTL text-like fields from the label position to the input position
#[derive(Debug, Clone)]
pub struct RtlCalibrationService {
    shift_ratio: f64,
    max_shift: f64,
}

impl Default for RtlCalibrationService {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl RtlCalibrationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            shift_ratio: config.rtl_label_shift_ratio,
            max_shift: config.rtl_max_shift,
        }
    }

    /// Correct a single field.
    ///
    /// `anchors` are the converted anchor boxes on the field's page. The
    /// field is returned unmodified when it is not RTL, is a checkbox or
    /// radio, was already calibrated, or its page width is unknown.
    pub fn apply_rtl_correction(
        &self,
        mut field: CalibratedField,
        page_width: Option<f64>,
        anchors: &[BoundingBox],
    ) -> CalibratedField {
        if !field.is_rtl() || field.calibrated || !is_shiftable(&field.kind) {
            return field;
        }

        let Some(page_width) = page_width.filter(|w| w.is_finite() && *w > 0.0) else {
            tracing::debug!(
                field = %field.name,
                page = field.page_number,
                "No page width known, skipping RTL correction"
            );
            return field;
        };

        let frame = ReferenceFrame::from_anchors(page_width, anchors);
        let original_x = field.bounds.x;
        let width = field.bounds.width.min(page_width);
        let shift = (width * self.shift_ratio).min(self.max_shift);

        let lower = frame.left.min(original_x).max(0.0);
        let upper = (page_width - width).max(0.0);
        let x = (original_x - shift).max(lower).min(upper);

        field.bounds = BoundingBox::new(round2(x), field.bounds.y, round2(width), field.bounds.height);
        field.original_x = Some(original_x);
        field.calibrated = true;
        field
    }

    /// Correct every field of a form already classified as RTL.
    ///
    /// Page widths are looked up among the resolved pages only; a field on an
    /// unknown page is left as is.
    pub fn calibrate_all(
        &self,
        fields: Vec<CalibratedField>,
        pages: &[PageInfo],
        anchors: &[PlacedAnchor],
    ) -> Vec<CalibratedField> {
        fields
            .into_iter()
            .map(|field| {
                let page_width = pages
                    .iter()
                    .find(|p| p.page_number == field.page_number)
                    .map(|p| p.width);
                let page_anchors: Vec<BoundingBox> = anchors
                    .iter()
                    .filter(|a| a.page_number == field.page_number)
                    .map(|a| a.bounds)
                    .collect();
                self.apply_rtl_correction(field, page_width, &page_anchors)
            })
            .collect()
    }
}

fn is_shiftable(kind: &FieldKind) -> bool {
    matches!(
        kind,
        FieldKind::Text { .. } | FieldKind::Dropdown { .. } | FieldKind::Signature
    )
}
