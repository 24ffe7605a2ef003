//! End-to-end field geometry pipeline
//!
//! ```text
//! PDF bytes ──► PageGeometryResolver ──► PageInfo[]
//!                                            │
//! AI JSON ──► AiResponse ──► box conversion ─┴─► confidence scoring
//!                                                   │
//!                     RTL calibration (RTL forms) ◄─┘
//!                                │
//!                     radio group detection ──► ExtractionResult
//! ```
//!
//! # Example
//!
//! ```rust
//! use formgeo::pipeline::FieldGeometryPipeline;
//! use formgeo::geometry::PageInfo;
//! use formgeo::detection::AiResponse;
//!
//! let response = AiResponse::from_json(r#"{
//!     "fields": [
//!         { "type": "text", "name": "full_name", "polygon": [1, 1, 2, 1, 2, 2, 1, 2] }
//!     ]
//! }"#).unwrap();
//!
//! let result = FieldGeometryPipeline::new().run_with_pages(vec![PageInfo::a4(1)], response);
//! assert_eq!(result.fields[0].bounds.y, 698.0);
//! assert_eq!(result.stats.total_fields, 1);
//! ```

use crate::confidence::ConfidenceScorer;
use crate::config::LayoutConfig;
use crate::conversion::convert;
use crate::detection::{AiResponse, Direction, FormMetadata, RawFieldDetection};
use crate::error::Result;
use crate::field::{CalibratedField, PlacedAnchor, PlacedGuidanceText};
use crate::geometry::PageInfo;
use crate::page_geometry::{LopdfPageSource, PageGeometryResolver, PageSource};
use crate::radio::RadioGroupDetector;
use crate::rtl::{classify_form_direction, RtlCalibrationService};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Aggregate counts for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    pub total_fields: usize,
    /// Field count keyed by 1-based page number
    pub fields_per_page: BTreeMap<u32, usize>,
    pub page_dimensions: Vec<PageInfo>,
    pub radio_groups_merged: usize,
    pub radio_groups_synthesized: usize,
    pub rtl_corrected: usize,
}

impl ExtractionStats {
    fn collect(fields: &[CalibratedField], pages: &[PageInfo]) -> Self {
        let mut fields_per_page = BTreeMap::new();
        for field in fields {
            *fields_per_page.entry(field.page_number).or_insert(0) += 1;
        }

        Self {
            total_fields: fields.len(),
            fields_per_page,
            page_dimensions: pages.to_vec(),
            rtl_corrected: fields.iter().filter(|f| f.calibrated).count(),
            ..Self::default()
        }
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub fields: Vec<CalibratedField>,
    pub guidance_texts: Vec<PlacedGuidanceText>,
    pub anchor_points: Vec<PlacedAnchor>,
    /// Form-level reading direction used for calibration
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_metadata: Option<FormMetadata>,
    pub stats: ExtractionStats,
}

/// Composes page resolution, conversion, scoring, RTL calibration and radio detection
#[derive(Debug, Clone)]
pub struct FieldGeometryPipeline<S: PageSource = LopdfPageSource> {
    config: LayoutConfig,
    resolver: PageGeometryResolver<S>,
    scorer: ConfidenceScorer,
    rtl: RtlCalibrationService,
    radio: RadioGroupDetector,
}

impl Default for FieldGeometryPipeline<LopdfPageSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldGeometryPipeline<LopdfPageSource> {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self::with_page_source(LopdfPageSource, config)
    }
}

impl<S: PageSource> FieldGeometryPipeline<S> {
    /// Build a pipeline reading pages through a custom [`PageSource`]
    pub fn with_page_source(source: S, config: LayoutConfig) -> Self {
        Self {
            resolver: PageGeometryResolver::with_source(source),
            scorer: ConfidenceScorer::from_config(&config),
            rtl: RtlCalibrationService::from_config(&config),
            radio: RadioGroupDetector::from_config(&config),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Run on raw PDF bytes and a raw AI response body.
    ///
    /// Fails only when the response envelope itself is unusable.
    pub fn run(&self, pdf_bytes: &[u8], response_json: &str) -> Result<ExtractionResult> {
        let response = AiResponse::from_json(response_json)?;
        Ok(self.run_response(pdf_bytes, response))
    }

    /// Run on raw PDF bytes and an already parsed response
    pub fn run_response(&self, pdf_bytes: &[u8], response: AiResponse) -> ExtractionResult {
        let pages = self.resolver.resolve(pdf_bytes);
        self.run_with_pages(pages, response)
    }

    /// Run against already resolved page geometry
    pub fn run_with_pages(&self, pages: Vec<PageInfo>, response: AiResponse) -> ExtractionResult {
        let AiResponse {
            fields: detections,
            guidance_texts,
            anchor_points,
            form_metadata,
        } = response;

        let mut taken: HashSet<String> = detections
            .iter()
            .filter(|d| !d.name.trim().is_empty())
            .map(|d| d.name.clone())
            .collect();
        let fields: Vec<CalibratedField> = detections
            .into_iter()
            .enumerate()
            .map(|(idx, detection)| self.convert_detection(idx, detection, &pages, &mut taken))
            .collect();

        let guidance_texts: Vec<PlacedGuidanceText> = guidance_texts
            .into_iter()
            .map(|g| PlacedGuidanceText {
                bounds: convert(&g.geometry, g.page_number, &pages),
                text: g.text,
                page_number: g.page_number,
            })
            .collect();

        let anchor_points: Vec<PlacedAnchor> = anchor_points
            .into_iter()
            .map(|a| PlacedAnchor {
                bounds: convert(&a.geometry, a.page_number, &pages),
                kind: a.kind,
                label: a.label,
                page_number: a.page_number,
            })
            .collect();

        tracing::debug!(
            fields = fields.len(),
            guidance_texts = guidance_texts.len(),
            anchor_points = anchor_points.len(),
            "Converted detections to PDF space"
        );

        let direction = classify_form_direction(&fields, form_metadata.as_ref());
        let fields = match direction {
            Direction::Rtl => self.rtl.calibrate_all(fields, &pages, &anchor_points),
            Direction::Ltr => fields,
        };
        tracing::debug!(?direction, "Form direction classified");

        let (fields, report) = self.radio.detect_with_report(&fields);

        let stats = ExtractionStats {
            radio_groups_merged: report.merged,
            radio_groups_synthesized: report.synthesized,
            ..ExtractionStats::collect(&fields, &pages)
        };

        tracing::info!(
            total_fields = stats.total_fields,
            pages = pages.len(),
            rtl_corrected = stats.rtl_corrected,
            "Field geometry extraction complete"
        );

        ExtractionResult {
            fields,
            guidance_texts,
            anchor_points,
            direction,
            form_metadata,
            stats,
        }
    }

    fn convert_detection(
        &self,
        idx: usize,
        detection: RawFieldDetection,
        pages: &[PageInfo],
        taken: &mut HashSet<String>,
    ) -> CalibratedField {
        let name = if detection.name.trim().is_empty() {
            unused_name(idx, taken)
        } else {
            detection.name
        };

        CalibratedField {
            bounds: convert(&detection.geometry, detection.page_number, pages),
            confidence: detection.confidence_factors.map(|f| self.scorer.score(&f)),
            name,
            label: detection.label,
            kind: detection.kind,
            page_number: detection.page_number,
            required: detection.required,
            direction: detection.direction,
            calibrated: false,
            original_x: None,
        }
    }
}

/// `field_<idx+1>`, suffixed until it clashes with no other field name
fn unused_name(idx: usize, taken: &mut HashSet<String>) -> String {
    let base = format!("field_{}", idx + 1);
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !taken.insert(candidate.clone()) {
        suffix += 1;
        candidate = format!("{base}_{suffix}");
    }
    candidate
}
