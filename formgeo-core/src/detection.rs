//! AI response envelope and raw field detections
//!
//! The vision model answers with a JSON object holding a `fields` array and
//! optional `guidanceTexts`, `anchorPoints` and `formMetadata`. Each entry
//! carries its geometry in one of two encodings:
//!
//! - `polygon`: 4 corners in inches, top-left origin, clockwise from the
//!   top-left corner. Accepted as 8 flat numbers, `[[x, y], ...]` pairs or
//!   `[{"x": .., "y": ..}, ...]` points.
//! - `box_2d`: `[yMin, xMin, yMax, xMax]` normalized to 0–1000 per page,
//!   top-left origin. Preferred when both are present.
//!
//! Only a missing `fields` array is a hard error. Individual malformed
//! entries degrade to [`GeometryPayload::Missing`] or are skipped with a
//! warning.

use crate::confidence::ConfidenceFactors;
use crate::error::{FormGeoError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Text and layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Layout axis of a radio group's options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Attributes only meaningful for radio groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioAttributes {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radio_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
}

/// Field type together with the attributes valid for that type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(
            default,
            rename = "fontSize",
            skip_serializing_if = "Option::is_none"
        )]
        font_size: Option<f64>,
    },
    Checkbox,
    Radio(RadioAttributes),
    Dropdown {
        #[serde(default)]
        options: Vec<String>,
    },
    Signature,
}

impl FieldKind {
    /// Plain text field without font hints
    pub fn text() -> Self {
        FieldKind::Text {
            font: None,
            font_size: None,
        }
    }

    /// Wire name of the type
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Radio(_) => "radio",
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Signature => "signature",
        }
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self, FieldKind::Checkbox)
    }

    /// Radio attributes, if this is a radio field
    pub fn radio(&self) -> Option<&RadioAttributes> {
        match self {
            FieldKind::Radio(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Choice options carried by radio and dropdown fields
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Radio(attrs) => &attrs.options,
            FieldKind::Dropdown { options } => options,
            _ => &[],
        }
    }
}

/// Geometry of a detection in the model's native coordinate space
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryPayload {
    /// Flattened corner coordinates in inches, `[x0, y0, x1, y1, ...]`
    Polygon(Vec<f64>),
    /// `[yMin, xMin, yMax, xMax]` on a 0–1000 scale
    NativeBox([f64; 4]),
    /// No usable geometry was supplied
    Missing,
}

impl GeometryPayload {
    /// Decode from the `polygon` / `box_2d` values of one JSON entry.
    pub fn from_values(polygon: Option<&Value>, box_2d: Option<&Value>) -> Self {
        if let Some(native) = box_2d.and_then(parse_native_box) {
            return GeometryPayload::NativeBox(native);
        }
        match polygon {
            Some(value) => match parse_polygon(value) {
                Some(coords) => GeometryPayload::Polygon(coords),
                None => GeometryPayload::Missing,
            },
            None => GeometryPayload::Missing,
        }
    }
}

fn parse_native_box(value: &Value) -> Option<[f64; 4]> {
    let items = value.as_array()?;
    if items.len() != 4 {
        return None;
    }
    let mut native = [0.0; 4];
    for (slot, item) in native.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(native)
}

fn parse_polygon(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    let mut coords = Vec::with_capacity(8);
    for item in items {
        match item {
            Value::Number(n) => coords.push(n.as_f64()?),
            Value::Array(pair) if pair.len() == 2 => {
                coords.push(pair[0].as_f64()?);
                coords.push(pair[1].as_f64()?);
            }
            Value::Object(point) => {
                coords.push(point.get("x")?.as_f64()?);
                coords.push(point.get("y")?.as_f64()?);
            }
            _ => return None,
        }
    }
    Some(coords)
}

/// One form field as detected by the model, before conversion
#[derive(Debug, Clone, PartialEq)]
pub struct RawFieldDetection {
    pub kind: FieldKind,
    pub name: String,
    pub label: Option<String>,
    pub required: bool,
    pub direction: Direction,
    /// 1-based page number
    pub page_number: u32,
    pub geometry: GeometryPayload,
    pub confidence_factors: Option<ConfidenceFactors>,
}

/// Instruction text printed on the form, with its location
#[derive(Debug, Clone, PartialEq)]
pub struct GuidanceText {
    pub text: String,
    pub page_number: u32,
    pub geometry: GeometryPayload,
}

/// Fixed visual landmark used as a spatial reference
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    /// Landmark kind, e.g. `logo`, `header`, `table_corner`
    pub kind: String,
    pub label: Option<String>,
    pub page_number: u32,
    pub geometry: GeometryPayload,
}

/// Form-level facts reported by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormMetadata {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub language: Option<String>,
    /// Case-insensitive; unrecognized values read as absent
    #[serde(
        default,
        deserialize_with = "lenient_direction",
        skip_serializing_if = "Option::is_none"
    )]
    pub direction: Option<Direction>,
    /// Any other keys, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parsed AI response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiResponse {
    pub fields: Vec<RawFieldDetection>,
    pub guidance_texts: Vec<GuidanceText>,
    pub anchor_points: Vec<AnchorPoint>,
    pub form_metadata: Option<FormMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDetection {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    field_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    required: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    direction: Option<String>,
    #[serde(default, alias = "page", deserialize_with = "lenient_page")]
    page_number: Option<u32>,
    #[serde(default)]
    polygon: Option<Value>,
    #[serde(default, rename = "box_2d", alias = "box2d")]
    box_2d: Option<Value>,
    #[serde(default, deserialize_with = "lenient_options")]
    options: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    radio_group: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    orientation: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    spacing: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    font: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    font_size: Option<f64>,
    #[serde(default)]
    confidence_factors: Option<Value>,
}

impl WireDetection {
    fn into_detection(self) -> RawFieldDetection {
        let kind = match self.field_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("checkbox") => FieldKind::Checkbox,
            Some("radio") => FieldKind::Radio(RadioAttributes {
                options: self.options,
                radio_group: self.radio_group.filter(|g| !g.trim().is_empty()),
                orientation: self.orientation.as_deref().and_then(parse_orientation),
                spacing: self.spacing,
            }),
            Some("dropdown") => FieldKind::Dropdown {
                options: self.options,
            },
            Some("signature") => FieldKind::Signature,
            Some("text") | None => FieldKind::Text {
                font: self.font,
                font_size: self.font_size,
            },
            Some(other) => {
                tracing::warn!("Unknown field type `{other}`, treating it as text");
                FieldKind::Text {
                    font: self.font,
                    font_size: self.font_size,
                }
            }
        };

        let confidence_factors = self.confidence_factors.and_then(|value| {
            serde_json::from_value::<ConfidenceFactors>(value)
                .map_err(|err| tracing::warn!("Ignoring malformed confidenceFactors: {err}"))
                .ok()
        });

        RawFieldDetection {
            kind,
            name: self.name.unwrap_or_default(),
            label: self.label.filter(|l| !l.trim().is_empty()),
            required: self.required,
            direction: self
                .direction
                .as_deref()
                .and_then(parse_direction)
                .unwrap_or_default(),
            page_number: self.page_number.unwrap_or(1),
            geometry: GeometryPayload::from_values(self.polygon.as_ref(), self.box_2d.as_ref()),
            confidence_factors,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGuidanceText {
    #[serde(default, alias = "content", deserialize_with = "lenient_string")]
    text: Option<String>,
    #[serde(default, alias = "page", deserialize_with = "lenient_page")]
    page_number: Option<u32>,
    #[serde(default)]
    polygon: Option<Value>,
    #[serde(default, rename = "box_2d", alias = "box2d")]
    box_2d: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAnchorPoint {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    kind: Option<String>,
    #[serde(default, alias = "description", deserialize_with = "lenient_string")]
    label: Option<String>,
    #[serde(default, alias = "page", deserialize_with = "lenient_page")]
    page_number: Option<u32>,
    #[serde(default)]
    polygon: Option<Value>,
    #[serde(default, rename = "box_2d", alias = "box2d")]
    box_2d: Option<Value>,
}

impl AiResponse {
    /// Parse a raw JSON response body
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse an already decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut envelope) = value else {
            return Err(FormGeoError::InvalidResponse(
                "response is not a JSON object".to_string(),
            ));
        };

        let fields = match envelope.remove("fields") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => return Err(FormGeoError::MissingFields),
            Some(_) => {
                return Err(FormGeoError::InvalidResponse(
                    "`fields` is not an array".to_string(),
                ))
            }
        };

        let fields = decode_entries::<WireDetection>(fields, "field")
            .into_iter()
            .map(WireDetection::into_detection)
            .collect();

        let guidance_texts = optional_array(envelope.remove("guidanceTexts"), "guidanceTexts")
            .map(|items| {
                decode_entries::<WireGuidanceText>(items, "guidance text")
                    .into_iter()
                    .map(|g| GuidanceText {
                        geometry: GeometryPayload::from_values(g.polygon.as_ref(), g.box_2d.as_ref()),
                        text: g.text.unwrap_or_default(),
                        page_number: g.page_number.unwrap_or(1),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let anchor_points = optional_array(envelope.remove("anchorPoints"), "anchorPoints")
            .map(|items| {
                decode_entries::<WireAnchorPoint>(items, "anchor point")
                    .into_iter()
                    .map(|a| AnchorPoint {
                        geometry: GeometryPayload::from_values(a.polygon.as_ref(), a.box_2d.as_ref()),
                        kind: a.kind.unwrap_or_else(|| "anchor".to_string()),
                        label: a.label,
                        page_number: a.page_number.unwrap_or(1),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let form_metadata = match envelope.remove("formMetadata") {
            Some(Value::Null) | None => None,
            Some(value) => match serde_json::from_value::<FormMetadata>(value) {
                Ok(metadata) => Some(metadata),
                Err(err) => {
                    tracing::warn!("Ignoring malformed formMetadata: {err}");
                    None
                }
            },
        };

        Ok(AiResponse {
            fields,
            guidance_texts,
            anchor_points,
            form_metadata,
        })
    }
}

fn parse_direction(value: &str) -> Option<Direction> {
    match value.trim().to_ascii_lowercase().as_str() {
        "rtl" => Some(Direction::Rtl),
        "ltr" => Some(Direction::Ltr),
        _ => None,
    }
}

fn parse_orientation(value: &str) -> Option<Orientation> {
    match value.trim().to_ascii_lowercase().as_str() {
        "horizontal" => Some(Orientation::Horizontal),
        "vertical" => Some(Orientation::Vertical),
        _ => None,
    }
}

// Optional attributes of a model answer are read from whatever JSON shows up.
// A `null` or mistyped attribute reads as absent instead of rejecting the entry.

fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_direction<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<Direction>, D::Error> {
    Ok(lenient_string(deserializer)?.as_deref().and_then(parse_direction))
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// 1-based page number: rounded, clamped to at least 1
fn lenient_page<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    Ok(lenient_number(deserializer)?.map(|n| n.round().clamp(1.0, u32::MAX as f64) as u32))
}

fn lenient_options<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn optional_array(value: Option<Value>, key: &str) -> Option<Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Some(items),
        Some(Value::Null) | None => None,
        Some(_) => {
            tracing::warn!("Ignoring `{key}`: not an array");
            None
        }
    }
}

fn decode_entries<T: for<'de> Deserialize<'de>>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value::<T>(item) {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Skipping malformed {what} #{idx}: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_is_hard_error() {
        let err = AiResponse::from_value(json!({ "guidanceTexts": [] })).unwrap_err();
        assert!(matches!(err, FormGeoError::MissingFields));

        let err = AiResponse::from_value(json!({ "fields": null })).unwrap_err();
        assert!(matches!(err, FormGeoError::MissingFields));
    }

    #[test]
    fn test_non_object_envelope_is_rejected() {
        let err = AiResponse::from_value(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, FormGeoError::InvalidResponse(_)));

        let err = AiResponse::from_value(json!({ "fields": "nope" })).unwrap_err();
        assert!(matches!(err, FormGeoError::InvalidResponse(_)));
    }

    #[test]
    fn test_empty_fields_is_valid() {
        let response = AiResponse::from_value(json!({ "fields": [] })).unwrap();
        assert!(response.fields.is_empty());
        assert!(response.form_metadata.is_none());
    }

    #[test]
    fn test_radio_attributes_only_on_radio_variant() {
        let response = AiResponse::from_value(json!({
            "fields": [
                { "type": "radio", "name": "g1", "options": ["ז"], "radioGroup": "gender",
                  "box_2d": [100, 100, 120, 120] },
                { "type": "text", "name": "t1", "radioGroup": "ignored", "fontSize": 11,
                  "box_2d": [100, 100, 120, 300] }
            ]
        }))
        .unwrap();

        let radio = response.fields[0].kind.radio().unwrap();
        assert_eq!(radio.options, vec!["ז".to_string()]);
        assert_eq!(radio.radio_group.as_deref(), Some("gender"));

        assert_eq!(
            response.fields[1].kind,
            FieldKind::Text {
                font: None,
                font_size: Some(11.0)
            }
        );
    }

    #[test]
    fn test_polygon_encodings() {
        let flat = json!([1, 1, 2, 1, 2, 2, 1, 2]);
        let pairs = json!([[1, 1], [2, 1], [2, 2], [1, 2]]);
        let points = json!([{"x": 1, "y": 1}, {"x": 2, "y": 1}, {"x": 2, "y": 2}, {"x": 1, "y": 2}]);

        let expected = GeometryPayload::Polygon(vec![1.0, 1.0, 2.0, 1.0, 2.0, 2.0, 1.0, 2.0]);
        assert_eq!(GeometryPayload::from_values(Some(&flat), None), expected);
        assert_eq!(GeometryPayload::from_values(Some(&pairs), None), expected);
        assert_eq!(GeometryPayload::from_values(Some(&points), None), expected);
    }

    #[test]
    fn test_native_box_preferred_over_polygon() {
        let polygon = json!([1, 1, 2, 1, 2, 2, 1, 2]);
        let native = json!([10, 20, 30, 40]);
        assert_eq!(
            GeometryPayload::from_values(Some(&polygon), Some(&native)),
            GeometryPayload::NativeBox([10.0, 20.0, 30.0, 40.0])
        );
    }

    #[test]
    fn test_non_numeric_geometry_is_missing() {
        let polygon = json!([1, "a", 2, 1, 2, 2, 1, 2]);
        assert_eq!(
            GeometryPayload::from_values(Some(&polygon), None),
            GeometryPayload::Missing
        );

        let short_native = json!([1, 2, 3]);
        assert_eq!(
            GeometryPayload::from_values(None, Some(&short_native)),
            GeometryPayload::Missing
        );
    }

    #[test]
    fn test_defaults_for_sparse_entries() {
        let response = AiResponse::from_value(json!({ "fields": [ { "label": "  " } ] })).unwrap();
        let field = &response.fields[0];
        assert_eq!(field.kind, FieldKind::text());
        assert_eq!(field.page_number, 1);
        assert_eq!(field.direction, Direction::Ltr);
        assert_eq!(field.label, None);
        assert_eq!(field.geometry, GeometryPayload::Missing);
    }

    #[test]
    fn test_direction_and_orientation_are_case_insensitive() {
        let response = AiResponse::from_value(json!({
            "fields": [ { "type": "Radio", "direction": "RTL", "orientation": "Horizontal" } ]
        }))
        .unwrap();
        let field = &response.fields[0];
        assert_eq!(field.direction, Direction::Rtl);
        assert_eq!(
            field.kind.radio().unwrap().orientation,
            Some(Orientation::Horizontal)
        );
    }

    #[test]
    fn test_malformed_confidence_factors_are_dropped() {
        let response = AiResponse::from_value(json!({
            "fields": [ { "type": "text", "confidenceFactors": { "labelMatch": "high" } } ]
        }))
        .unwrap();
        assert_eq!(response.fields.len(), 1);
        assert!(response.fields[0].confidence_factors.is_none());
    }

    #[test]
    fn test_malformed_entry_is_skipped() {
        let response = AiResponse::from_value(json!({
            "fields": [ 42, { "type": "checkbox", "name": "ok" } ]
        }))
        .unwrap();
        assert_eq!(response.fields.len(), 1);
        assert_eq!(response.fields[0].name, "ok");
    }

    #[test]
    fn test_guidance_anchors_and_metadata() {
        let response = AiResponse::from_value(json!({
            "fields": [],
            "guidanceTexts": [ { "text": "מלא בכתב יד", "page": 2, "box_2d": [0, 0, 10, 10] } ],
            "anchorPoints": [ { "type": "logo", "box_2d": [0, 900, 50, 990] } ],
            "formMetadata": { "direction": "rtl", "language": "he", "formId": "101" }
        }))
        .unwrap();

        assert_eq!(response.guidance_texts[0].page_number, 2);
        assert_eq!(response.anchor_points[0].kind, "logo");
        let metadata = response.form_metadata.unwrap();
        assert_eq!(metadata.direction, Some(Direction::Rtl));
        assert_eq!(metadata.extra.get("formId"), Some(&json!("101")));
    }

    #[test]
    fn test_null_and_mistyped_attributes_keep_the_field() {
        let response = AiResponse::from_value(json!({
            "fields": [
                { "type": "text", "name": "a", "options": null },
                { "type": "text", "name": "b", "required": null },
                { "type": "text", "name": "c", "pageNumber": 2.0 },
                { "type": "text", "name": "d" },
                { "type": "text", "name": "e", "pageNumber": -1, "label": null },
                { "type": "dropdown", "name": "f", "options": ["א", null, 3], "page": "3" }
            ]
        }))
        .unwrap();

        let names: Vec<&str> = response.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e", "f"]);
        assert!(!response.fields[1].required);
        assert_eq!(response.fields[2].page_number, 2);
        assert_eq!(response.fields[4].page_number, 1);
        assert_eq!(response.fields[4].label, None);
        assert_eq!(
            response.fields[5].kind,
            FieldKind::Dropdown {
                options: vec!["א".to_string(), "3".to_string()]
            }
        );
        assert_eq!(response.fields[5].page_number, 3);
    }

    #[test]
    fn test_guidance_and_anchor_tolerate_nulls() {
        let response = AiResponse::from_value(json!({
            "fields": [],
            "guidanceTexts": [ { "text": null, "pageNumber": 1.6 } ],
            "anchorPoints": [ { "type": null, "page": null } ]
        }))
        .unwrap();

        assert_eq!(response.guidance_texts[0].text, "");
        assert_eq!(response.guidance_texts[0].page_number, 2);
        assert_eq!(response.anchor_points[0].kind, "anchor");
        assert_eq!(response.anchor_points[0].page_number, 1);
    }

    #[test]
    fn test_metadata_direction_is_case_insensitive() {
        let response = AiResponse::from_value(json!({
            "fields": [],
            "formMetadata": { "direction": "RTL", "title": "טופס 101" }
        }))
        .unwrap();
        let metadata = response.form_metadata.unwrap();
        assert_eq!(metadata.direction, Some(Direction::Rtl));
        assert_eq!(metadata.title.as_deref(), Some("טופס 101"));

        let response = AiResponse::from_value(json!({
            "fields": [],
            "formMetadata": { "direction": "sideways", "language": "he" }
        }))
        .unwrap();
        let metadata = response.form_metadata.unwrap();
        assert_eq!(metadata.direction, None);
        assert_eq!(metadata.language.as_deref(), Some("he"));

        let value = serde_json::to_value(FormMetadata {
            direction: Some(Direction::Rtl),
            ..FormMetadata::default()
        })
        .unwrap();
        assert_eq!(value["direction"], "rtl");
    }

    #[test]
    fn test_field_kind_serializes_with_type_tag() {
        let kind = FieldKind::Radio(RadioAttributes {
            options: vec!["a".to_string()],
            radio_group: Some("g".to_string()),
            orientation: Some(Orientation::Vertical),
            spacing: None,
        });
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["type"], "radio");
        assert_eq!(value["radioGroup"], "g");
        assert_eq!(value["orientation"], "vertical");
        assert!(value.get("spacing").is_none());
    }
}
