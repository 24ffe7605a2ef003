//! Radio group detection
//!
//! Runs last, over the complete list of converted fields, in two passes:
//!
//! 1. **Merge pre-tagged radios.** Radio fields sharing a `radioGroup` are
//!    collapsed into one radio field whose options are the members' options
//!    (or labels) in reading order.
//! 2. **Convert checkbox clusters.** Checkboxes that sit close together on
//!    one row or column form connected components. A component of plausible
//!    size becomes one synthesized radio field; anything else is left alone.
//!
//! Reading order is top to bottom, then right to left within a row. Rows are
//! formed by bucketing on `y` with the alignment threshold, which keeps the
//! ordering total.
//!
//! The detector never fails. A field it cannot group is emitted unchanged.

use crate::config::LayoutConfig;
use crate::detection::{FieldKind, Orientation, RadioAttributes};
use crate::field::CalibratedField;
use crate::geometry::{round2, Point};
use std::collections::{HashMap, HashSet, VecDeque};
use unicode_normalization::UnicodeNormalization;

/// Options used when a merged group yields nothing collectible
pub const FALLBACK_OPTIONS: [&str; 2] = ["אפשרות 1", "אפשרות 2"];

/// Label prefix given to options whose checkbox has no usable label
pub const OPTION_PLACEHOLDER: &str = "אפשרות";

const PLACEHOLDER_PREFIXES: [&str; 2] = ["field_", "checkbox_"];

/// Counts of the groups produced by one detection run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioReport {
    /// Pre-tagged groups with two or more members that were merged
    pub merged: usize,
    /// Checkbox clusters converted into radio fields
    pub synthesized: usize,
}

/// Groups radio and checkbox detections into radio fields
#[derive(Debug, Clone)]
pub struct RadioGroupDetector {
    proximity_threshold: f64,
    alignment_threshold: f64,
    min_group_size: usize,
    max_group_size: usize,
}

impl Default for RadioGroupDetector {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl RadioGroupDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            proximity_threshold: config.proximity_threshold,
            alignment_threshold: config.alignment_threshold,
            min_group_size: config.min_group_size,
            max_group_size: config.max_group_size,
        }
    }

    /// Run both passes and return the resulting field list
    pub fn detect(&self, fields: &[CalibratedField]) -> Vec<CalibratedField> {
        self.detect_with_report(fields).0
    }

    /// Run both passes, also reporting how many groups were produced
    pub fn detect_with_report(&self, fields: &[CalibratedField]) -> (Vec<CalibratedField>, RadioReport) {
        let mut names = GroupNames::new(fields);

        let (merged_fields, merged) = self.merge_tagged_radios(fields.to_vec());
        let (result, synthesized) = self.convert_checkbox_clusters(merged_fields, &mut names);

        tracing::debug!(
            merged,
            synthesized,
            fields_in = fields.len(),
            fields_out = result.len(),
            "Radio group detection finished"
        );

        (result, RadioReport { merged, synthesized })
    }

    fn merge_tagged_radios(&self, fields: Vec<CalibratedField>) -> (Vec<CalibratedField>, usize) {
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, field) in fields.iter().enumerate() {
            if let Some(group) = field.kind.radio().and_then(|r| r.radio_group.as_ref()) {
                groups.entry(group.clone()).or_default().push(idx);
            }
        }

        let mut replacements: HashMap<usize, CalibratedField> = HashMap::new();
        let mut consumed: HashSet<usize> = HashSet::new();
        for (group, members) in &groups {
            if members.len() < 2 {
                continue;
            }
            let ordered = reading_order(&fields, members.clone(), self.alignment_threshold);
            let merged = self.merge_group(&fields, &ordered, group);
            replacements.insert(members[0], merged);
            consumed.extend(members.iter().copied());
        }

        let merged_count = replacements.len();
        (splice(fields, replacements, &consumed), merged_count)
    }

    fn merge_group(&self, fields: &[CalibratedField], ordered: &[usize], group: &str) -> CalibratedField {
        let mut options = Vec::new();
        let mut first_label_used = false;

        for (position, &idx) in ordered.iter().enumerate() {
            let member = &fields[idx];
            let own_options = member.kind.options();
            if own_options.iter().any(|o| !o.trim().is_empty()) {
                for option in own_options {
                    push_unique(&mut options, option);
                }
            } else if let Some(label) = member.label.as_deref() {
                if push_unique(&mut options, label) && position == 0 {
                    first_label_used = true;
                }
            }
        }

        if options.is_empty() {
            options = FALLBACK_OPTIONS.iter().map(|o| o.to_string()).collect();
        }

        let first = &fields[ordered[0]];
        let label = if first_label_used {
            Some(group_label(&options))
        } else {
            first.label.clone()
        };

        let mut merged = first.clone();
        merged.label = label;
        merged.required = ordered.iter().any(|&idx| fields[idx].required);
        merged.kind = FieldKind::Radio(self.radio_attributes(fields, ordered, options, group.to_string()));
        merged
    }

    fn convert_checkbox_clusters(
        &self,
        fields: Vec<CalibratedField>,
        names: &mut GroupNames,
    ) -> (Vec<CalibratedField>, usize) {
        let mut replacements: HashMap<usize, CalibratedField> = HashMap::new();
        let mut consumed: HashSet<usize> = HashSet::new();

        for cluster in self.checkbox_clusters(&fields) {
            if cluster.len() < self.min_group_size || cluster.len() > self.max_group_size {
                if cluster.len() > self.max_group_size {
                    tracing::debug!(
                        size = cluster.len(),
                        "Checkbox cluster too large for a radio group, keeping checkboxes"
                    );
                }
                continue;
            }
            let ordered = reading_order(&fields, cluster.clone(), self.alignment_threshold);
            let synthesized = self.synthesize_group(&fields, &ordered, names.next());
            replacements.insert(cluster[0], synthesized);
            consumed.extend(cluster);
        }

        let synthesized_count = replacements.len();
        (splice(fields, replacements, &consumed), synthesized_count)
    }

    fn synthesize_group(&self, fields: &[CalibratedField], ordered: &[usize], group: String) -> CalibratedField {
        let options: Vec<String> = ordered
            .iter()
            .enumerate()
            .map(|(position, &idx)| option_for_checkbox(&fields[idx], position + 1))
            .collect();

        let first = &fields[ordered[0]];
        let mut synthesized = first.clone();
        synthesized.name = group.clone();
        synthesized.label = Some(group_label(&options));
        synthesized.required = ordered.iter().any(|&idx| fields[idx].required);
        synthesized.kind = FieldKind::Radio(self.radio_attributes(fields, ordered, options, group));
        synthesized
    }

    fn radio_attributes(
        &self,
        fields: &[CalibratedField],
        ordered: &[usize],
        options: Vec<String>,
        group: String,
    ) -> RadioAttributes {
        let centers: Vec<Point> = ordered.iter().map(|&idx| fields[idx].bounds.center()).collect();
        let orientation = orientation_of(&centers);
        RadioAttributes {
            options,
            radio_group: Some(group),
            orientation: Some(orientation),
            spacing: Some(spacing_of(&centers, orientation)),
        }
    }

    /// Connected components of the checkbox neighbor relation, each sorted by index
    fn checkbox_clusters(&self, fields: &[CalibratedField]) -> Vec<Vec<usize>> {
        let candidates: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind.is_checkbox())
            .map(|(idx, _)| idx)
            .collect();

        let mut visited = vec![false; candidates.len()];
        let mut clusters = Vec::new();

        for start in 0..candidates.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;

            let mut queue = VecDeque::from([start]);
            let mut component = Vec::new();
            while let Some(current) = queue.pop_front() {
                component.push(candidates[current]);
                for next in 0..candidates.len() {
                    if !visited[next]
                        && self.are_neighbors(&fields[candidates[current]], &fields[candidates[next]])
                    {
                        visited[next] = true;
                        queue.push_back(next);
                    }
                }
            }

            component.sort_unstable();
            clusters.push(component);
        }

        clusters
    }

    fn are_neighbors(&self, a: &CalibratedField, b: &CalibratedField) -> bool {
        if a.page_number != b.page_number {
            return false;
        }
        let close = a.bounds.center().distance_to(&b.bounds.center()) <= self.proximity_threshold;
        let stacked = (a.bounds.x - b.bounds.x).abs() < self.alignment_threshold;
        let in_row = (a.bounds.y - b.bounds.y).abs() < self.alignment_threshold;
        close && (stacked || in_row)
    }
}

/// Sort field indices top to bottom, then right to left within a row.
///
/// Pages come first. A row starts at its topmost field and takes every
/// following field whose `y` lies within `alignment` of it.
pub fn reading_order(fields: &[CalibratedField], mut indices: Vec<usize>, alignment: f64) -> Vec<usize> {
    indices.sort_by(|&a, &b| {
        let (fa, fb) = (&fields[a], &fields[b]);
        fa.page_number
            .cmp(&fb.page_number)
            .then(fb.bounds.y.total_cmp(&fa.bounds.y))
    });

    let mut ordered = Vec::with_capacity(indices.len());
    let mut row: Vec<usize> = Vec::new();
    let mut row_start: Option<(u32, f64)> = None;

    for idx in indices {
        let field = &fields[idx];
        let same_row = matches!(
            row_start,
            Some((page, y)) if page == field.page_number && (y - field.bounds.y).abs() < alignment
        );
        if !same_row {
            flush_row(fields, &mut row, &mut ordered);
            row_start = Some((field.page_number, field.bounds.y));
        }
        row.push(idx);
    }
    flush_row(fields, &mut row, &mut ordered);

    ordered
}

fn flush_row(fields: &[CalibratedField], row: &mut Vec<usize>, ordered: &mut Vec<usize>) {
    row.sort_by(|&a, &b| fields[b].bounds.x.total_cmp(&fields[a].bounds.x));
    ordered.append(row);
}

/// Rebuild the field list: replacements land at their index, consumed indices drop out.
fn splice(
    fields: Vec<CalibratedField>,
    mut replacements: HashMap<usize, CalibratedField>,
    consumed: &HashSet<usize>,
) -> Vec<CalibratedField> {
    fields
        .into_iter()
        .enumerate()
        .filter_map(|(idx, field)| match replacements.remove(&idx) {
            Some(replacement) => Some(replacement),
            None if consumed.contains(&idx) => None,
            None => Some(field),
        })
        .collect()
}

fn orientation_of(centers: &[Point]) -> Orientation {
    let x_span = span(centers.iter().map(|c| c.x));
    let y_span = span(centers.iter().map(|c| c.y));
    if x_span > y_span {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi >= lo {
        hi - lo
    } else {
        0.0
    }
}

/// Mean gap between consecutive centers along the group's axis
fn spacing_of(centers: &[Point], orientation: Orientation) -> f64 {
    if centers.len() < 2 {
        return 0.0;
    }
    let total: f64 = centers
        .windows(2)
        .map(|pair| match orientation {
            Orientation::Horizontal => (pair[1].x - pair[0].x).abs(),
            Orientation::Vertical => (pair[1].y - pair[0].y).abs(),
        })
        .sum();
    round2(total / (centers.len() - 1) as f64)
}

fn normalize(text: &str) -> String {
    text.trim().nfc().collect()
}

/// Push the normalized text unless it is empty or already present
fn push_unique(options: &mut Vec<String>, text: &str) -> bool {
    let normalized = normalize(text);
    if normalized.is_empty() || options.contains(&normalized) {
        return false;
    }
    options.push(normalized);
    true
}

fn is_placeholder(text: &str) -> bool {
    PLACEHOLDER_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Option text for one cluster member: its label, else its name, else `אפשרות <position>`.
/// Placeholder names (`field_*`, `checkbox_*`) are skipped like placeholder labels, and the
/// final fallback carries the position so options in one group stay distinct.
fn option_for_checkbox(field: &CalibratedField, position: usize) -> String {
    let usable = |text: &str| {
        let normalized = normalize(text);
        (!normalized.is_empty() && !is_placeholder(&normalized)).then_some(normalized)
    };

    field
        .label
        .as_deref()
        .and_then(usable)
        .or_else(|| usable(&field.name))
        .unwrap_or_else(|| format!("{OPTION_PLACEHOLDER} {position}"))
}

/// Label for a group: the prefix shared by all options, else the options joined
pub fn group_label(options: &[String]) -> String {
    common_prefix(options).unwrap_or_else(|| options.join(" / "))
}

/// Longest prefix of at least two characters shared by every label.
///
/// Trailing whitespace, colons and dashes are stripped from the result.
pub fn common_prefix(labels: &[String]) -> Option<String> {
    let (first, rest) = labels.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let boundaries: Vec<usize> = first
        .char_indices()
        .map(|(idx, _)| idx)
        .skip(2)
        .chain(std::iter::once(first.len()))
        .collect();

    let prefix = boundaries
        .into_iter()
        .rev()
        .map(|end| &first[..end])
        .find(|prefix| rest.iter().all(|label| label.starts_with(prefix)))?;

    let trimmed = prefix.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '־' | '–'));
    (trimmed.chars().count() >= 2).then(|| trimmed.to_string())
}

/// Allocates `radio_group_<n>` names not already used by any field
struct GroupNames {
    taken: HashSet<String>,
    counter: usize,
}

impl GroupNames {
    fn new(fields: &[CalibratedField]) -> Self {
        let mut taken: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();
        taken.extend(
            fields
                .iter()
                .filter_map(|f| f.kind.radio().and_then(|r| r.radio_group.clone())),
        );
        Self { taken, counter: 0 }
    }

    fn next(&mut self) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("radio_group_{}", self.counter);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
