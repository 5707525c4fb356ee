//! Field inference over a form's viewable page.
//!
//! Detection is an ordered list of independent strategies, each producing a
//! partial descriptor list; layers merge left-to-right with first-wins per
//! field name. The raw-markup scan only runs when the structural pass comes
//! back suspiciously sparse.

use crate::dom::{self, DomNode};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Parameter names follow a fixed literal prefix plus digits.
pub const FIELD_PREFIX: &str = "entry.";
/// Names with this suffix are decoys and never submitted.
pub const SENTINEL_SUFFIX: &str = "_sentinel";
/// Below this many structurally-detected fields, the raw-scan fallback runs.
pub const SPARSE_FIELD_THRESHOLD: usize = 2;

const FIELD_NAME_PATTERN: &str = r"entry\.\d+(_sentinel)?";

/// What one field accepts. Choice options and preset values are carried in
/// the variant, so a descriptor can never mix them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    SingleChoice { options: Vec<String> },
    MultiChoice { options: Vec<String> },
    Fixed { preset: Option<String> },
}

/// One inferred form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Submission parameter name, unique within one inference result.
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Best-effort question text, used only to bias synthesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// Everything a detector may look at.
pub struct PageView<'a> {
    pub dom: &'a DomNode,
    pub raw_html: &'a str,
}

/// One independent detection strategy.
pub trait FieldDetector {
    fn name(&self) -> &'static str;
    /// Fallback-only detectors run only when earlier layers came back sparse.
    fn fallback_only(&self) -> bool {
        false
    }
    fn detect(&self, page: &PageView<'_>) -> Vec<FieldDescriptor>;
}

fn is_field_name(name: &str) -> bool {
    if name.ends_with(SENTINEL_SUFFIX) {
        return false;
    }
    match name.strip_prefix(FIELD_PREFIX) {
        Some(rest) => rest.chars().next().is_some_and(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Infer the field mapping for a parsed page.
///
/// Descriptors appear in insertion order of first detection; callers must
/// not rely on any stronger ordering.
pub fn infer_fields(tree: &DomNode, raw_html: &str) -> Vec<FieldDescriptor> {
    let page = PageView {
        dom: tree,
        raw_html,
    };
    let detectors: [&dyn FieldDetector; 2] = [&StructuralDetector, &RawScanDetector];

    let mut layers = Vec::new();
    for detector in detectors {
        let found_so_far: usize = layers.iter().map(Vec::len).sum();
        if detector.fallback_only() && found_so_far >= SPARSE_FIELD_THRESHOLD {
            continue;
        }
        layers.push(detector.detect(&page));
    }
    merge_detections(layers)
}

/// Merge detector layers left-to-right; the first descriptor seen for a
/// field name wins.
pub fn merge_detections(layers: Vec<Vec<FieldDescriptor>>) -> Vec<FieldDescriptor> {
    let mut merged: Vec<FieldDescriptor> = Vec::new();
    let mut seen = HashSet::new();
    for layer in layers {
        for field in layer {
            if seen.insert(field.name.clone()) {
                merged.push(field);
            }
        }
    }
    merged
}

/// Primary pass: classify input/textarea/select nodes carrying a parameter
/// name, grouping choice controls by shared name.
pub struct StructuralDetector;

impl FieldDetector for StructuralDetector {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn detect(&self, page: &PageView<'_>) -> Vec<FieldDescriptor> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        dom::walk_elements(page.dom, &mut |node, ancestors| {
            if !matches!(node.tag.as_str(), "input" | "textarea" | "select") {
                return;
            }
            let Some(name) = node.attr("name") else {
                return;
            };
            if !is_field_name(name) || seen.contains(name) {
                return;
            }
            if let Some(kind) = classify_control(node, name, page.dom) {
                seen.insert(name.to_string());
                found.push(FieldDescriptor {
                    name: name.to_string(),
                    kind,
                    question: recover_question(node, ancestors),
                });
            }
        });

        found
    }
}

/// Fallback pass: scan the raw document for the naming pattern (matches
/// inside script payloads too), then try one structural lookup per hit
/// before defaulting to free text.
pub struct RawScanDetector;

impl FieldDetector for RawScanDetector {
    fn name(&self) -> &'static str {
        "raw-scan"
    }

    fn fallback_only(&self) -> bool {
        true
    }

    fn detect(&self, page: &PageView<'_>) -> Vec<FieldDescriptor> {
        let pattern = Regex::new(FIELD_NAME_PATTERN).expect("field name pattern");
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for capture in pattern.captures_iter(page.raw_html) {
            if capture.get(1).is_some() {
                // Sentinel-suffixed hit.
                continue;
            }
            let name = &capture[0];
            if !seen.insert(name.to_string()) {
                continue;
            }
            let kind = lookup_control(page.dom, name).unwrap_or(FieldKind::Text);
            found.push(FieldDescriptor {
                name: name.to_string(),
                kind,
                question: None,
            });
        }

        found
    }
}

fn classify_control(node: &DomNode, name: &str, root: &DomNode) -> Option<FieldKind> {
    match node.tag.as_str() {
        "textarea" => Some(FieldKind::Text),
        "select" => {
            let options = option_values(node);
            if options.is_empty() {
                None
            } else {
                Some(FieldKind::SingleChoice { options })
            }
        }
        "input" => match node.attr("type").unwrap_or("text") {
            "radio" => {
                let options = group_values(root, name, "radio");
                if options.is_empty() {
                    None
                } else {
                    Some(FieldKind::SingleChoice { options })
                }
            }
            "checkbox" => {
                let options = group_values(root, name, "checkbox");
                if options.is_empty() {
                    None
                } else {
                    Some(FieldKind::MultiChoice { options })
                }
            }
            "hidden" => Some(FieldKind::Fixed {
                // An empty preset means the field is synthesized as free text.
                preset: node
                    .attr("value")
                    .filter(|v| !v.is_empty())
                    .map(str::to_string),
            }),
            "text" | "email" | "tel" | "url" | "number" | "date" | "search" => {
                Some(FieldKind::Text)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Values of every input of `input_type` sharing `name`, in document order.
fn group_values(root: &DomNode, name: &str, input_type: &str) -> Vec<String> {
    let mut values = Vec::new();
    dom::walk_elements(root, &mut |node, _| {
        if node.tag == "input"
            && node.attr("type") == Some(input_type)
            && node.attr("name") == Some(name)
        {
            if let Some(value) = node.attr("value") {
                if !value.is_empty() {
                    values.push(value.to_string());
                }
            }
        }
    });
    values
}

fn option_values(select: &DomNode) -> Vec<String> {
    let mut values = Vec::new();
    dom::walk_elements(select, &mut |node, _| {
        if node.tag == "option" {
            if let Some(value) = node.attr("value") {
                if !value.is_empty() {
                    values.push(value.to_string());
                }
            }
        }
    });
    values
}

/// Find a control by parameter name and classify it.
fn lookup_control(root: &DomNode, name: &str) -> Option<FieldKind> {
    let mut kind = None;
    dom::walk_elements(root, &mut |node, _| {
        if kind.is_some() {
            return;
        }
        if matches!(node.tag.as_str(), "input" | "textarea" | "select")
            && node.attr("name") == Some(name)
        {
            kind = classify_control(node, name, root);
        }
    });
    kind
}

/// Best-effort question recovery: first text of the nearest enclosing
/// ancestor, then the control's accessibility label. Absence is not an error.
fn recover_question(node: &DomNode, ancestors: &[&DomNode]) -> Option<String> {
    for ancestor in ancestors.iter().rev() {
        if let Some(text) = dom::first_text(ancestor) {
            return Some(text);
        }
        if matches!(ancestor.tag.as_str(), "form" | "body") {
            break;
        }
    }
    node.attr("aria-label").map(str::to_string)
}
