//! Caption resolution for form controls.
//!
//! Strategies run in a fixed precedence order and the first non-empty caption
//! wins. An empty result is "no textual evidence", never an error.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dom::{collapse_whitespace, Element};

const MAX_LABEL_CHARS: usize = 200;
const MAX_CAPTION_CHARS: usize = 120;
const CONTAINER_DEPTH: usize = 5;
const ANCESTOR_WALK_DEPTH: usize = 3;
const SIBLING_LOOKBACK: usize = 3;

const CONTAINER_MARKERS: &[&str] = &[
    "field",
    "form-group",
    "form-field",
    "form-row",
    "question",
    "application-question",
    "input-wrapper",
    "field-wrapper",
];

const CAPTION_TAGS: &[&str] = &[
    "label", "span", "p", "div", "strong", "b", "legend", "dt", "h1", "h2", "h3", "h4", "h5",
    "h6",
];

const REQUIRED_MARKERS: &[&str] = &["(required)", "(optional)", "*", ":"];

/// Which strategy produced a caption.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    LabelFor,
    WrappingLabel,
    AriaLabelledBy,
    AriaLabel,
    Title,
    Placeholder,
    Container,
    PrecedingSibling,
    AncestorWalk,
    Override,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLabel {
    pub text: String,
    pub source: LabelSource,
}

impl ResolvedLabel {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            source: LabelSource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct LabelExtractor;

impl LabelExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Best human-readable caption for `element`.
    pub fn resolve(&self, element: &Element) -> ResolvedLabel {
        let strategies: [(LabelSource, fn(&Element) -> Option<String>); 9] = [
            (LabelSource::LabelFor, label_for),
            (LabelSource::WrappingLabel, wrapping_label),
            (LabelSource::AriaLabelledBy, aria_labelledby),
            (LabelSource::AriaLabel, |el| el.attr_trimmed("aria-label").map(str::to_string)),
            (LabelSource::Title, |el| el.attr_trimmed("title").map(str::to_string)),
            (LabelSource::Placeholder, |el| el.attr_trimmed("placeholder").map(str::to_string)),
            (LabelSource::Container, container_caption),
            (LabelSource::PrecedingSibling, preceding_sibling_caption),
            (LabelSource::AncestorWalk, ancestor_walk),
        ];

        for (source, strategy) in strategies {
            if let Some(raw) = strategy(element) {
                let text = clean_label(&raw);
                if !text.is_empty() {
                    trace!(target: "fieldsense::label", ?source, %text, "label resolved");
                    return ResolvedLabel { text, source };
                }
            }
        }
        ResolvedLabel::empty()
    }
}

/// Normalize a caption: collapse whitespace, drop required/colon markers, bound length.
pub fn clean_label(raw: &str) -> String {
    let mut text = collapse_whitespace(raw);
    loop {
        let before = text.len();
        for marker in REQUIRED_MARKERS {
            let lower = text.to_lowercase();
            if lower.ends_with(marker) {
                let cut = text.len() - marker.len();
                if text.is_char_boundary(cut) {
                    text.truncate(cut);
                }
            }
            text = text.trim().to_string();
        }
        if text.len() == before {
            break;
        }
    }
    if text.chars().count() > MAX_LABEL_CHARS {
        text = text.chars().take(MAX_LABEL_CHARS).collect();
    }
    text.trim().to_string()
}

fn label_for(element: &Element) -> Option<String> {
    let id = element.attr_trimmed("id")?;
    element
        .document()
        .elements_by_tag(&["label"])
        .find(|label| label.attr("for").map(str::trim) == Some(id))
        .map(|label| label.text_excluding(element))
}

fn wrapping_label(element: &Element) -> Option<String> {
    element
        .ancestors()
        .find(|ancestor| ancestor.tag() == "label")
        .map(|label| label.text_excluding(element))
}

fn aria_labelledby(element: &Element) -> Option<String> {
    let ids = element.attr_trimmed("aria-labelledby")?;
    let doc = element.document();
    let parts: Vec<String> = ids
        .split_whitespace()
        .filter_map(|id| doc.by_id(id))
        .map(|el| el.text())
        .filter(|text| !text.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn is_field_container(candidate: &Element) -> bool {
    if candidate.tag() == "fieldset" {
        return true;
    }
    let marks = candidate.class_and_id();
    marks.split_whitespace().any(|token| {
        CONTAINER_MARKERS.iter().any(|marker| {
            token == *marker
                || token.starts_with(&format!("{marker}-"))
                || token.ends_with(&format!("-{marker}"))
                || token.ends_with(&format!("_{marker}"))
        })
    }) || candidate.has_attr("data-field")
}

fn fillable_count(element: &Element) -> usize {
    element
        .descendants()
        .iter()
        .filter(|el| el.is_fillable_control())
        .count()
}

fn container_caption(element: &Element) -> Option<String> {
    for container in element.ancestors().take(CONTAINER_DEPTH) {
        if !is_field_container(&container) {
            continue;
        }
        if fillable_count(&container) > 1 && container.tag() != "fieldset" {
            continue;
        }
        let caption = container.descendants().into_iter().find(|candidate| {
            if candidate == element || fillable_count(candidate) > 0 {
                return false;
            }
            matches!(candidate.tag(), "label" | "legend")
                || candidate
                    .attr("class")
                    .map_or(false, |class| class.to_ascii_lowercase().contains("label"))
        });
        if let Some(caption) = caption {
            let text = caption.text();
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn preceding_sibling_caption(element: &Element) -> Option<String> {
    for sibling in element.previous_siblings().into_iter().take(SIBLING_LOOKBACK) {
        if sibling.is_fillable_control() || fillable_count(&sibling) > 0 {
            return None;
        }
        if !CAPTION_TAGS.contains(&sibling.tag()) {
            continue;
        }
        let text = sibling.text();
        let len = text.chars().count();
        if (1..=MAX_CAPTION_CHARS).contains(&len) {
            return Some(text);
        }
    }
    None
}

fn ancestor_walk(element: &Element) -> Option<String> {
    element
        .ancestors()
        .take(ANCESTOR_WALK_DEPTH)
        .map(|ancestor| ancestor.own_text())
        .find(|text| (1..=MAX_CAPTION_CHARS).contains(&text.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PageDocument;

    fn resolve(html: &str, id: &str) -> ResolvedLabel {
        let doc = PageDocument::parse(html, None).unwrap();
        let el = doc.by_id(id).unwrap();
        LabelExtractor::new().resolve(&el)
    }

    #[test]
    fn explicit_label_for_wins_over_placeholder() {
        let label = resolve(
            r#"<label for="e">Email address *</label><input id="e" placeholder="you@example.com">"#,
            "e",
        );
        assert_eq!(label.text, "Email address");
        assert_eq!(label.source, LabelSource::LabelFor);
    }

    #[test]
    fn wrapping_label_excludes_control_text() {
        let label = resolve(
            r#"<label>Country: <select id="c"><option>Germany</option></select></label>"#,
            "c",
        );
        assert_eq!(label.text, "Country");
        assert_eq!(label.source, LabelSource::WrappingLabel);
    }

    #[test]
    fn aria_labelledby_joins_referenced_text() {
        let label = resolve(
            r#"<span id="l1">Expected</span><span id="l2">salary</span>
               <input id="s" aria-labelledby="l1 l2">"#,
            "s",
        );
        assert_eq!(label.text, "Expected salary");
        assert_eq!(label.source, LabelSource::AriaLabelledBy);
    }

    #[test]
    fn placeholder_used_when_no_relation() {
        let label = resolve(r#"<input id="p" placeholder="Phone number">"#, "p");
        assert_eq!(label.text, "Phone number");
        assert_eq!(label.source, LabelSource::Placeholder);
    }

    #[test]
    fn container_caption_found() {
        let label = resolve(
            r#"<div class="application-question">
                 <div class="text">Notice period</div>
                 <div class="application-label">Notice period (required)</div>
                 <div><input id="n"></div>
               </div>"#,
            "n",
        );
        assert_eq!(label.text, "Notice period");
        assert_eq!(label.source, LabelSource::Container);
    }

    #[test]
    fn preceding_sibling_caption_found() {
        let label = resolve(r#"<div><span>City</span><input id="c"></div>"#, "c");
        assert_eq!(label.text, "City");
        assert_eq!(label.source, LabelSource::PrecedingSibling);
    }

    #[test]
    fn sibling_search_stops_at_previous_control() {
        let label = resolve(
            r#"<section><span>First name</span><input id="a"><input id="b"></section>"#,
            "b",
        );
        assert_ne!(label.text, "First name");
    }

    #[test]
    fn ancestor_walk_uses_direct_text() {
        let label = resolve(r#"<div>Portfolio URL <input id="u"></div>"#, "u");
        assert_eq!(label.text, "Portfolio URL");
        assert_eq!(label.source, LabelSource::AncestorWalk);
    }

    #[test]
    fn unresolved_label_is_empty_not_error() {
        let label = resolve(r#"<div><input id="x"></div>"#, "x");
        assert!(label.is_empty());
        assert_eq!(label.source, LabelSource::None);
    }

    #[test]
    fn clean_label_strips_markers_and_bounds_length() {
        assert_eq!(clean_label("  First   name * : "), "First name");
        assert_eq!(clean_label("Phone (Required)"), "Phone");
        assert_eq!(clean_label(&"x".repeat(500)).chars().count(), MAX_LABEL_CHARS);
    }
}
