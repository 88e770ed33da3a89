use serde::Serialize;
use serde_json::{json, Map as JsonMap, Value};

use crate::dom::Element;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JudgeReport {
    pub ok: bool,
    pub reason: String,
    pub facts: Value,
}

/// Style facts derived from inline `style` declarations.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StyleHints {
    pub flags: Vec<String>,
    pub hides: bool,
    pub zero_opacity: bool,
    pub opacity: Option<f32>,
}

impl StyleHints {
    fn merge(&mut self, other: StyleHints) {
        self.flags.extend(other.flags);
        self.hides |= other.hides;
        self.zero_opacity |= other.zero_opacity;
        if self.opacity.is_none() {
            self.opacity = other.opacity;
        }
    }
}

/// Effective style of `element`: its own inline style merged with hiding
/// declarations inherited from ancestors.
pub fn style_hints(element: &Element) -> StyleHints {
    let mut hints = element
        .attr("style")
        .map(inspect_inline_style)
        .unwrap_or_default();
    for ancestor in element.ancestors() {
        if let Some(style) = ancestor.attr("style") {
            let inherited = inspect_inline_style(style);
            if inherited.hides || inherited.zero_opacity {
                hints.merge(inherited);
            }
        }
    }
    hints.flags.sort();
    hints.flags.dedup();
    hints
}

/// Decide whether a control is plausibly visible to the user.
///
/// `style` is usually served from the computed-style cache category.
pub fn visible(element: &Element, style: &StyleHints) -> JudgeReport {
    let mut facts = JsonMap::new();
    let mut issues: Vec<String> = Vec::new();

    if element.has_attr("hidden") {
        issues.push("hidden_attribute".into());
    }
    if attr_flag_true(element, "aria-hidden") {
        issues.push("aria_hidden".into());
    }
    if element.input_type().as_deref() == Some("hidden") {
        issues.push("hidden_input".into());
    }
    if element
        .ancestors()
        .any(|ancestor| ancestor.has_attr("hidden") || ancestor.tag() == "template")
    {
        issues.push("hidden_ancestor".into());
    }
    if style.hides {
        issues.push("style_hidden".into());
    }
    if style.zero_opacity {
        issues.push("opacity_zero".into());
    }
    if let Some(opacity) = style.opacity {
        facts.insert("opacity".into(), json!(opacity));
    }
    if !style.flags.is_empty() {
        facts.insert("style_flags".into(), json!(style.flags));
    }
    facts.insert("tag".into(), json!(element.tag()));

    let ok = issues.is_empty();
    if !ok {
        facts.insert("issues".into(), json!(issues));
    }
    let reason = format_reason(if ok { "visible" } else { "not_visible" }, &issues);

    JudgeReport {
        ok,
        reason,
        facts: Value::Object(facts),
    }
}

fn attr_flag_true(element: &Element, key: &str) -> bool {
    element.attr(key).map_or(false, |value| {
        let normalized = value.trim().to_ascii_lowercase();
        normalized.is_empty() || matches!(normalized.as_str(), "true" | "1" | "yes" | "on")
    })
}

fn format_reason(base: &str, issues: &[String]) -> String {
    if issues.is_empty() {
        base.to_string()
    } else {
        format!("{}({})", base, issues.join(","))
    }
}

fn inspect_inline_style(style: &str) -> StyleHints {
    let lower = style.to_ascii_lowercase();
    let mut hints = StyleHints::default();

    for chunk in lower.split(';') {
        let entry: String = chunk.chars().filter(|c| !c.is_whitespace()).collect();
        if entry.is_empty() {
            continue;
        }
        if entry.starts_with("display:none") {
            hints.hides = true;
            hints.flags.push("display:none".into());
        }
        if entry.starts_with("visibility:hidden") {
            hints.hides = true;
            hints.flags.push("visibility:hidden".into());
        }
        if let Some(rest) = entry.strip_prefix("opacity:") {
            if let Ok(value) = rest.trim_end_matches("!important").parse::<f32>() {
                hints.opacity = Some(value);
                if value <= 0.0 {
                    hints.zero_opacity = true;
                    hints.flags.push("opacity:0".into());
                }
            }
        }
    }

    hints
}
