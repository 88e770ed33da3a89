//! Owned document arena built from parsed markup.
//!
//! Markup is parsed with `scraper` and copied into a flat arena so documents
//! are `Send + Sync` and elements can be addressed by a plain index. Arena
//! order is document (pre-)order, which the section source relies on.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use fieldsense_core_types::PageId;
use scraper::{Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::errors::{Result, StructuralError};

/// Index of a node inside one [`PageDocument`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
pub struct DomNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Identity of an element across caches: page identity plus arena index.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementKey {
    pub page: PageId,
    pub node: NodeId,
}

const CONTROL_TAGS: &[&str] = &["input", "select", "textarea"];
const NON_FIELD_INPUT_TYPES: &[&str] = &["button", "submit", "reset", "image", "hidden"];
const SKIPPED_TEXT_PARENTS: &[&str] = &["script", "style", "noscript", "template"];

pub struct PageDocument {
    id: PageId,
    url: Option<Url>,
    source: String,
    nodes: Vec<DomNode>,
}

impl fmt::Debug for PageDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDocument")
            .field("id", &self.id)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

impl PageDocument {
    /// Parse markup into a fresh document view with a new [`PageId`].
    pub fn parse(html: &str, url: Option<&str>) -> Result<Arc<Self>> {
        let url = match url {
            Some(raw) => Some(
                Url::parse(raw).map_err(|err| StructuralError::InvalidUrl(format!("{raw}: {err}")))?,
            ),
            None => None,
        };
        let parsed = Html::parse_document(html);
        let (nodes, _) = build_arena(&parsed, None);
        debug!(target: "fieldsense::dom", nodes = nodes.len(), "document parsed");
        Ok(Arc::new(Self {
            id: PageId::new(),
            url,
            source: html.to_string(),
            nodes,
        }))
    }

    pub fn id(&self) -> &PageId {
        &self.id
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn host(&self) -> Option<String> {
        self.url
            .as_ref()
            .and_then(|url| url.host_str())
            .map(|host| host.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn is_element(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.0).map(|node| &node.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn element(self: &Arc<Self>, id: NodeId) -> Option<Element> {
        Element::new(Arc::clone(self), id)
    }

    /// All elements in document order.
    pub fn elements(self: &Arc<Self>) -> impl Iterator<Item = Element> + '_ {
        (0..self.nodes.len()).filter_map(move |idx| self.element(NodeId(idx)))
    }

    pub fn elements_by_tag<'a>(
        self: &'a Arc<Self>,
        tags: &'a [&'a str],
    ) -> impl Iterator<Item = Element> + 'a {
        self.elements().filter(move |el| tags.contains(&el.tag()))
    }

    pub fn by_id(self: &Arc<Self>, id: &str) -> Option<Element> {
        if id.trim().is_empty() {
            return None;
        }
        self.elements().find(|el| el.attr("id") == Some(id))
    }

    /// Run a CSS selector against the document.
    pub fn select(self: &Arc<Self>, css: &str) -> Result<Vec<Element>> {
        let selector =
            Selector::parse(css).map_err(|err| StructuralError::Selector(format!("{css}: {err:?}")))?;
        // Arena indices come from a deterministic traversal, so a fresh parse
        // of the same source yields the same numbering.
        let reparsed = Html::parse_document(&self.source);
        let (_, matched) = build_arena(&reparsed, Some(&selector));
        Ok(matched
            .into_iter()
            .filter_map(|id| self.element(id))
            .collect())
    }

    /// Fillable controls: inputs, selects and textareas that are not buttons or hidden inputs.
    pub fn form_controls(self: &Arc<Self>) -> Vec<Element> {
        self.elements().filter(Element::is_fillable_control).collect()
    }

    /// `lang` declared on the root `<html>` element.
    pub fn declared_lang(self: &Arc<Self>) -> Option<String> {
        self.elements()
            .find(|el| el.tag() == "html")
            .and_then(|el| el.attr("lang").or_else(|| el.attr("xml:lang")).map(str::to_string))
            .filter(|lang| !lang.trim().is_empty())
    }

    /// Content of the first `<meta>` whose `name`, `property` or `http-equiv` equals `key`.
    pub fn meta_content(self: &Arc<Self>, key: &str) -> Option<String> {
        self.elements_by_tag(&["meta"])
            .find(|el| {
                ["name", "property", "http-equiv", "itemprop"]
                    .iter()
                    .any(|attr| el.attr(attr).map_or(false, |v| v.eq_ignore_ascii_case(key)))
            })
            .and_then(|el| el.attr("content").map(str::to_string))
            .filter(|content| !content.trim().is_empty())
    }

    pub fn title(self: &Arc<Self>) -> Option<String> {
        self.elements_by_tag(&["title"])
            .next()
            .map(|el| el.text())
            .filter(|title| !title.is_empty())
    }

    /// Raw bodies of every `application/ld+json` script block.
    pub fn json_ld_blocks(self: &Arc<Self>) -> Vec<String> {
        self.elements_by_tag(&["script"])
            .filter(|el| {
                el.attr("type")
                    .map_or(false, |ty| ty.trim().eq_ignore_ascii_case("application/ld+json"))
            })
            .map(|el| el.raw_text())
            .filter(|body| !body.trim().is_empty())
            .collect()
    }

    /// Visible-ish page text, skipping script and style bodies, bounded to `max_chars`.
    pub fn text_sample(&self, max_chars: usize) -> String {
        let mut out = String::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Text(text) = &node.kind {
                if self.has_skipped_ancestor(NodeId(idx)) {
                    continue;
                }
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(trimmed);
                if out.chars().count() >= max_chars {
                    return out.chars().take(max_chars).collect();
                }
            }
        }
        out
    }

    fn has_skipped_ancestor(&self, id: NodeId) -> bool {
        let mut current = self.nodes.get(id.0).and_then(|node| node.parent);
        while let Some(parent) = current {
            let node = &self.nodes[parent.0];
            if let NodeKind::Element { tag, .. } = &node.kind {
                if SKIPPED_TEXT_PARENTS.contains(&tag.as_str()) {
                    return true;
                }
            }
            current = node.parent;
        }
        false
    }
}

/// Copy the scraper tree into an arena. When a selector is given, also return
/// the arena ids of the elements it matches, in document order.
fn build_arena(html: &Html, selector: Option<&Selector>) -> (Vec<DomNode>, Vec<NodeId>) {
    let selected: HashSet<_> = selector
        .map(|sel| html.select(sel).map(|el| el.id()).collect())
        .unwrap_or_default();
    let mut index: HashMap<_, NodeId> = HashMap::new();
    let mut nodes: Vec<DomNode> = Vec::new();
    let mut matched = Vec::new();

    for node in html.tree.root().descendants() {
        let kind = match node.value() {
            Node::Document | Node::Fragment => NodeKind::Document,
            Node::Element(element) => NodeKind::Element {
                tag: element.name().to_ascii_lowercase(),
                attrs: element
                    .attrs()
                    .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                    .collect(),
            },
            Node::Text(text) => {
                let content: &str = &text.text;
                NodeKind::Text(content.to_string())
            }
            _ => continue,
        };
        let id = NodeId(nodes.len());
        let parent = node
            .parent()
            .and_then(|parent| index.get(&parent.id()).copied());
        if let Some(parent_id) = parent {
            let parent_node: &mut DomNode = &mut nodes[parent_id.0];
            parent_node.children.push(id);
        }
        if selected.contains(&node.id()) {
            matched.push(id);
        }
        index.insert(node.id(), id);
        nodes.push(DomNode {
            kind,
            parent,
            children: Vec::new(),
        });
    }
    (nodes, matched)
}

/// Non-owning-by-identity handle to one element of a document.
///
/// Holding an `Element` keeps its document alive; caches key on
/// [`ElementKey`] and hold only weak references.
#[derive(Clone)]
pub struct Element {
    doc: Arc<PageDocument>,
    node: NodeId,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("page", &self.doc.id)
            .field("node", &self.node.0)
            .field("tag", &self.tag())
            .finish()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.doc.id == other.doc.id
    }
}

impl Eq for Element {}

impl std::hash::Hash for Element {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.doc.id.hash(state);
        self.node.hash(state);
    }
}

impl Element {
    /// Returns `None` when `node` is out of range or not an element.
    pub fn new(doc: Arc<PageDocument>, node: NodeId) -> Option<Self> {
        if doc.is_element(node) {
            Some(Self { doc, node })
        } else {
            None
        }
    }

    pub fn document(&self) -> &Arc<PageDocument> {
        &self.doc
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    pub fn key(&self) -> ElementKey {
        ElementKey {
            page: self.doc.id.clone(),
            node: self.node,
        }
    }

    /// Cache key, after checking the handle still names an element node.
    pub fn checked_key(&self) -> Result<ElementKey> {
        if self.doc.is_element(self.node) {
            Ok(self.key())
        } else {
            Err(StructuralError::InvalidElement(format!(
                "node {} of page {}",
                self.node.0, self.doc.id
            )))
        }
    }

    fn data(&self) -> (&str, &[(String, String)]) {
        match &self.doc.nodes[self.node.0].kind {
            NodeKind::Element { tag, attrs } => (tag.as_str(), attrs.as_slice()),
            _ => ("", &[]),
        }
    }

    pub fn tag(&self) -> &str {
        self.data().0
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.data()
            .1
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value trimmed, `None` when missing or blank.
    pub fn attr_trimmed(&self, name: &str) -> Option<&str> {
        self.attr(name).map(str::trim).filter(|value| !value.is_empty())
    }

    pub fn attrs(&self) -> &[(String, String)] {
        self.data().1
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Lowercased `class` and `id` joined, for convention checks.
    pub fn class_and_id(&self) -> String {
        let mut out = String::new();
        if let Some(class) = self.attr("class") {
            out.push_str(class);
            out.push(' ');
        }
        if let Some(id) = self.attr("id") {
            out.push_str(id);
        }
        out.to_ascii_lowercase()
    }

    pub fn input_type(&self) -> Option<String> {
        if self.tag() != "input" {
            return None;
        }
        Some(
            self.attr("type")
                .map(|ty| ty.trim().to_ascii_lowercase())
                .filter(|ty| !ty.is_empty())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    pub fn is_form_control(&self) -> bool {
        CONTROL_TAGS.contains(&self.tag())
    }

    pub fn is_fillable_control(&self) -> bool {
        if !self.is_form_control() {
            return false;
        }
        match self.input_type() {
            Some(ty) => !NON_FIELD_INPUT_TYPES.contains(&ty.as_str()),
            None => true,
        }
    }

    pub fn parent(&self) -> Option<Element> {
        self.doc.nodes[self.node.0]
            .parent
            .and_then(|parent| self.doc.element(parent))
    }

    /// Element ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Element> {
        std::iter::successors(self.parent(), Element::parent)
    }

    pub fn children(&self) -> impl Iterator<Item = Element> + '_ {
        self.doc.nodes[self.node.0]
            .children
            .iter()
            .filter_map(move |child| self.doc.element(*child))
    }

    /// Element descendants in document order.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.doc.nodes[self.node.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(id) = stack.pop() {
            let node = &self.doc.nodes[id.0];
            if let Some(el) = self.doc.element(id) {
                out.push(el);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Preceding element siblings, nearest first.
    pub fn previous_siblings(&self) -> Vec<Element> {
        let Some(parent) = self.doc.nodes[self.node.0].parent else {
            return Vec::new();
        };
        let siblings = &self.doc.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|id| *id == self.node)
            .unwrap_or(0);
        siblings[..position]
            .iter()
            .rev()
            .filter_map(|id| self.doc.element(*id))
            .collect()
    }

    pub fn contains(&self, other: &Element) -> bool {
        other.doc.id == self.doc.id && other.ancestors().any(|ancestor| ancestor.node == self.node)
    }

    /// Descendant text with whitespace collapsed, skipping script/style bodies.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.collect_text(false, None))
    }

    /// Descendant text that does not belong to `exclude` or any form control.
    pub fn text_excluding(&self, exclude: &Element) -> String {
        collapse_whitespace(&self.collect_text(true, Some(exclude.node)))
    }

    /// Text of direct text children only.
    pub fn own_text(&self) -> String {
        let joined: Vec<&str> = self.doc.nodes[self.node.0]
            .children
            .iter()
            .filter_map(|id| match &self.doc.nodes[id.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        collapse_whitespace(&joined.join(" "))
    }

    /// Concatenated text children without normalization (script bodies included).
    pub fn raw_text(&self) -> String {
        self.doc.nodes[self.node.0]
            .children
            .iter()
            .filter_map(|id| match &self.doc.nodes[id.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn collect_text(&self, skip_controls: bool, exclude: Option<NodeId>) -> String {
        let mut out = String::new();
        let mut stack = vec![self.node];
        while let Some(id) = stack.pop() {
            if Some(id) == exclude {
                continue;
            }
            let node = &self.doc.nodes[id.0];
            match &node.kind {
                NodeKind::Text(text) => {
                    out.push_str(text);
                    out.push(' ');
                }
                NodeKind::Element { tag, .. } => {
                    if SKIPPED_TEXT_PARENTS.contains(&tag.as_str()) {
                        continue;
                    }
                    if skip_controls && id != self.node && CONTROL_TAGS.contains(&tag.as_str()) {
                        continue;
                    }
                    stack.extend(node.children.iter().rev().copied());
                }
                NodeKind::Document => stack.extend(node.children.iter().rev().copied()),
            }
        }
        out
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
