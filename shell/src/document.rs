//! Document Binding
//!
//! The [`Document`] trait is the slice of the DOM the surface needs: lookup
//! by id, inner HTML, attributes and classes. Every call returns whether the
//! element existed; missing elements are never an error, matching how the
//! page treats a null `getElementById`.
//!
//! [`HeadlessDocument`] is an in-memory implementation. Setting an element's
//! inner HTML registers every `id="..."` found in the fragment as a child
//! element, so ids rendered by a region (explanation boxes, roulette image,
//! daily checkboxes) become addressable the way they would in a browser.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use dashmap::DashMap;

/// Element ids present in the static page shell
pub const PAGE_IDS: &[&str] = &[
    // Regions
    "gamification-hud",
    "quests-container",
    "daily-quests-container",
    "questChainList",
    "completed-quests-container",
    "inventory-grid",
    "store-grid",
    "chat-messages",
    // Views and navigation
    "dashboard-view",
    "profile-view",
    "nav-btn-home",
    "nav-btn-profile",
    // Modals
    "questChainModal",
    "levelUpModal",
    "newLevelText",
    // Inputs and controls
    "chat-input-text",
    "btn-send-chat",
    "chat-typing",
    "quick-quest-input",
    "btn-quick-quest",
    "btn-refresh-daily",
    // Mascot
    "oria-mascot",
    "profile-mascot",
];

/// DOM operations used by the surface
pub trait Document: Send + Sync {
    /// Whether an element with this id exists
    fn exists(&self, id: &str) -> bool;

    /// Replace an element's contents
    fn set_inner_html(&self, id: &str, html: &str) -> bool;

    /// Append to an element's contents
    fn append_html(&self, id: &str, html: &str) -> bool;

    /// An element's contents
    fn inner_html(&self, id: &str) -> Option<String>;

    /// Set an attribute
    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool;

    /// Remove an attribute
    fn remove_attribute(&self, id: &str, name: &str) -> bool;

    /// Read an attribute
    fn attribute(&self, id: &str, name: &str) -> Option<String>;

    /// Add a class
    fn add_class(&self, id: &str, class: &str) -> bool;

    /// Remove a class
    fn remove_class(&self, id: &str, class: &str) -> bool;

    /// Whether an element has a class
    fn has_class(&self, id: &str, class: &str) -> bool;

    /// Replace an element's contents with escaped text
    fn set_text(&self, id: &str, text: &str) -> bool {
        self.set_inner_html(id, &oria_core::view::escape(text))
    }

    /// Add or remove a class
    fn toggle_class(&self, id: &str, class: &str, on: bool) -> bool {
        if on {
            self.add_class(id, class)
        } else {
            self.remove_class(id, class)
        }
    }
}

/// One element of a [`HeadlessDocument`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Id of the element whose rendered fragment created this one
    pub parent: Option<String>,
    /// Contents
    pub inner_html: String,
    /// Attributes
    pub attributes: BTreeMap<String, String>,
    /// Classes
    pub classes: BTreeSet<String>,
}

/// In-memory document, cheap to clone and shared between clones
#[derive(Clone, Debug, Default)]
pub struct HeadlessDocument {
    elements: Arc<DashMap<String, Element>>,
}

impl HeadlessDocument {
    /// Empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with the ORIA page shell
    pub fn oria_page() -> Self {
        Self::with_elements(PAGE_IDS.iter().copied())
    }

    /// Document with the given top-level elements
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let doc = Self::new();
        for id in ids {
            doc.create(id);
        }
        doc
    }

    /// Add an empty top-level element
    pub fn create(&self, id: &str) {
        self.elements.insert(id.to_string(), Element::default());
    }

    /// Snapshot of an element
    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements.get(id).map(|e| e.value().clone())
    }

    /// Number of elements, including ones created by fragments
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the document has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn detach_children(&self, id: &str) {
        let children: Vec<String> = self
            .elements
            .iter()
            .filter(|e| e.value().parent.as_deref() == Some(id))
            .map(|e| e.key().clone())
            .collect();
        for child in children {
            self.detach_children(&child);
            self.elements.remove(&child);
        }
    }

    fn adopt_children(&self, id: &str, html: &str) {
        for child in fragment_ids(html) {
            if child == id {
                continue;
            }
            self.elements.insert(
                child,
                Element {
                    parent: Some(id.to_string()),
                    ..Default::default()
                },
            );
        }
    }

    fn with_element<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        match self.elements.get_mut(id) {
            Some(mut element) => {
                f(element.value_mut());
                true
            }
            None => false,
        }
    }
}

impl Document for HeadlessDocument {
    fn exists(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_inner_html(&self, id: &str, html: &str) -> bool {
        if !self.exists(id) {
            return false;
        }
        self.detach_children(id);
        self.adopt_children(id, html);
        self.with_element(id, |e| e.inner_html = html.to_string())
    }

    fn append_html(&self, id: &str, html: &str) -> bool {
        if !self.exists(id) {
            return false;
        }
        self.adopt_children(id, html);
        self.with_element(id, |e| e.inner_html.push_str(html))
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.inner_html.clone())
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool {
        self.with_element(id, |e| {
            e.attributes.insert(name.to_string(), value.to_string());
        })
    }

    fn remove_attribute(&self, id: &str, name: &str) -> bool {
        self.with_element(id, |e| {
            e.attributes.remove(name);
        })
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.elements
            .get(id)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |e| {
            e.classes.insert(class.to_string());
        })
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.with_element(id, |e| {
            e.classes.remove(class);
        })
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .is_some_and(|e| e.classes.contains(class))
    }
}

/// Every `id="..."` value in a fragment, in order
pub fn fragment_ids(html: &str) -> Vec<String> {
    html.split(" id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Readable text of a fragment: tags dropped, line breaks kept, entities
/// decoded
pub fn text_content(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut tag = String::new();

    for c in html.chars() {
        match (in_tag, c) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (false, c) => out.push(c),
            (true, '>') => {
                in_tag = false;
                let name = tag.trim_start_matches('/');
                let name = name.split_whitespace().next().unwrap_or_default();
                match name {
                    "br" | "div" | "h5" | "h6" | "p" => {
                        if !out.ends_with('\n') && !out.is_empty() {
                            out.push('\n');
                        }
                    }
                    _ => {
                        if !out.ends_with([' ', '\n']) && !out.is_empty() {
                            out.push(' ');
                        }
                    }
                }
            }
            (true, c) => tag.push(c),
        }
    }

    let decoded = out
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
