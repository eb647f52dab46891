//! In-memory page state shared by the controllers.
//!
//! `Document` stands in for the browser DOM: named regions hold rendered
//! markup, and small sets track field values, disabled controls, visible
//! overlays and active tabs. `Page` is the cheap, cloneable handle the
//! controllers and the countdown task share.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::markup::{text, Element, Node};

/// Whatever displays the page. Asked to start over when the weekly limit
/// countdown runs out.
pub trait PageHost: Send + Sync {
    fn reload(&self);
}

#[derive(Debug, Default)]
pub struct Document {
    regions: BTreeMap<String, Node>,
    values: BTreeMap<String, String>,
    disabled: BTreeSet<String>,
    shown: BTreeSet<String>,
    active: BTreeSet<String>,
}

impl Document {
    pub fn set_content<S: Into<String>, N: Into<Node>>(&mut self, region: S, node: N) {
        self.regions.insert(region.into(), node.into());
    }

    pub fn content(&self, region: &str) -> Option<&Node> {
        self.regions.get(region)
    }

    pub fn content_mut(&mut self, region: &str) -> Option<&mut Node> {
        self.regions.get_mut(region)
    }

    /// Rendered markup of a region, empty when it was never filled.
    pub fn render(&self, region: &str) -> String {
        self.regions
            .get(region)
            .map(Node::render)
            .unwrap_or_default()
    }

    /// Element with the given `id` attribute, searched across every region.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.regions
            .values()
            .find_map(|node| node.find(&|e| e.get_attr("id") == Some(id)))
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.regions
            .values_mut()
            .find_map(|node| node.find_mut(&|e| e.get_attr("id") == Some(id)))
    }

    /// Replaces the text of a region, or of a nested element with that id.
    /// Returns false when neither exists.
    pub fn set_text<S: Into<String>>(&mut self, id: &str, value: S) -> bool {
        let value = value.into();
        if let Some(region) = self.regions.get_mut(id) {
            *region = text(value);
            return true;
        }
        match self.element_mut(id) {
            Some(element) => {
                element.replace_children(text(value));
                true
            }
            None => false,
        }
    }

    pub fn text(&self, id: &str) -> Option<String> {
        if let Some(region) = self.regions.get(id) {
            return Some(region.text_content());
        }
        self.element(id).map(Element::text_content)
    }

    pub fn set_value<K: Into<String>, V: Into<String>>(&mut self, field: K, value: V) {
        self.values.insert(field.into(), value.into());
    }

    pub fn value(&self, field: &str) -> String {
        self.values.get(field).cloned().unwrap_or_default()
    }

    pub fn reset_fields(&mut self, fields: &[&str]) {
        for field in fields {
            self.values.remove(*field);
        }
    }

    pub fn set_disabled(&mut self, control: &str, disabled: bool) {
        if disabled {
            self.disabled.insert(control.to_string());
        } else {
            self.disabled.remove(control);
        }
    }

    pub fn is_disabled(&self, control: &str) -> bool {
        self.disabled.contains(control)
    }

    pub fn show(&mut self, id: &str) {
        self.shown.insert(id.to_string());
    }

    pub fn hide(&mut self, id: &str) {
        self.shown.remove(id);
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if self.shown.remove(id) {
            false
        } else {
            self.shown.insert(id.to_string());
            true
        }
    }

    pub fn is_shown(&self, id: &str) -> bool {
        self.shown.contains(id)
    }

    pub fn set_active(&mut self, id: &str, active: bool) {
        if active {
            self.active.insert(id.to_string());
        } else {
            self.active.remove(id);
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

#[derive(Clone)]
pub struct Page {
    doc: Arc<Mutex<Document>>,
    host: Arc<dyn PageHost>,
}

impl Page {
    pub fn new(host: Arc<dyn PageHost>) -> Self {
        Self {
            doc: Arc::new(Mutex::new(Document::default())),
            host,
        }
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.lock())
    }

    pub fn render(&self, region: &str) -> String {
        self.read(|doc| doc.render(region))
    }

    pub fn reload(&self) {
        log::info!("Reloading page");
        self.host.reload();
    }

    fn lock(&self) -> MutexGuard<'_, Document> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::el;

    #[test]
    fn set_text_reaches_nested_elements() {
        let mut doc = Document::default();
        doc.set_content(
            "statusBanner",
            el("div").child(el("div").id("countdown").text("Calculating...")),
        );
        assert!(doc.set_text("countdown", "0d 0h 0m 10s"));
        assert_eq!(doc.text("countdown").as_deref(), Some("0d 0h 0m 10s"));
        assert!(!doc.set_text("missing", "x"));
    }

    #[test]
    fn toggle_flips_visibility() {
        let mut doc = Document::default();
        assert!(doc.toggle("profileDropdown"));
        assert!(doc.is_shown("profileDropdown"));
        assert!(!doc.toggle("profileDropdown"));
        assert!(!doc.is_shown("profileDropdown"));
    }

    #[test]
    fn reset_fields_clears_only_named_fields() {
        let mut doc = Document::default();
        doc.set_value("issue", "Bullying");
        doc.set_value("searchInput", "mai");
        doc.reset_fields(&["issue"]);
        assert_eq!(doc.value("issue"), "");
        assert_eq!(doc.value("searchInput"), "mai");
    }
}
