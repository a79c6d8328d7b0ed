//! Root target abstraction and the DOM half of the Synchronizer.
//!
//! The root element belongs to the host page. The toggle only annotates it,
//! with exactly one theme marker live under the active strategy, plus a
//! `color-scheme` hint for native controls.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::theme::{Mode, Strategy, THEME_ATTRIBUTE};

/// Element the toggle reads its page marker from and writes it to
pub trait RootElement {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);
    fn has_class(&self, class: &str) -> bool;
    fn set_class(&self, class: &str, present: bool);
    /// Current renderer hint, if one is set
    fn color_scheme(&self) -> Option<Mode>;
    fn set_color_scheme(&self, mode: Mode);
    /// Whether this is the document's top-level element
    fn is_document_element(&self) -> bool;
}

/// Host document
pub trait Document {
    fn document_element(&self) -> Rc<dyn RootElement>;
    fn query_selector(&self, selector: &str) -> Option<Rc<dyn RootElement>>;
}

/// OS / user-agent `prefers-color-scheme` signal
pub trait ColorSchemeQuery {
    fn prefers_dark(&self) -> bool;
}

/// Resolve the configured root selector. No selector, `html`, or a selector
/// matching nothing all mean the document element.
pub fn resolve_root(document: &dyn Document, selector: Option<&str>) -> Rc<dyn RootElement> {
    match selector.map(str::trim) {
        None | Some("") | Some("html") => document.document_element(),
        Some(sel) => document.query_selector(sel).unwrap_or_else(|| {
            tracing::debug!("Root selector {:?} matched nothing, using document root", sel);
            document.document_element()
        }),
    }
}

/// Theme currently signalled by the root under `strategy`.
///
/// The class strategy can only signal dark; absence of the class is no signal.
pub fn read_marker(root: &dyn RootElement, strategy: Strategy, dark_class: &str) -> Option<Mode> {
    match strategy {
        Strategy::Class => root.has_class(dark_class).then_some(Mode::Dark),
        Strategy::Attribute => root.attribute(THEME_ATTRIBUTE).as_deref().and_then(Mode::parse),
    }
}

/// Write `mode` onto the root. Idempotent: only differing state is touched,
/// and the representation of the inactive strategy is cleared.
pub fn apply_mode(
    document: &dyn Document,
    root: &dyn RootElement,
    strategy: Strategy,
    dark_class: &str,
    mode: Mode,
) {
    match strategy {
        Strategy::Attribute => {
            if root.attribute(THEME_ATTRIBUTE).as_deref() != Some(mode.as_str()) {
                root.set_attribute(THEME_ATTRIBUTE, mode.as_str());
            }
            if root.has_class(dark_class) {
                root.set_class(dark_class, false);
            }
        }
        Strategy::Class => {
            if root.has_class(dark_class) != mode.is_dark() {
                root.set_class(dark_class, mode.is_dark());
            }
            if root.attribute(THEME_ATTRIBUTE).is_some() {
                root.remove_attribute(THEME_ATTRIBUTE);
            }
        }
    }

    apply_color_scheme(document, root, mode);
}

/// Set the UA hint on the root, mirrored onto the document element when the
/// root is a scoped subtree.
pub fn apply_color_scheme(document: &dyn Document, root: &dyn RootElement, mode: Mode) {
    if root.color_scheme() != Some(mode) {
        root.set_color_scheme(mode);
    }
    if !root.is_document_element() {
        let top = document.document_element();
        if top.color_scheme() != Some(mode) {
            top.set_color_scheme(mode);
        }
    }
}

// ============ In-memory DOM ============

/// A single write performed on a [`MemoryElement`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetAttribute(String, String),
    RemoveAttribute(String),
    AddClass(String),
    RemoveClass(String),
    ColorScheme(Mode),
}

#[derive(Default)]
struct ElementState {
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    color_scheme: Option<Mode>,
    is_document_element: bool,
    mutations: Vec<Mutation>,
}

/// In-memory element. Clones are handles to the same node.
#[derive(Clone, Default)]
pub struct MemoryElement {
    state: Rc<RefCell<ElementState>>,
}

impl MemoryElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute or class change made by some other script on the page
    pub fn external_set_attribute(&self, name: &str, value: &str) {
        self.state
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn external_remove_attribute(&self, name: &str) {
        self.state.borrow_mut().attributes.remove(name);
    }

    pub fn external_set_class(&self, class: &str, present: bool) {
        let mut state = self.state.borrow_mut();
        state.classes.retain(|c| c != class);
        if present {
            state.classes.push(class.to_string());
        }
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    /// Writes made through [`RootElement`], drained
    pub fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.state.borrow_mut().mutations)
    }
}

impl RootElement for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.state.borrow().attributes.get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        state
            .attributes
            .insert(name.to_string(), value.to_string());
        state
            .mutations
            .push(Mutation::SetAttribute(name.to_string(), value.to_string()));
    }

    fn remove_attribute(&self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.attributes.remove(name);
        state
            .mutations
            .push(Mutation::RemoveAttribute(name.to_string()));
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }

    fn set_class(&self, class: &str, present: bool) {
        let mut state = self.state.borrow_mut();
        state.classes.retain(|c| c != class);
        if present {
            state.classes.push(class.to_string());
            state.mutations.push(Mutation::AddClass(class.to_string()));
        } else {
            state.mutations.push(Mutation::RemoveClass(class.to_string()));
        }
    }

    fn color_scheme(&self) -> Option<Mode> {
        self.state.borrow().color_scheme
    }

    fn set_color_scheme(&self, mode: Mode) {
        let mut state = self.state.borrow_mut();
        state.color_scheme = Some(mode);
        state.mutations.push(Mutation::ColorScheme(mode));
    }

    fn is_document_element(&self) -> bool {
        self.state.borrow().is_document_element
    }
}

/// In-memory document with selector lookup by exact string
#[derive(Clone)]
pub struct MemoryDocument {
    root: MemoryElement,
    elements: Rc<RefCell<HashMap<String, MemoryElement>>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let root = MemoryElement::new();
        root.state.borrow_mut().is_document_element = true;
        Self {
            root,
            elements: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn root(&self) -> MemoryElement {
        self.root.clone()
    }

    /// Register an element reachable through `selector`
    pub fn insert(&self, selector: &str) -> MemoryElement {
        let el = MemoryElement::new();
        self.elements
            .borrow_mut()
            .insert(selector.to_string(), el.clone());
        el
    }
}

impl Document for MemoryDocument {
    fn document_element(&self) -> Rc<dyn RootElement> {
        Rc::new(self.root.clone())
    }

    fn query_selector(&self, selector: &str) -> Option<Rc<dyn RootElement>> {
        self.elements
            .borrow()
            .get(selector)
            .map(|el| Rc::new(el.clone()) as Rc<dyn RootElement>)
    }
}

/// Color-scheme signal that tests can flip
#[derive(Clone, Default)]
pub struct FixedColorScheme {
    dark: Rc<Cell<bool>>,
}

impl FixedColorScheme {
    pub fn new(dark: bool) -> Self {
        Self {
            dark: Rc::new(Cell::new(dark)),
        }
    }

    pub fn set(&self, dark: bool) {
        self.dark.set(dark);
    }
}

impl ColorSchemeQuery for FixedColorScheme {
    fn prefers_dark(&self) -> bool {
        self.dark.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_root_fallbacks() {
        let doc = MemoryDocument::new();
        let panel = doc.insert("#panel");

        assert!(resolve_root(&doc, None).is_document_element());
        assert!(resolve_root(&doc, Some("html")).is_document_element());
        assert!(resolve_root(&doc, Some("#missing")).is_document_element());

        let root = resolve_root(&doc, Some("#panel"));
        assert!(!root.is_document_element());
        root.set_attribute("x", "1");
        assert_eq!(panel.attribute("x").as_deref(), Some("1"));
    }

    #[test]
    fn test_read_marker() {
        let el = MemoryElement::new();
        assert_eq!(read_marker(&el, Strategy::Attribute, "dark"), None);
        assert_eq!(read_marker(&el, Strategy::Class, "dark"), None);

        el.external_set_attribute(THEME_ATTRIBUTE, "light");
        assert_eq!(read_marker(&el, Strategy::Attribute, "dark"), Some(Mode::Light));
        el.external_set_attribute(THEME_ATTRIBUTE, "neon");
        assert_eq!(read_marker(&el, Strategy::Attribute, "dark"), None);

        el.external_set_class("night", true);
        assert_eq!(read_marker(&el, Strategy::Class, "night"), Some(Mode::Dark));
        assert_eq!(read_marker(&el, Strategy::Class, "dark"), None);
    }

    #[test]
    fn test_apply_attribute_strategy() {
        let doc = MemoryDocument::new();
        let root = doc.root();
        root.external_set_class("dark", true);

        apply_mode(&doc, &root, Strategy::Attribute, "dark", Mode::Dark);

        assert_eq!(root.attribute(THEME_ATTRIBUTE).as_deref(), Some("dark"));
        assert!(!root.has_class("dark"));
        assert_eq!(root.color_scheme(), Some(Mode::Dark));
    }

    #[test]
    fn test_apply_class_strategy() {
        let doc = MemoryDocument::new();
        let root = doc.root();
        root.external_set_attribute(THEME_ATTRIBUTE, "dark");

        apply_mode(&doc, &root, Strategy::Class, "dark", Mode::Dark);
        assert!(root.has_class("dark"));
        assert_eq!(root.attribute(THEME_ATTRIBUTE), None);

        apply_mode(&doc, &root, Strategy::Class, "dark", Mode::Light);
        assert!(!root.has_class("dark"));
        assert_eq!(root.color_scheme(), Some(Mode::Light));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let doc = MemoryDocument::new();
        let root = doc.root();

        apply_mode(&doc, &root, Strategy::Attribute, "dark", Mode::Dark);
        let first = root.take_mutations();
        assert!(!first.is_empty());

        apply_mode(&doc, &root, Strategy::Attribute, "dark", Mode::Dark);
        assert!(root.take_mutations().is_empty());
        assert_eq!(root.classes(), Vec::<String>::new());
    }

    #[test]
    fn test_scoped_root_mirrors_hint_to_document() {
        let doc = MemoryDocument::new();
        let panel = doc.insert(".panel");

        apply_mode(&doc, &panel, Strategy::Class, "dark", Mode::Dark);

        assert!(panel.has_class("dark"));
        assert_eq!(panel.color_scheme(), Some(Mode::Dark));
        assert_eq!(doc.root().color_scheme(), Some(Mode::Dark));
        assert!(!doc.root().has_class("dark"));
    }
}
