//! Mutable element store that overlays are mounted into.
//!
//! The document owns a single `body` element. Subtrees are mounted as
//! children of the body (or of any other element) and removed again by ID.
//! Events are built from the document so that their bubbling path reflects
//! the tree as it is at dispatch time.

use crate::element::{collect_text, element_path, find_element, Content, Element};
use crate::event::{Event, EventKind, Key, Modifiers, PathEntry};

/// ID of the document's root element.
pub const BODY_ID: &str = "body";

#[derive(Debug, Clone)]
pub struct Document {
    body: Element,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            body: Element::box_()
                .id(BODY_ID)
                .tag("body")
                .children(Vec::new()),
        }
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    /// Append a subtree to the body. Returns the subtree's root ID.
    pub fn mount(&mut self, element: Element) -> String {
        let id = element.id.clone();
        log::debug!("mounting '{}' into body", id);
        if let Some(children) = self.body.children_mut() {
            children.push(element);
        } else {
            self.body.content = Content::Children(vec![element]);
        }
        id
    }

    /// Append a subtree under `parent`. Returns `None` if the parent is not in the document.
    pub fn mount_into(&mut self, parent: &str, element: Element) -> Option<String> {
        let target = find_element_mut(&mut self.body, parent)?;
        let id = element.id.clone();
        log::debug!("mounting '{}' into '{}'", id, parent);
        match target.children_mut() {
            Some(children) => children.push(element),
            None => target.content = Content::Children(vec![element]),
        }
        Some(id)
    }

    /// Remove the subtree rooted at `id`. The body itself cannot be removed.
    pub fn unmount(&mut self, id: &str) -> Option<Element> {
        let removed = remove_element(&mut self.body, id);
        if removed.is_some() {
            log::debug!("unmounted '{}'", id);
        }
        removed
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        find_element(&self.body, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Elements from `id` up to the body, target first.
    pub fn path(&self, id: &str) -> Option<Vec<&Element>> {
        element_path(&self.body, id)
    }

    /// First element (depth first) carrying the data attribute `key`.
    pub fn query(&self, key: &str) -> Option<&Element> {
        self.query_all(key).into_iter().next()
    }

    /// All elements carrying the data attribute `key`, depth first.
    pub fn query_all(&self, key: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        collect_with_data(&self.body, key, &mut found);
        found
    }

    /// Current text below the element with `id`.
    pub fn text(&self, id: &str) -> Option<String> {
        self.find(id).map(collect_text)
    }

    /// Build a click event targeting `id`, with its bubbling path.
    pub fn click(&self, id: &str) -> Option<Event> {
        Some(Event::new(EventKind::Click, self.event_path(id)?))
    }

    /// Build a key press delivered to `id`.
    pub fn key_down(&self, id: &str, key: Key, modifiers: Modifiers) -> Option<Event> {
        Some(Event::new(
            EventKind::KeyDown { key, modifiers },
            self.event_path(id)?,
        ))
    }

    /// Build an input event for the element `id`.
    pub fn input(&self, id: &str, value: impl Into<String>) -> Option<Event> {
        Some(Event::new(
            EventKind::Input {
                value: value.into(),
            },
            self.event_path(id)?,
        ))
    }

    fn event_path(&self, id: &str) -> Option<Vec<PathEntry>> {
        let path = self.path(id)?;
        Some(
            path.into_iter()
                .map(|element| PathEntry {
                    id: element.id.clone(),
                    action: element.action_name().map(str::to_string),
                })
                .collect(),
        )
    }
}

fn find_element_mut<'a>(element: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    if element.id == id {
        return Some(element);
    }

    let children = element.children_mut()?;
    children
        .iter_mut()
        .find_map(|child| find_element_mut(child, id))
}

fn remove_element(element: &mut Element, id: &str) -> Option<Element> {
    let children = element.children_mut()?;

    if let Some(index) = children.iter().position(|child| child.id == id) {
        return Some(children.remove(index));
    }

    children
        .iter_mut()
        .find_map(|child| remove_element(child, id))
}

fn collect_with_data<'a>(element: &'a Element, key: &str, found: &mut Vec<&'a Element>) {
    if element.data.contains_key(key) {
        found.push(element);
    }
    for child in element.content.children() {
        collect_with_data(child, key, found);
    }
}
