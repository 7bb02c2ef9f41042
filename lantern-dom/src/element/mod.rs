mod content;
mod node;

pub use content::{Content, TextFn};
pub use node::{Element, ACTION_ATTR};

/// Find an element by ID in the tree.
pub fn find_element<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.id == id {
        return Some(root);
    }

    for child in root.content.children() {
        if let Some(found) = find_element(child, id) {
            return Some(found);
        }
    }

    None
}

/// Collect the chain of elements from `root` down to the element with `id`.
///
/// The returned path is ordered target first, root last (bubbling order).
pub fn element_path<'a>(root: &'a Element, id: &str) -> Option<Vec<&'a Element>> {
    if root.id == id {
        return Some(vec![root]);
    }

    for child in root.content.children() {
        if let Some(mut path) = element_path(child, id) {
            path.push(root);
            return Some(path);
        }
    }

    None
}

/// Concatenate all text below an element, depth first.
pub fn collect_text(element: &Element) -> String {
    let mut out = String::new();
    push_text(element, &mut out);
    out
}

fn push_text(element: &Element, out: &mut String) {
    match &element.content {
        Content::None => {}
        Content::Text(text) => out.push_str(text),
        Content::Dynamic(text) => out.push_str(&text()),
        Content::Children(children) => {
            for child in children {
                push_text(child, out);
            }
        }
    }
}
