use crate::dom::{Document, NodeId};

/// Elements dropped wholesale, subtree included.
pub const NOISY_TAGS: &[&str] = &[
    "script", "style", "svg", "form", "nav", "footer", "header", "aside", "noscript", "iframe",
    "button", "input", "textarea", "select", "option",
];

/// Substrings of `class`/`id` that mark a boilerplate container.
pub const BOILERPLATE_HINTS: &[&str] = &[
    "sidebar",
    "comment",
    "popup",
    "cookie",
    "ad-",
    "widget",
    "promo",
    "newsletter",
    "trending",
    "related",
    "popular",
    "social",
    "share",
    "more-from",
    "more_from",
];

fn is_noise(doc: &Document, id: NodeId) -> bool {
    let Some(tag) = doc.tag(id) else {
        return false;
    };
    if NOISY_TAGS.contains(&tag) {
        return true;
    }
    let hints = doc.class_and_id_lc(id);
    BOILERPLATE_HINTS.iter().any(|bad| hints.contains(bad))
}

/// Remove noisy elements and boilerplate containers below `root`.
///
/// Matches are collected during a pre-order walk (never descending into a
/// match) and detached afterwards. Returns the number of detached subtrees.
pub fn clean_dom(doc: &mut Document, root: NodeId) -> usize {
    let mut to_remove = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if is_noise(doc, id) {
            to_remove.push(id);
            continue;
        }
        stack.extend(doc.children(id).iter().rev().copied());
    }
    doc.detach_all(&to_remove);
    to_remove.len()
}
