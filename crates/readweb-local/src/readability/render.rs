use crate::dom::{Document, NodeId, NodeKind};

/// Link text at or above this many chars is emitted as plain text.
pub const MAX_LINK_TEXT_CHARS: usize = 200;

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Resolve `href` against `base_url`; unparsable input is returned as-is.
pub fn resolve_href(base_url: &str, href: &str) -> String {
    if base_url.is_empty() {
        return href.to_string();
    }
    url::Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn push_text(out: &mut String, text: &str) {
    let t = text.trim();
    if !t.is_empty() {
        out.push_str(t);
        out.push(' ');
    }
}

/// Render the subtree at `id` as raw (un-normalized) Markdown.
pub fn render_markdown(doc: &Document, id: NodeId, base_url: &str) -> String {
    let mut out = String::new();
    let mut stack = vec![Step::Enter(id)];
    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Leave(n) => {
                if matches!(doc.tag(n), Some("div" | "p" | "h1" | "h2" | "h3")) {
                    out.push('\n');
                }
                continue;
            }
            Step::Enter(n) => n,
        };

        match doc.kind(node) {
            NodeKind::Text(t) => {
                push_text(&mut out, t);
                continue;
            }
            NodeKind::Document => {}
            NodeKind::Element { name, .. } => match name.as_str() {
                "h1" => out.push_str("\n# "),
                "h2" => out.push_str("\n## "),
                "h3" => out.push_str("\n### "),
                "p" => out.push_str("\n\n"),
                "br" => out.push('\n'),
                "li" => out.push_str("\n- "),
                "a" => {
                    if let Some(href) = doc.attr(node, "href").filter(|h| !h.is_empty()) {
                        let text = doc.text_content(node);
                        let chars = text.chars().count();
                        if chars > 0 && chars < MAX_LINK_TEXT_CHARS {
                            let target = resolve_href(base_url, href);
                            out.push_str(&format!("[{text}]({target}) "));
                        } else {
                            push_text(&mut out, &text);
                        }
                        continue;
                    }
                }
                _ => {}
            },
        }

        stack.push(Step::Leave(node));
        stack.extend(doc.children(node).iter().rev().map(|c| Step::Enter(*c)));
    }
    out
}
