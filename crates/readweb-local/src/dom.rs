//! Arena-backed document tree.
//!
//! Parents own their ordered child lists; every node keeps a non-owning
//! back-reference to its parent so subtrees can be detached in place.
//! All walks use an explicit stack, so deeply nested markup cannot blow the
//! call stack.

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty tree holding only the document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse HTML (html5ever via `scraper`) into an arena tree.
    ///
    /// Only elements and text survive; comments, doctypes and processing
    /// instructions are dropped.
    pub fn parse(html: &str) -> Self {
        let parsed = html_scraper::Html::parse_document(html);
        let mut doc = Document::new();
        let root = doc.root();

        let top: Vec<_> = parsed.tree.root().children().collect();
        let mut stack: Vec<_> = top.into_iter().rev().map(|n| (n, root)).collect();
        while let Some((node, parent)) = stack.pop() {
            let id = match node.value() {
                html_scraper::Node::Element(el) => {
                    doc.append_element(parent, el.name(), el.attrs())
                }
                html_scraper::Node::Text(t) => {
                    doc.append_text(parent, &t.text);
                    continue;
                }
                _ => continue,
            };
            let kids: Vec<_> = node.children().collect();
            stack.extend(kids.into_iter().rev().map(|n| (n, id)));
        }
        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element<'a>(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> NodeId {
        let attrs = attrs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.push(
            parent,
            NodeKind::Element {
                name: name.to_ascii_lowercase(),
                attrs,
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Tag name for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// `class` and `id` joined by a space, lower-cased.
    pub fn class_and_id_lc(&self, id: NodeId) -> String {
        let class = self.attr(id, "class").unwrap_or("");
        let ident = self.attr(id, "id").unwrap_or("");
        format!("{class} {ident}").to_lowercase()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// True while `id` is still reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root() {
                return true;
            }
            match self.parent(cur) {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Unlink `id` (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|c| *c != id);
    }

    /// Unlink many subtrees at once; each parent's child list is rebuilt once.
    pub fn detach_all(&mut self, ids: &[NodeId]) {
        let mut parents = Vec::new();
        for id in ids {
            if let Some(p) = self.nodes[id.0].parent.take() {
                parents.push(p);
            }
        }
        parents.sort_unstable();
        parents.dedup();
        for p in parents {
            let mut kids = std::mem::take(&mut self.nodes[p.0].children);
            kids.retain(|c| self.nodes[c.0].parent == Some(p));
            self.nodes[p.0].children = kids;
        }
    }

    /// Pre-order walk starting at (and including) `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Descendant text in document order, collapsed to single-space
    /// separated words.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut words: Vec<&str> = Vec::new();
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = self.kind(n) {
                words.extend(t.split_whitespace());
            }
        }
        words.join(" ")
    }

    /// First element named `tag` in pre-order below (or at) `id`.
    pub fn find_first(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id).find(|n| self.tag(*n) == Some(tag))
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
