use crate::dom::{Document, NodeId, NodeKind};
use std::collections::{BTreeMap, HashMap};

/// Candidates with fewer words than this contribute nothing.
pub const MIN_CANDIDATE_WORDS: usize = 10;
/// Anchor-text share above which a candidate is treated as a link list.
pub const MAX_LINK_DENSITY: f64 = 0.5;
pub const LINK_DENSITY_FACTOR: f64 = 0.1;
/// Share of a candidate's score credited to its parent.
pub const PARENT_SHARE: f64 = 0.3;

const POSITIVE_HINTS: &[&str] = &["article", "content", "post", "body"];
const NEGATIVE_HINTS: &[&str] = &["nav", "menu"];

/// Accumulated scores for one extraction call.
#[derive(Debug, Clone, Default)]
pub struct CandidateScores {
    scores: BTreeMap<NodeId, f64>,
}

impl CandidateScores {
    pub fn add(&mut self, id: NodeId, score: f64) {
        *self.scores.entry(id).or_insert(0.0) += score;
    }

    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.scores.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Text measurements of one subtree, as seen through
/// [`Document::text_content`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    pub words: usize,
    /// Characters of the words themselves, separators excluded.
    pub word_chars: usize,
    pub commas: usize,
    /// Characters of text inside the outermost anchors below the node.
    pub linked_chars: usize,
}

impl TextStats {
    /// Length of the collapsed text: words plus one separator between each.
    pub fn chars(&self) -> usize {
        self.word_chars + self.words.saturating_sub(1)
    }

    pub fn link_density(&self) -> f64 {
        let total = self.chars();
        if total == 0 {
            return 0.0;
        }
        self.linked_chars as f64 / total as f64
    }

    fn absorb(&mut self, child: &TextStats, child_is_anchor: bool) {
        self.words += child.words;
        self.word_chars += child.word_chars;
        self.commas += child.commas;
        self.linked_chars += if child_is_anchor {
            child.chars()
        } else {
            child.linked_chars
        };
    }
}

/// [`TextStats`] for `root` and every node below it, in one bottom-up pass.
pub fn text_stats(doc: &Document, root: NodeId) -> HashMap<NodeId, TextStats> {
    let order: Vec<NodeId> = doc.descendants(root).collect();
    let mut table: HashMap<NodeId, TextStats> = HashMap::with_capacity(order.len());
    // Reverse pre-order sees every child before its parent.
    for &id in order.iter().rev() {
        let mut stats = TextStats::default();
        if let NodeKind::Text(t) = doc.kind(id) {
            for word in t.split_whitespace() {
                stats.words += 1;
                stats.word_chars += word.chars().count();
                stats.commas += word.matches(',').count();
            }
        }
        for child in doc.children(id) {
            if let Some(cs) = table.get(child) {
                stats.absorb(cs, doc.tag(*child) == Some("a"));
            }
        }
        table.insert(id, stats);
    }
    table
}

fn is_candidate_tag(tag: &str) -> bool {
    matches!(tag, "p" | "article" | "section" | "div" | "main")
}

fn tag_bonus(tag: &str) -> f64 {
    match tag {
        "article" => 20.0,
        "main" => 15.0,
        "section" => 5.0,
        _ => 0.0,
    }
}

/// Share of the text length of `id` that sits inside anchors.
///
/// The outermost anchor's text is counted once; nested anchors are not
/// counted again.
pub fn link_density(doc: &Document, id: NodeId) -> f64 {
    text_stats(doc, id)
        .get(&id)
        .map(TextStats::link_density)
        .unwrap_or(0.0)
}

fn score_from_stats(doc: &Document, id: NodeId, stats: &TextStats) -> Option<f64> {
    let tag = doc.tag(id)?;
    if !is_candidate_tag(tag) || stats.words < MIN_CANDIDATE_WORDS {
        return None;
    }

    let mut score = tag_bonus(tag);
    score += stats.words as f64 * 0.5;
    score += stats.commas as f64 * 1.5;

    let hints = doc.class_and_id_lc(id);
    if POSITIVE_HINTS.iter().any(|h| hints.contains(h)) {
        score += 10.0;
    }
    if NEGATIVE_HINTS.iter().any(|h| hints.contains(h)) {
        score -= 20.0;
    }

    if stats.link_density() > MAX_LINK_DENSITY {
        score *= LINK_DENSITY_FACTOR;
    }
    Some(score)
}

/// Score of a single node, before any parent credit.
///
/// `None` when the node is not a candidate kind or is too short.
pub fn node_score(doc: &Document, id: NodeId) -> Option<f64> {
    let stats = text_stats(doc, id);
    score_from_stats(doc, id, stats.get(&id)?)
}

/// Score every candidate below `root`, crediting parents with a share.
///
/// Runs in time linear in the size of the tree regardless of nesting depth.
pub fn score_candidates(doc: &Document, root: NodeId) -> CandidateScores {
    let stats = text_stats(doc, root);
    let mut table = CandidateScores::default();
    for id in doc.descendants(root) {
        let Some(score) = stats
            .get(&id)
            .and_then(|s| score_from_stats(doc, id, s))
        else {
            continue;
        };
        table.add(id, score);
        if let Some(parent) = doc.parent(id) {
            table.add(parent, score * PARENT_SHARE);
        }
    }
    table
}
