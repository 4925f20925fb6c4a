use super::score::CandidateScores;
use crate::dom::{Document, NodeId};
use readweb_core::{Error, Result};

/// Pick the root of the main content region.
///
/// Highest score wins; on ties the candidate met first in pre-order wins.
/// With no positive candidate, fall back to the first `body` that still
/// carries text.
pub fn select_candidate(doc: &Document, root: NodeId, scores: &CandidateScores) -> Result<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for id in doc.descendants(root) {
        let Some(score) = scores.get(id) else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((id, score)),
        }
    }

    if let Some((id, score)) = best.filter(|(_, s)| *s > 0.0) {
        tracing::debug!(
            tag = doc.tag(id).unwrap_or("#document"),
            score,
            candidates = scores.len(),
            "selected content candidate"
        );
        return Ok(id);
    }

    let body = doc.find_first(root, "body").ok_or(Error::ContentNotFound)?;
    if doc.text_content(body).is_empty() {
        return Err(Error::ContentNotFound);
    }
    tracing::debug!(candidates = scores.len(), "no positive candidate; using body");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_score_wins() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "div", []);
        let b = doc.append_element(root, "div", []);
        let mut scores = CandidateScores::default();
        scores.add(a, 3.0);
        scores.add(b, 7.5);
        assert_eq!(select_candidate(&doc, root, &scores).unwrap(), b);
    }

    #[test]
    fn ties_go_to_the_first_node_in_document_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let body = doc.append_element(root, "body", []);
        let first = doc.append_element(body, "p", []);
        let second = doc.append_element(body, "p", []);

        // Insertion order into the table must not matter.
        let mut scores = CandidateScores::default();
        scores.add(second, 9.0);
        scores.add(first, 9.0);
        assert_eq!(select_candidate(&doc, root, &scores).unwrap(), first);

        // Nor does NodeId order: build a tree where the later node has a smaller id.
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.append_element(root, "div", []);
        let late = doc.append_element(root, "p", []);
        let early = doc.append_element(outer, "p", []);
        assert!(late < early);
        let mut scores = CandidateScores::default();
        scores.add(late, 4.0);
        scores.add(early, 4.0);
        assert_eq!(select_candidate(&doc, root, &scores).unwrap(), early);
    }

    #[test]
    fn non_positive_scores_fall_back_to_body() {
        let mut doc = Document::new();
        let root = doc.root();
        let html = doc.append_element(root, "html", []);
        let body = doc.append_element(html, "body", []);
        let nav = doc.append_element(body, "div", []);
        doc.append_text(nav, "some words");
        let mut scores = CandidateScores::default();
        scores.add(nav, -12.0);
        assert_eq!(select_candidate(&doc, root, &scores).unwrap(), body);

        let empty = CandidateScores::default();
        assert_eq!(select_candidate(&doc, root, &empty).unwrap(), body);
    }

    #[test]
    fn missing_or_empty_body_is_content_not_found() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_element(root, "div", []);
        let err = select_candidate(&doc, root, &CandidateScores::default()).unwrap_err();
        assert!(matches!(err, Error::ContentNotFound));

        let mut doc = Document::new();
        let root = doc.root();
        let body = doc.append_element(root, "body", []);
        doc.append_text(body, "   \n ");
        let err = select_candidate(&doc, root, &CandidateScores::default()).unwrap_err();
        assert!(matches!(err, Error::ContentNotFound));
    }
}
