//! Main-content extraction ("readability") rendered as Markdown.
//!
//! Pipeline: clean → score → select → render → normalize. Every stage runs
//! over one [`Document`] that the cleaner mutates, so each call needs its own
//! tree.

pub mod clean;
pub mod normalize;
pub mod render;
pub mod score;
pub mod select;

use crate::dom::Document;
use readweb_core::Result;

pub use clean::clean_dom;
pub use normalize::normalize_markdown;
pub use render::{render_markdown, resolve_href};
pub use score::{
    link_density, node_score, score_candidates, text_stats, CandidateScores, TextStats,
};
pub use select::select_candidate;

/// Extract the main content of `doc` as normalized Markdown.
///
/// Relative links resolve against `base_url`. Fails with
/// `Error::ContentNotFound` when neither a candidate nor a non-empty `body`
/// exists.
pub fn extract_main_content(doc: &mut Document, base_url: &str) -> Result<String> {
    let root = doc.root();
    let removed = clean_dom(doc, root);
    let scores = score_candidates(doc, root);
    tracing::debug!(removed, candidates = scores.len(), "scored document");
    let top = select_candidate(doc, root, &scores)?;
    let raw = render_markdown(doc, top, base_url);
    Ok(normalize_markdown(&raw))
}

/// Parse `html` into a fresh tree and extract its main content.
pub fn extract_markdown(html: &str, base_url: &str) -> Result<String> {
    let mut doc = Document::parse(html);
    extract_main_content(&mut doc, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use readweb_core::Error;

    const ARTICLE_PAGE: &str = "<html><body><nav>Home About</nav><article><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit, totaling at least ten words here.</p></article></body></html>";

    #[test]
    fn article_wins_over_navigation() {
        let md = extract_markdown(ARTICLE_PAGE, "https://example.com/").unwrap();
        assert!(
            md.contains("Lorem ipsum dolor sit amet, consectetur adipiscing elit, totaling at least ten words here."),
            "{md}"
        );
        assert!(!md.contains("Home About"), "{md}");
    }

    #[test]
    fn extraction_is_deterministic() {
        let html = r#"<html><body>
            <div class="content"><h1>Headline</h1>
              <p>First paragraph, with commas, and enough words to count as prose for sure.</p>
              <p>Second paragraph with <a href="/more">a link</a> and more than ten words in it.</p>
            </div>
            <div class="links"><a href="/1">one</a> <a href="/2">two</a></div>
        </body></html>"#;
        let first = extract_markdown(html, "https://example.com/post").unwrap();
        for _ in 0..5 {
            assert_eq!(extract_markdown(html, "https://example.com/post").unwrap(), first);
        }
        assert!(first.starts_with("# Headline"), "{first}");
        assert!(first.contains("[a link](https://example.com/more)"), "{first}");
        assert!(!first.contains("\n\n\n"));
    }

    #[test]
    fn sidebar_only_page_is_content_not_found() {
        let html = r#"<html><body><div id="sidebar">one two three four five six seven eight nine ten eleven</div></body></html>"#;
        let err = extract_markdown(html, "").unwrap_err();
        assert!(matches!(err, Error::ContentNotFound), "{err:?}");
    }

    #[test]
    fn short_page_falls_back_to_body() {
        let html = r#"<html><body><div id="sidebar">junk</div><p>Just a short note.</p></body></html>"#;
        assert_eq!(extract_markdown(html, "").unwrap(), "Just a short note.");
    }

    #[test]
    fn tie_selects_first_candidate_in_document_order() {
        let para = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let html = format!(
            "<html><body><p>{para} first</p><p>{para} again</p></body></html>"
        );
        let md = extract_markdown(&html, "").unwrap();
        assert_eq!(md, format!("{para} first"));
    }

    #[test]
    fn long_link_text_renders_without_brackets() {
        let long = "lengthy ".repeat(40);
        let html = format!(
            r#"<html><body><article><p>Intro words that make this paragraph long enough to score well. <a href="/x">{long}</a></p></article></body></html>"#
        );
        let md = extract_markdown(&html, "https://example.com/page").unwrap();
        assert!(md.contains("lengthy lengthy"), "{md}");
        assert!(!md.contains("]("), "{md}");
    }

    #[test]
    fn cleaner_mutates_the_tree_passed_in() {
        let mut doc = Document::parse(ARTICLE_PAGE);
        let nav = doc.find_first(doc.root(), "nav").unwrap();
        extract_main_content(&mut doc, "").unwrap();
        assert!(!doc.is_attached(nav));
    }

    #[test]
    fn deeply_nested_page_extracts_quickly() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut cur = doc.append_element(root, "html", []);
        cur = doc.append_element(cur, "body", []);
        for _ in 0..20_000 {
            cur = doc.append_element(cur, "div", []);
        }
        doc.append_text(cur, "a leaf paragraph with just enough words to count here");

        let started = std::time::Instant::now();
        let md = extract_main_content(&mut doc, "").unwrap();
        let elapsed = started.elapsed();
        assert!(
            elapsed < std::time::Duration::from_secs(3),
            "extraction took {elapsed:?}"
        );
        assert_eq!(md, "a leaf paragraph with just enough words to count here");
    }
}
