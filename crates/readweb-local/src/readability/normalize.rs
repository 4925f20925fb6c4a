fn is_empty_heading(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '#')
}

fn collapse_inline_ws(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev_blank = false;
    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            if !prev_blank {
                out.push(' ');
            }
            prev_blank = true;
        } else {
            out.push(ch);
            prev_blank = false;
        }
    }
    out
}

/// Tidy raw Markdown: trim every line, drop heading markers with no text,
/// squeeze runs of spaces/tabs, keep at most one blank line between blocks,
/// and trim the whole document.
///
/// Idempotent: `normalize_markdown(normalize_markdown(x)) == normalize_markdown(x)`.
pub fn normalize_markdown(raw: &str) -> String {
    let lines: Vec<String> = raw
        .split('\n')
        .map(str::trim)
        .filter(|l| !is_empty_heading(l))
        .map(collapse_inline_ws)
        .collect();
    let joined = lines.join("\n");

    let mut out = String::with_capacity(joined.len());
    let mut newlines = 0usize;
    for ch in joined.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push('\n');
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn drops_empty_headers_and_collapses_blank_lines() {
        let raw = "\n# Title \n\n## \n\n\n\nPara  one \t here \n### \nnext \n\n\n\n- item ";
        assert_eq!(
            normalize_markdown(raw),
            "# Title\n\nPara one here\nnext\n\n- item"
        );
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        assert_eq!(normalize_markdown(" \n\t\n \r\n"), "");
        assert_eq!(normalize_markdown("#\n##\n"), "");
    }

    #[test]
    fn keeps_heading_with_text() {
        assert_eq!(normalize_markdown("\n## Sub \n"), "## Sub");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[a-c#\\- \t\r\n]{0,80}") {
            let once = normalize_markdown(&raw);
            prop_assert_eq!(normalize_markdown(&once), once.clone());
        }

        #[test]
        fn normalize_never_leaves_triple_newlines(raw in any::<String>()) {
            let out = normalize_markdown(&raw);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert_eq!(normalize_markdown(&out), out.clone());
        }
    }
}
