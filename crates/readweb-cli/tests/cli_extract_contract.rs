use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn extract_file_prints_article_markdown_json() {
    let out = Command::new(assert_cmd::cargo::cargo_bin!("readweb"))
        .args(["extract", "--base-url", "https://blog.example.com/notes/coast"])
        .arg("--file")
        .arg(fixture("article.html"))
        .env_remove("READWEB_ENV_FILE")
        .output()
        .expect("run readweb extract");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(v["url"], "https://blog.example.com/notes/coast");
    assert!(v.get("error").is_none());
    let md = v["content"].as_str().unwrap();
    assert!(md.starts_with("# Field notes from the coast"), "{md}");
    assert!(md.contains("\n\n## Equipment"), "{md}");
    assert!(md.contains("- Binoculars\n- Notebook"), "{md}");
    assert!(
        md.contains("[checked the map](https://blog.example.com/maps/dunes)"),
        "{md}"
    );
    for noise in ["Home", "Archive", "Other walks", "Copyright", "tracking"] {
        assert!(!md.contains(noise), "{noise} leaked into: {md}");
    }
    assert!(!md.contains("\n\n\n"));
}

#[test]
fn extract_stdin_text_output() {
    Command::new(assert_cmd::cargo::cargo_bin!("readweb"))
        .args(["extract", "--output", "text", "--base-url", "https://example.com/page"])
        .write_stdin(
            r#"<html><body><nav>Home About</nav><article><p>Lorem ipsum dolor sit amet, consectetur adipiscing elit, totaling at least ten words here. <a href="/x">Read more</a></p></article></body></html>"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("Lorem ipsum dolor sit amet"))
        .stdout(predicate::str::contains("[Read more](https://example.com/x)"))
        .stdout(predicate::str::contains("Home About").not());
}

#[test]
fn extract_without_content_prints_empty_content() {
    let out = Command::new(assert_cmd::cargo::cargo_bin!("readweb"))
        .args(["extract"])
        .write_stdin(r#"<html><body><div id="sidebar">just a sidebar</div></body></html>"#)
        .output()
        .expect("run readweb extract");
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert_eq!(v["content"], "");
}
