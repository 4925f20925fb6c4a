use axum::{http::header, http::StatusCode, routing::get, Router};
use std::net::SocketAddr;

const PAGE: &str = r#"<html><head><title>Tide tables</title>
<meta property="og:title" content="Tide tables explained">
<meta property="og:image" content="/img/tide.png"></head>
<body><nav><a href="/">Home</a></nav>
<article><p>Tide tables list the times and heights of high and low water, day by day, for a given port.</p>
<p>See the <a href="/ports">list of ports</a> for more.</p></article></body></html>"#;

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route(
            "/tides",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], PAGE) }),
        )
        .route(
            "/down",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn run(args: Vec<String>, cache_dir: std::path::PathBuf) -> std::process::Output {
    let bin = assert_cmd::cargo::cargo_bin!("readweb");
    tokio::task::spawn_blocking(move || {
        std::process::Command::new(bin)
            .args(&args)
            .env("READWEB_CACHE_DIR", &cache_dir)
            .env_remove("READWEB_ENV_FILE")
            .output()
            .expect("run readweb")
    })
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn scrape_fetches_and_extracts_then_hits_cache() {
    let addr = serve().await;
    let tmp = tempfile::tempdir().unwrap();
    let url = format!("http://{addr}/tides");

    let out = run(vec!["scrape".into(), url.clone()], tmp.path().to_path_buf()).await;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["url"], url.as_str());
    let md = v["content"].as_str().unwrap();
    assert!(md.contains("Tide tables list the times"), "{md}");
    assert!(md.contains(&format!("[list of ports](http://{addr}/ports)")), "{md}");
    assert!(!md.contains("Home"), "{md}");

    // The page cache directory now holds one entry (meta + body).
    let mut files = 0;
    for shard in std::fs::read_dir(tmp.path()).unwrap().flatten() {
        for sub in std::fs::read_dir(shard.path()).unwrap().flatten() {
            files += std::fs::read_dir(sub.path()).unwrap().count();
        }
    }
    assert_eq!(files, 2);

    let again = run(
        vec!["scrape".into(), url.clone(), "--output".into(), "text".into()],
        tmp.path().to_path_buf(),
    )
    .await;
    assert!(again.status.success());
    assert_eq!(String::from_utf8_lossy(&again.stdout).trim(), md);
}

#[tokio::test(flavor = "multi_thread")]
async fn scrape_fails_on_error_status() {
    let addr = serve().await;
    let tmp = tempfile::tempdir().unwrap();
    let out = run(
        vec!["scrape".into(), format!("http://{addr}/down"), "--no-cache".into()],
        tmp.path().to_path_buf(),
    )
    .await;
    assert!(!out.status.success());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("url returned status: 503"), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn metadata_reports_open_graph_fields() {
    let addr = serve().await;
    let tmp = tempfile::tempdir().unwrap();
    let out = run(
        vec!["metadata".into(), format!("http://{addr}/tides")],
        tmp.path().to_path_buf(),
    )
    .await;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["title"], "Tide tables explained");
    assert_eq!(v["image_url"], "/img/tide.png");
    assert_eq!(v["content_type"], "image/png");
    assert_eq!(v["provider"], "127");
}
