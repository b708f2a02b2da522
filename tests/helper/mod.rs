//! GitHub contents API test utilities

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mockito::{Matcher, Mock, ServerGuard};

use package_track::TrackerOptions;

pub fn tracker_options(server: &ServerGuard) -> TrackerOptions {
    TrackerOptions::new("https://github.com/acme/widget.git").api_base_url(server.url())
}

pub fn package_json(version: &str) -> String {
    format!(
        r#"{{
            "name": "widget",
            "version": "{}",
            "dependencies": {{"left-pad": "^1.3.0"}},
            "devDependencies": {{"vitest": "^1.0.0"}}
        }}"#,
        version
    )
}

/// Wraps a file the way the contents API does without raw negotiation
pub fn contents_envelope(file: &str) -> String {
    serde_json::json!({
        "type": "file",
        "encoding": "base64",
        "path": "package.json",
        "content": STANDARD.encode(file),
    })
    .to_string()
}

pub async fn mock_contents(
    server: &mut ServerGuard,
    branch: &str,
    status: usize,
    body: &str,
    hits: usize,
) -> Mock {
    server
        .mock("GET", "/repos/acme/widget/contents/package.json")
        .match_query(Matcher::UrlEncoded("ref".into(), branch.into()))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}
