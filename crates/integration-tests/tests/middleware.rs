mod harness;

use harness::config::ConfigBuilder;
use harness::server::TestServer;
use showtracker_config::{AnyOrList, CorsConfig};

#[tokio::test]
async fn cors_allows_configured_origin() {
    let config = ConfigBuilder::new()
        .with_cors(CorsConfig {
            origins: AnyOrList::List(vec!["http://localhost:3000".to_owned()]),
            methods: AnyOrList::Any,
            headers: AnyOrList::Any,
            credentials: false,
            max_age: None,
        })
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}

#[tokio::test]
async fn cors_ignores_unlisted_origin() {
    let config = ConfigBuilder::new()
        .with_cors(CorsConfig {
            origins: AnyOrList::List(vec!["http://localhost:3000".to_owned()]),
            ..CorsConfig::default()
        })
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/health"))
        .header("Origin", "http://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn cors_wildcard_allows_any_origin() {
    let config = ConfigBuilder::new().with_cors(CorsConfig::default()).build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/health"))
        .header("Origin", "http://anywhere.example")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(resp.headers().get("access-control-allow-origin").is_some());
}

#[tokio::test]
async fn cors_headers_on_error_responses() {
    let config = ConfigBuilder::new()
        .with_cors(CorsConfig {
            origins: AnyOrList::List(vec!["http://localhost:3000".to_owned()]),
            credentials: true,
            ..CorsConfig::default()
        })
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/api/library/movies"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    assert_eq!(
        resp.headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn preflight_is_answered() {
    let config = ConfigBuilder::new()
        .with_cors(CorsConfig {
            origins: AnyOrList::List(vec!["http://localhost:3000".to_owned()]),
            max_age: Some(600),
            ..CorsConfig::default()
        })
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .request(reqwest::Method::OPTIONS, server.url("/api/library/movies"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("access-control-max-age").and_then(|v| v.to_str().ok()),
        Some("600")
    );
}
