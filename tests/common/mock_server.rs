//! Mock HTTP endpoint helpers for integration tests
//!
//! Wraps a `wiremock` server that behaves like the create/list endpoint the
//! HTTP remote talks to.

use quote_sync::app::remote::HttpRemote;
use quote_sync::shared::AppConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const POSTS_PATH: &str = "/posts";

/// Foreign record as served by the endpoint
pub fn post(id: u64, title: &str, body: &str) -> Value {
    json!({ "id": id, "userId": 1, "title": title, "body": body })
}

/// `count` foreign records with ids starting at 1
pub fn posts(count: u64) -> Value {
    Value::Array(
        (1..=count)
            .map(|i| post(i, &format!("title {}", i), &format!("cat{} rest of body", i)))
            .collect(),
    )
}

/// Start a server answering `GET /posts` with `records`
pub async fn mock_posts_server(records: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(POSTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(&server)
        .await;
    server
}

/// HTTP remote pointed at the mock server
pub fn remote_for(server: &MockServer) -> HttpRemote {
    let config = AppConfig::builder()
        .endpoint(format!("{}{}", server.uri(), POSTS_PATH))
        .request_timeout_secs(2)
        .build()
        .expect("mock endpoint config is valid");
    HttpRemote::new(&config).expect("build http remote")
}
