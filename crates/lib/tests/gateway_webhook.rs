//! Integration tests: start the gateway on a free port and drive the webhook
//! dispatcher over HTTP. No Telegram or Gemini credentials are configured, so
//! anything that would go out stays in the logs.

use lib::config::Config;
use lib::gateway;
use serde_json::json;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Boot a gateway with the given allowed username; returns its base URL.
async fn start_gateway(allowed_username: &str) -> String {
    let port = free_port();
    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    config.channels.telegram.allowed_username = Some(allowed_username.to_string());
    config.gemini.default_model = Some("gemini-1.5-flash-latest".to_string());

    tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&base).send().await {
            if resp.status().is_success() {
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway did not become healthy at {}", base);
}

fn update(username: &str, chat_id: i64, text: &str) -> serde_json::Value {
    json!({
        "update_id": 1,
        "message": {
            "from": { "username": username },
            "chat": { "id": chat_id },
            "text": text
        }
    })
}

#[tokio::test]
async fn health_reports_running_and_active_model() {
    let base = start_gateway("alice").await;
    let resp = reqwest::get(&base).await.expect("health request");
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.expect("health json");
    assert_eq!(body.get("runtime").and_then(|v| v.as_str()), Some("running"));
    assert_eq!(
        body.get("model").and_then(|v| v.as_str()),
        Some("gemini-1.5-flash-latest")
    );
}

#[tokio::test]
async fn malformed_json_returns_500_with_error_body() {
    let base = start_gateway("alice").await;
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.expect("error json");
    assert!(body.get("error").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn non_post_method_is_rejected() {
    let base = start_gateway("alice").await;
    let resp = reqwest::get(format!("{}/telegram/webhook", base))
        .await
        .expect("GET webhook");
    assert_eq!(resp.status().as_u16(), 405);
}

#[tokio::test]
async fn non_message_update_acknowledged() {
    let base = start_gateway("alice").await;
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .json(&json!({ "update_id": 2, "edited_message": { "x": 1 } }))
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn unauthorized_sender_is_silently_acknowledged() {
    let base = start_gateway("alice").await;
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .json(&update("mallory", 10, "model gemini-2.0-flash"))
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");

    // The unauthorized switch attempt must not have touched the active model.
    let body: serde_json::Value = reqwest::get(&base)
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(
        body.get("model").and_then(|v| v.as_str()),
        Some("gemini-1.5-flash-latest")
    );
}

#[tokio::test]
async fn model_switch_updates_active_model_and_acknowledges() {
    let base = start_gateway("alice").await;
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .json(&update("alice", 10, "model gemini-2.0-flash"))
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");

    let body: serde_json::Value = reqwest::get(&base)
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(
        body.get("model").and_then(|v| v.as_str()),
        Some("gemini-2.0-flash")
    );
}

#[tokio::test]
async fn bare_model_command_does_not_switch_active_model() {
    let base = start_gateway("alice").await;
    // Exactly "model" is the list command; it must not be parsed as a
    // switch to the empty string.
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .json(&update("alice", 10, "model"))
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");

    let body: serde_json::Value = reqwest::get(&base)
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(
        body.get("model").and_then(|v| v.as_str()),
        Some("gemini-1.5-flash-latest")
    );
}

#[tokio::test]
async fn model_switch_trims_whitespace_around_code() {
    let base = start_gateway("alice").await;
    let resp = reqwest::Client::new()
        .post(format!("{}/telegram/webhook", base))
        .json(&update("alice", 10, "  model   gemini-1.5-pro-latest  "))
        .send()
        .await
        .expect("webhook request");
    assert_eq!(resp.status().as_u16(), 200);

    let body: serde_json::Value = reqwest::get(&base)
        .await
        .expect("health")
        .json()
        .await
        .expect("health json");
    assert_eq!(
        body.get("model").and_then(|v| v.as_str()),
        Some("gemini-1.5-pro-latest")
    );
}
