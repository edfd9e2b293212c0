//! Gateway HTTP server: Telegram webhook dispatcher and health probe.

use crate::channels::{
    send_chunked, ChatSender, InboundMessage, TelegramChannel, TelegramUpdate,
    MAX_MESSAGE_CHUNK_LEN,
};
use crate::config::{self, Config};
use crate::limiter::RateLimiter;
use crate::llm::GeminiClient;
use crate::relay;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Command prefix that lists models (exact) or switches the active one
/// (with an argument). Matched on the lowercased, trimmed message text.
const MODEL_COMMAND: &str = "model";

/// Shared state for the gateway. The active model and limiter counters are
/// process memory only; they reset on restart.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub sender: Arc<dyn ChatSender>,
    pub gemini: GeminiClient,
    /// Model used for generation; mutated by the `model <code>` command.
    pub active_model: Arc<RwLock<String>>,
    pub limiter: Arc<Mutex<RateLimiter>>,
}

impl GatewayState {
    pub fn new(config: Config, sender: Arc<dyn ChatSender>, gemini: GeminiClient) -> Self {
        let active_model = config::resolve_default_model(&config);
        Self {
            config: Arc::new(config),
            sender,
            gemini,
            active_model: Arc::new(RwLock::new(active_model)),
            limiter: Arc::new(Mutex::new(RateLimiter::new())),
        }
    }
}

fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/telegram/webhook", post(telegram_webhook))
        .with_state(state)
}

/// Run the gateway: register the Telegram webhook when configured, serve
/// until SIGINT/SIGTERM, then remove the webhook.
pub async fn run_gateway(config: Config) -> Result<()> {
    let telegram = Arc::new(TelegramChannel::new(config::resolve_telegram_token(&config)));
    let api_key = config::resolve_gemini_api_key(&config).unwrap_or_default();
    if api_key.is_empty() {
        log::warn!("gemini api key not configured; generation calls will fail");
    }
    let gemini = GeminiClient::new(api_key, None);

    let webhook_url = config.channels.telegram.webhook_url.clone();
    if let Some(ref url) = webhook_url {
        if let Err(e) = telegram.set_webhook(url).await {
            log::warn!("telegram setWebhook failed: {}", e);
        } else {
            log::info!("telegram webhook registered: {}", url);
        }
    }

    let state = GatewayState::new(config, telegram.clone(), gemini);
    let bind_addr = format!(
        "{}:{}",
        state.config.gateway.bind, state.config.gateway.port
    );
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    let telegram_for_shutdown = webhook_url.is_some().then_some(telegram);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(telegram_for_shutdown))
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// Removes the Telegram webhook when one was registered at startup.
async fn shutdown_signal(telegram_webhook: Option<Arc<TelegramChannel>>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");

    if let Some(t) = telegram_webhook {
        if let Err(e) = t.delete_webhook().await {
            log::debug!("telegram deleteWebhook on shutdown: {}", e);
        }
    }
}

/// POST /telegram/webhook — one inbound update. Always acknowledges before
/// the model call runs: real work is spawned and the 200 goes out first.
async fn telegram_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            log::error!("malformed webhook payload: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    // Non-message updates (edits, channel posts, ...) are ignored, not errors.
    let Some(msg) = update.message else {
        return ok();
    };
    let Some(text) = msg.text else {
        return ok();
    };
    let username = msg
        .from
        .and_then(|u| u.username)
        .unwrap_or_default();
    let inbound = InboundMessage {
        chat_id: msg.chat.id,
        username,
        text: text.trim().to_string(),
    };
    dispatch(state, inbound).await;
    ok()
}

/// Route one inbound message: silent drop for unauthorized senders, the
/// model switch command inline, everything else (prompts and the exact
/// `model` list command) to a background relay task.
async fn dispatch(state: GatewayState, msg: InboundMessage) {
    let allowed = state
        .config
        .channels
        .telegram
        .allowed_username
        .as_deref()
        .unwrap_or_default();
    if allowed.is_empty() || msg.username != allowed {
        // Do not reply: an unauthorized sender should not learn the bot exists.
        log::debug!("dropping message from unauthorized user: {}", msg.username);
        return;
    }

    let lower = msg.text.to_lowercase();
    if lower.starts_with(MODEL_COMMAND) && lower != MODEL_COMMAND {
        let new_model = msg.text[MODEL_COMMAND.len()..].trim().to_string();
        let old_model = {
            let mut active = state.active_model.write().await;
            std::mem::replace(&mut *active, new_model.clone())
        };
        log::info!("active model switched: {} -> {}", old_model, new_model);
        let notice = format!(
            "Current AI model: {}\n\nSuccessfully set to the new model: {}",
            old_model, new_model
        );
        let sender = state.sender.clone();
        tokio::spawn(async move {
            send_chunked(sender.as_ref(), msg.chat_id, &notice, true, MAX_MESSAGE_CHUNK_LEN)
                .await;
        });
        return;
    }

    let model = state.active_model.read().await.clone();
    tokio::spawn(async move {
        relay::handle_query(
            &state.gemini,
            state.sender.as_ref(),
            &state.limiter,
            &model,
            msg.chat_id,
            &msg.text,
        )
        .await;
    });
}

fn ok() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET / returns a simple health JSON (for probes); includes the active model.
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    let model = state.active_model.read().await.clone();
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "model": model,
    }))
}
