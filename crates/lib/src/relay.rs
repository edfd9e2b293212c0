//! Relay orchestrator: rate-limit gate, the `model` list command, Gemini
//! generation, sanitize, chunked send.

use crate::channels::{send_chunked, ChatSender, MAX_MESSAGE_CHUNK_LEN};
use crate::limiter::{limit_for, RateLimiter};
use crate::llm::{GeminiClient, GeminiModel};
use crate::sanitize::sanitize;
use tokio::sync::Mutex;

/// Appended to every prompt so the reply renders in Telegram's HTML mode.
const FORMAT_INSTRUCTION: &str = "\n\nYou must always format your response with HTML syntax and use only these HTML tags: <b>,<i>,<u>,<s>,<a>,<code>,<pre>,<blockquote>. Do not use any other HTML tags. Do not respond with the whole HTML page code, only the content.";

/// Literal command that lists available models instead of generating.
const LIST_MODELS_COMMAND: &str = "model";

/// Handle one authorized user message: list models when the text is the
/// `model` command, otherwise generate a reply. All outcomes (rate limit,
/// provider error, generated text) are reported to the chat; nothing is
/// returned to the caller because the webhook response has already gone out.
pub async fn handle_query(
    gemini: &GeminiClient,
    sender: &dyn ChatSender,
    limiter: &Mutex<RateLimiter>,
    model: &str,
    chat_id: i64,
    user_text: &str,
) {
    let allowed = limiter.lock().await.try_acquire(model);
    if !allowed {
        let notice = format!(
            "Rate limit exceeded {}/minute. Please try again later.",
            limit_for(model)
        );
        log::warn!("{}", notice);
        send_chunked(sender, chat_id, &notice, false, MAX_MESSAGE_CHUNK_LEN).await;
        return;
    }

    if user_text == LIST_MODELS_COMMAND {
        let report = match gemini.list_models().await {
            Ok(models) => format_model_list(&models),
            Err(e) => {
                log::error!("model listing failed: {}", e);
                format!("An error occurred: {}", e)
            }
        };
        send_chunked(sender, chat_id, &sanitize(&report), false, MAX_MESSAGE_CHUNK_LEN).await;
        return;
    }

    let prompt = format!("{}{}", user_text, FORMAT_INSTRUCTION);
    match gemini.generate(model, &prompt).await {
        Ok(res) => {
            let reply = format!(
                "{}\n\nAnswered with: {}\nSend 'model' to list available models.",
                res.text(),
                model
            );
            if reply.len() > 1 {
                send_chunked(sender, chat_id, &sanitize(&reply), true, MAX_MESSAGE_CHUNK_LEN)
                    .await;
            }
        }
        Err(e) => {
            log::error!("gemini generation failed: {}", e);
            let notice = format!("An error occurred: {}", e);
            send_chunked(sender, chat_id, &notice, false, MAX_MESSAGE_CHUNK_LEN).await;
        }
    }
}

/// Human-readable model listing: name, code, description, and token limits
/// per entry, with a usage hint on top.
pub fn format_model_list(models: &[GeminiModel]) -> String {
    if models.is_empty() {
        return "Error occurred while trying to fetch models".to_string();
    }
    let mut out = String::new();
    for model in models {
        out.push_str(&format!("Model name: {}\n", model.display_name));
        out.push_str(&format!("<b>Model code:</b><code>{}</code>\n", model.code()));
        out.push_str(&format!("• Model descriptions: {}\n", model.description));
        out.push_str(&format!("• Input Token Limit: {}\n", model.input_token_limit));
        out.push_str(&format!(
            "• Output Token Limit: {}\n--------\n",
            model.output_token_limit
        ));
    }
    format!(
        "You can set a new model for the bot by sending: model model_code\n--------\n{}",
        out.trim()
    )
}
