//! Outbound delivery: word-respecting chunking and the sender seam.

use async_trait::async_trait;

/// Soft per-message limit. Telegram's hard sendMessage limit is 4096
/// characters; 3800 leaves headroom for entity expansion.
pub const MAX_MESSAGE_CHUNK_LEN: usize = 3800;

/// Delivers one message chunk to a chat. Implemented by [`super::TelegramChannel`]
/// in production and by recording fakes in tests.
#[async_trait]
pub trait ChatSender: Send + Sync {
    /// Send one chunk. `html` requests Telegram's HTML parse mode.
    async fn send_chunk(&self, chat_id: i64, text: &str, html: bool) -> Result<(), String>;
}

/// Split text into word-aligned chunks of at most `max_len` characters.
/// Words are delimited by spaces only, so embedded newlines survive inside a
/// chunk and multi-line formatting is preserved. A single word longer than
/// `max_len` is emitted alone, never split.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for word in text.split(' ').filter(|w| !w.is_empty()) {
        if !current.is_empty() && current.len() + word.len() + 1 > max_len {
            close_chunk(&mut chunks, std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    close_chunk(&mut chunks, current);
    chunks
}

/// Trim a finished chunk and keep it unless empty.
fn close_chunk(chunks: &mut Vec<String>, chunk: String) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Send `text` to a chat, chunked to `max_len`. Chunks go out in order;
/// a failed chunk is logged and does not stop the rest.
pub async fn send_chunked(
    sender: &dyn ChatSender,
    chat_id: i64,
    text: &str,
    html: bool,
    max_len: usize,
) {
    for chunk in split_chunks(text, max_len) {
        if let Err(e) = sender.send_chunk(chat_id, &chunk, html).await {
            log::error!("failed to send message chunk: {}", e);
        }
    }
}
