//! Communication channels (Telegram).
//!
//! The `ChatSender` trait decouples the relay from the Telegram HTTP API so
//! tests can record outbound messages instead of delivering them.

mod inbound;
mod outbound;
mod telegram;

pub use inbound::InboundMessage;
pub use outbound::{send_chunked, split_chunks, ChatSender, MAX_MESSAGE_CHUNK_LEN};
pub use telegram::{TelegramChannel, TelegramUpdate};
