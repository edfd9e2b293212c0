//! Inbound message from a channel: delivered to the dispatcher for routing.

/// A message from Telegram to be routed to the model command or the relay.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub username: String,
    pub text: String,
}
