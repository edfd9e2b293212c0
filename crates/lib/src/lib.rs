//! Gemgram core library — config, Telegram channel, Gemini client,
//! sanitizer, rate limiter, and the relay gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod limiter;
pub mod llm;
pub mod relay;
pub mod sanitize;
