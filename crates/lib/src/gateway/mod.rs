//! Gateway: webhook HTTP server and request dispatcher.

mod server;

pub use server::{run_gateway, GatewayState};
