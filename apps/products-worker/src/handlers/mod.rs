//! Handlers for processing NATS messages

mod product_commands;

pub use product_commands::ProductCommandHandler;

use crate::messaging::ReceivedMessage;
use async_trait::async_trait;
use eyre::Result;

/// Reply sent when a request names no known command
pub const NO_MATCHING_HANDLER: &str =
    "There is no matching message handler defined in the remote service.";

/// Trait for message handlers
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming message
    async fn handle(&self, message: ReceivedMessage) -> Result<()>;
}
