//! Product command handler implementation

use super::{MessageHandler, NO_MATCHING_HANDLER};
use crate::messaging::{
    MessageBroker, MessageStream, ReceivedMessage, RequestPacket, ResponsePacket,
};
use async_trait::async_trait;
use domain_products::{
    MessagePattern, ProductCommand, ProductRepository, ProductService, RpcError, dispatch,
};
use eyre::Result;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// Answers product commands arriving on their pattern subjects
pub struct ProductCommandHandler<B: MessageBroker, R: ProductRepository> {
    broker: Arc<B>,
    service: ProductService<R>,
    queue_group: String,
}

impl<B: MessageBroker, R: ProductRepository> Clone for ProductCommandHandler<B, R> {
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
            service: self.service.clone(),
            queue_group: self.queue_group.clone(),
        }
    }
}

impl<B, R> ProductCommandHandler<B, R>
where
    B: MessageBroker + 'static,
    R: ProductRepository + 'static,
{
    pub fn new(broker: Arc<B>, service: ProductService<R>, queue_group: impl Into<String>) -> Self {
        Self {
            broker,
            service,
            queue_group: queue_group.into(),
        }
    }

    /// Subscribe to every command subject and serve until all subscriptions close
    ///
    /// Messages are handled concurrently; a slow request does not hold back later ones
    /// on the same subject.
    pub async fn run(&self) -> Result<()> {
        let mut subscriptions = JoinSet::new();

        for command in ProductCommand::ALL {
            let subject = command.subject();
            let stream = self
                .broker
                .queue_subscribe(&subject, &self.queue_group)
                .await?;

            subscriptions.spawn(self.clone().serve(subject, stream));
        }

        info!(
            commands = ?ProductCommand::ALL,
            queue_group = %self.queue_group,
            "Product command handler started"
        );

        while let Some(joined) = subscriptions.join_next().await {
            match joined {
                Ok(subject) => warn!(subject = %subject, "Subscription closed"),
                Err(e) => error!(error = %e, "Subscription task failed"),
            }
        }

        Ok(())
    }

    /// Spawn one task per message; waits for in-flight requests once the stream ends
    async fn serve(self, subject: String, mut stream: Box<dyn MessageStream>) -> String {
        let mut in_flight = JoinSet::new();

        while let Some(msg) = stream.next().await {
            let handler = self.clone();
            in_flight.spawn(async move {
                if let Err(e) = handler.handle(msg).await {
                    error!(error = %e, "Failed to handle message");
                }
            });

            while let Some(done) = in_flight.try_join_next() {
                if let Err(e) = done {
                    error!(error = %e, "Request task failed");
                }
            }
        }

        while let Some(done) = in_flight.join_next().await {
            if let Err(e) = done {
                error!(error = %e, "Request task failed");
            }
        }

        subject
    }

    /// `pattern.cmd` wins over the subject when both are present
    fn resolve_command(subject: &str, packet: &RequestPacket) -> Option<ProductCommand> {
        match &packet.pattern {
            Some(pattern) => serde_json::from_value::<MessagePattern>(pattern.clone())
                .ok()
                .map(|p| p.cmd),
            None => ProductCommand::from_subject(subject),
        }
    }

    async fn respond(&self, reply: Option<String>, response: ResponsePacket) -> Result<()> {
        match reply {
            Some(reply) => self.broker.reply(&reply, &response).await,
            None => {
                debug!(id = ?response.id, "No reply subject, dropping response");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl<B, R> MessageHandler for ProductCommandHandler<B, R>
where
    B: MessageBroker + 'static,
    R: ProductRepository + 'static,
{
    #[instrument(skip(self, msg), fields(subject = %msg.subject))]
    async fn handle(&self, msg: ReceivedMessage) -> Result<()> {
        let packet: RequestPacket = match msg.parse_payload() {
            Ok(packet) => packet,
            Err(e) => {
                warn!(error = %e, "Malformed request packet");
                let err = RpcError::bad_request(format!("Malformed request packet: {e}"));
                return self.respond(msg.reply, ResponsePacket::failure(None, err)).await;
            }
        };

        let id = packet.id.clone();
        let response = match Self::resolve_command(&msg.subject, &packet) {
            Some(command) => match dispatch(&self.service, command, packet.data).await {
                Ok(value) => {
                    debug!(command = %command, "Command succeeded");
                    ResponsePacket::success(id, value)
                }
                Err(err) => {
                    info!(command = %command, status = ?err.status, message = %err.message, "Command failed");
                    ResponsePacket::failure(id, err)
                }
            },
            None => {
                warn!(pattern = ?packet.pattern, "No handler for pattern");
                ResponsePacket::failure(id, RpcError::new(NO_MATCHING_HANDLER))
            }
        };

        self.respond(msg.reply, response).await
    }
}
