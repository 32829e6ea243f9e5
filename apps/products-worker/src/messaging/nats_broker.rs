//! NATS transport for product commands

use super::{MessageBroker, MessageStream, ReceivedMessage};
use async_nats::{Client, ConnectOptions, Subscriber};
use async_trait::async_trait;
use core_config::nats::NatsConfig;
use eyre::{Result, WrapErr};
use futures::StreamExt;
use tracing::{debug, info, instrument};

/// Command broker backed by a single NATS client connection
pub struct NatsBroker {
    client: Client,
}

impl NatsBroker {
    /// Connect to `config.url`, announcing `config.client_name` to the server
    pub async fn connect(config: &NatsConfig) -> Result<Self> {
        let client = ConnectOptions::new()
            .name(&config.client_name)
            .connect(config.url.as_str())
            .await
            .wrap_err_with(|| format!("Failed to connect to NATS at {}", config.url))?;

        info!(url = %config.url, client_name = %config.client_name, "Connected to NATS");
        Ok(Self { client })
    }

    /// Push any buffered replies to the server before shutdown
    pub async fn flush(&self) -> Result<()> {
        self.client
            .flush()
            .await
            .wrap_err("Failed to flush pending replies")
    }
}

#[async_trait]
impl MessageBroker for NatsBroker {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn publish_raw(&self, subject: &str, payload: &[u8]) -> Result<()> {
        self.client
            .publish(subject.to_string(), payload.to_vec().into())
            .await
            .wrap_err_with(|| format!("Failed to publish to {subject}"))?;

        debug!("Reply published");
        Ok(())
    }

    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Box<dyn MessageStream>> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .wrap_err_with(|| format!("Failed to join queue group {queue_group} on {subject}"))?;

        debug!(subject, queue_group, "Joined queue group");
        Ok(Box::new(CommandSubscription { subscriber }))
    }
}

/// One command subject's share of the queue group
struct CommandSubscription {
    subscriber: Subscriber,
}

#[async_trait]
impl MessageStream for CommandSubscription {
    async fn next(&mut self) -> Option<ReceivedMessage> {
        let message = self.subscriber.next().await?;

        Some(ReceivedMessage {
            subject: message.subject.to_string(),
            payload: message.payload.to_vec(),
            reply: message.reply.map(|reply| reply.to_string()),
        })
    }
}
