//! Request/reply messaging for product commands
//!
//! Defines the packets exchanged with callers and the broker seam the command handler
//! is written against: NATS in production, an in-memory broker in tests.

mod nats_broker;

pub use nats_broker::NatsBroker;

use async_trait::async_trait;
use domain_products::{MessagePattern, RpcError};
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Request envelope sent by callers: `{"id", "pattern": {"cmd"}, "data"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPacket {
    /// Correlation id, echoed in the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Pattern object; when absent the subject identifies the command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Value>,
    #[serde(default)]
    pub data: Value,
}

impl RequestPacket {
    pub fn new(id: impl Into<String>, pattern: MessagePattern, data: Value) -> Self {
        Self {
            id: Some(id.into()),
            pattern: serde_json::to_value(pattern).ok(),
            data,
        }
    }
}

/// Reply envelope: exactly one of `response` or `err` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePacket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<RpcError>,
    pub is_disposed: bool,
}

impl ResponsePacket {
    pub fn success(id: Option<String>, response: Value) -> Self {
        Self {
            id,
            response: Some(response),
            err: None,
            is_disposed: true,
        }
    }

    pub fn failure(id: Option<String>, err: RpcError) -> Self {
        Self {
            id,
            response: None,
            err: Some(err),
            is_disposed: true,
        }
    }

    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.response.unwrap_or(Value::Null)),
        }
    }
}

/// Received message with metadata
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Subject/topic the message was received on
    pub subject: String,
    /// Raw payload bytes
    pub payload: Vec<u8>,
    /// Reply subject for request-reply patterns
    pub reply: Option<String>,
}

impl ReceivedMessage {
    /// Deserialize payload directly
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T> {
        let data: T = serde_json::from_slice(&self.payload)?;
        Ok(data)
    }
}

/// Broker operations the command worker relies on
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish raw bytes to a subject
    async fn publish_raw(&self, subject: &str, payload: &[u8]) -> Result<()>;

    /// Join `queue_group` on `subject`; each message goes to one member of the group
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Box<dyn MessageStream>>;

    /// Answer a request on its reply subject
    async fn reply(&self, reply_to: &str, response: &ResponsePacket) -> Result<()> {
        let payload = serde_json::to_vec(response).wrap_err("Failed to encode response")?;
        self.publish_raw(reply_to, &payload).await
    }
}

/// Stream of incoming messages
#[async_trait]
pub trait MessageStream: Send + Sync {
    /// Receive the next message (blocks until available)
    async fn next(&mut self) -> Option<ReceivedMessage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_products::ProductCommand;
    use serde_json::json;

    #[test]
    fn test_response_packet_wire_shape() {
        let ok = ResponsePacket::success(Some("7".to_string()), json!({ "id": 1 }));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "id": "7", "response": { "id": 1 }, "isDisposed": true })
        );

        let err = ResponsePacket::failure(
            Some("8".to_string()),
            RpcError::with_status(404, "Product with id #1 not found."),
        );
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "id": "8",
                "err": { "status": 404, "message": "Product with id #1 not found." },
                "isDisposed": true
            })
        );
    }

    #[test]
    fn test_request_packet_tolerates_missing_fields() {
        let packet: RequestPacket = serde_json::from_value(json!({})).unwrap();
        assert!(packet.id.is_none());
        assert!(packet.pattern.is_none());
        assert_eq!(packet.data, Value::Null);

        let packet = RequestPacket::new("1", ProductCommand::Remove.pattern(), json!({ "id": 3 }));
        assert_eq!(packet.pattern, Some(json!({ "cmd": "remove" })));
    }

    #[test]
    fn test_into_result_surfaces_err() {
        let packet = ResponsePacket::failure(None, RpcError::new("Error deleting product"));
        let err = packet.into_result().unwrap_err();
        assert_eq!(err.message, "Error deleting product");
        assert_eq!(err.status, None);
    }
}
