//! Command router for the products message patterns
//!
//! Callers address the service with a pattern such as `{"cmd":"findOne"}` plus a JSON
//! payload. [`dispatch`] decodes the payload for the command, runs the matching
//! [`ProductService`] operation and encodes the outcome.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::instrument;

use crate::error::RpcError;
use crate::models::{CreateProduct, Pagination, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// Commands accepted by the products service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ProductCommand {
    Create,
    FindAll,
    FindOne,
    Update,
    Remove,
}

impl ProductCommand {
    pub const ALL: [ProductCommand; 5] = [
        ProductCommand::Create,
        ProductCommand::FindAll,
        ProductCommand::FindOne,
        ProductCommand::Update,
        ProductCommand::Remove,
    ];

    pub fn pattern(self) -> MessagePattern {
        MessagePattern { cmd: self }
    }

    /// Subject the command is published on: its serialised pattern
    pub fn subject(self) -> String {
        format!(r#"{{"cmd":"{self}"}}"#)
    }

    pub fn from_subject(subject: &str) -> Option<Self> {
        serde_json::from_str::<MessagePattern>(subject)
            .ok()
            .map(|pattern| pattern.cmd)
    }
}

/// Pattern object identifying a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePattern {
    pub cmd: ProductCommand,
}

/// Accepts `7` as well as `"7"`
fn deserialize_id<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    let raw = match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n,
        RawId::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("id must be numeric, got {s:?}")))?,
    };

    i32::try_from(raw).map_err(|_| de::Error::custom(format!("id {raw} is out of range")))
}

#[derive(Debug, Deserialize)]
struct IdPayload {
    #[serde(deserialize_with = "deserialize_id")]
    id: i32,
}

#[derive(Debug, Deserialize)]
struct UpdatePayload {
    #[serde(deserialize_with = "deserialize_id")]
    id: i32,
    #[serde(flatten)]
    changes: UpdateProduct,
}

fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, RpcError> {
    serde_json::from_value(payload).map_err(|e| RpcError::bad_request(e.to_string()))
}

fn encode<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to encode response");
        RpcError::with_status(500, "Internal server error")
    })
}

/// `findOne` and `remove` take `{"id": ..}` or a bare id
fn decode_id(payload: Value) -> Result<i32, RpcError> {
    match payload {
        Value::Object(_) => decode::<IdPayload>(payload).map(|p| p.id),
        bare => decode::<IdPayload>(serde_json::json!({ "id": bare })).map(|p| p.id),
    }
}

/// Run `command` against `service`
#[instrument(skip(service, payload))]
pub async fn dispatch<R: ProductRepository>(
    service: &ProductService<R>,
    command: ProductCommand,
    payload: Value,
) -> Result<Value, RpcError> {
    match command {
        ProductCommand::Create => {
            let input: CreateProduct = decode(payload)?;
            encode(service.create_product(input).await?)
        }
        ProductCommand::FindAll => {
            let pagination = match payload {
                Value::Null => Pagination::default(),
                payload => decode(payload)?,
            };
            encode(service.list_products(pagination).await?)
        }
        ProductCommand::FindOne => {
            let id = decode_id(payload)?;
            encode(service.get_product(id).await?)
        }
        ProductCommand::Update => {
            let UpdatePayload { id, changes } = decode(payload)?;
            encode(service.update_product(id, changes).await?)
        }
        ProductCommand::Remove => {
            let id = decode_id(payload)?;
            encode(service.remove_product(id).await?)
        }
    }
}
