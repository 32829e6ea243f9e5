use crate::{ConfigError, FromEnv, env_or_default};

/// NATS connection and subscription settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NatsConfig {
    /// Server URL, e.g. `nats://localhost:4222`
    pub url: String,
    /// Queue group shared by all worker instances
    pub queue_group: String,
    /// Client name reported to the server
    pub client_name: String,
}

impl NatsConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            queue_group: "products-service".to_string(),
            client_name: "products-worker".to_string(),
        }
    }
}

impl FromEnv for NatsConfig {
    /// Reads `NATS_URL`, `NATS_QUEUE_GROUP`, `NATS_CLIENT_NAME`
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            url: env_or_default("NATS_URL", &defaults.url),
            queue_group: env_or_default("NATS_QUEUE_GROUP", &defaults.queue_group),
            client_name: env_or_default("NATS_CLIENT_NAME", &defaults.client_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nats_config_defaults() {
        temp_env::with_vars_unset(["NATS_URL", "NATS_QUEUE_GROUP", "NATS_CLIENT_NAME"], || {
            let config = NatsConfig::from_env().unwrap();
            assert_eq!(config, NatsConfig::default());
            assert_eq!(config.queue_group, "products-service");
        });
    }

    #[test]
    fn test_nats_config_overrides() {
        temp_env::with_vars(
            [
                ("NATS_URL", Some("nats://nats.internal:4222")),
                ("NATS_QUEUE_GROUP", Some("products-blue")),
            ],
            || {
                let config = NatsConfig::from_env().unwrap();
                assert_eq!(config.url, "nats://nats.internal:4222");
                assert_eq!(config.queue_group, "products-blue");
                assert_eq!(config.client_name, "products-worker");
            },
        );
    }
}
