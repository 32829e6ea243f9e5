//! Configuration for the products worker

use core_config::{ConfigError, Environment, FromEnv, env_parse, nats::NatsConfig};
use database::postgres::PostgresConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: PostgresConfig,
    pub nats: NatsConfig,
    /// Apply pending migrations before subscribing (`RUN_MIGRATIONS`)
    pub run_migrations: bool,
}

impl FromEnv for Config {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            environment: Environment::from_env(),
            database: PostgresConfig::from_env()?,
            nats: NatsConfig::from_env()?,
            run_migrations: env_parse("RUN_MIGRATIONS", true)?,
        })
    }
}
