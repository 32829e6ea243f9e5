//! Products Worker
//!
//! Serves the product catalog over NATS request/reply. Each command listens on its
//! pattern subject (`{"cmd":"create"}`, `{"cmd":"findAll"}`, ...) inside a shared queue
//! group, so several instances split the load.

pub mod config;
pub mod handlers;
pub mod messaging;
