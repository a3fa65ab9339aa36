//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: YAML configuration with environment overrides
//! - Database: SQLite repositories
//! - Storage: in-memory repositories
//! - Adapters: chat transports (Telegram, console)
//! - Http: the read-only website API

pub mod adapters;
pub mod config;
pub mod database;
pub mod http;
pub mod storage;
