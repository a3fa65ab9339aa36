//! Application layer errors

use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::UnknownStatus;

/// Chat transport errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Malformed command text. The message is shown to the admin verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("message is empty")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("invalid key, expected {expected}")]
    WrongKey { expected: &'static str },

    #[error("not enough data: {command} needs at least {expected} lines, got {got}")]
    NotEnoughLines {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("cannot parse {field} '{value}' as a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid {field} UUID '{value}'")]
    InvalidUuid { field: &'static str, value: String },

    #[error("unknown notification flag '{0}', use вкл/выкл, включить/выключить, true/false, 1/0 or on/off")]
    InvalidNotificationFlag(String),

    #[error("length, width and height must be given together or all left as '-'")]
    PartialDimensions,

    #[error("{command} requires an order UUID argument")]
    MissingArgument { command: &'static str },
}

/// Business rule violations and storage failures raised by the services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    NegativeBound { field: &'static str, value: f64 },

    #[error("min > max: min_weight {min} is greater than max_weight {max}")]
    InvalidWeightRange { min: f64, max: f64 },

    #[error("city not found: '{0}'")]
    CityNotFound(String),

    #[error("customer not found: {0}")]
    CustomerNotFound(Uuid),

    #[error("customer with phone {0} already exists")]
    DuplicatePhone(String),

    #[error("customer with telegram id {0} already exists")]
    DuplicateTelegramId(i64),

    #[error("{0}")]
    InvalidStatus(#[from] UnknownStatus),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn is_storage(&self) -> bool {
        matches!(self, ServiceError::Storage(_))
    }

    /// Text safe to show in chat or an HTTP body. Storage details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Storage(_) => "internal error, please try again later".to_string(),
            other => other.to_string(),
        }
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),
}

impl StorageError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict(_))
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
