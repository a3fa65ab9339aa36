use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Freight owner. Phone is unique, and so is the telegram id when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub uuid: Uuid,
    pub name: String,
    pub phone: String,
    pub telegram_id: Option<i64>,
    pub telegram_tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Customer fields as decoded from an `ADD_USER` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub telegram_id: Option<i64>,
    pub telegram_tag: Option<String>,
}
