use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seeded lookup entry; orders and drivers reference cities by name in chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub uuid: Uuid,
    pub name: String,
}

impl City {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
