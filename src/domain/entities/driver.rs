use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification flag given to drivers registered on first contact.
pub const DEFAULT_NOTIFICATIONS_ENABLED: bool = true;

/// City reference with the name denormalized at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRef {
    pub uuid: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub uuid: Uuid,
    pub name: String,
    pub telegram_id: i64,
    pub telegram_tag: Option<String>,
    pub city: Option<CityRef>,
    pub notification_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// A driver as created by the ensure-exists upsert: no city, default flag.
    pub fn register(name: impl Into<String>, telegram_id: i64, telegram_tag: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            telegram_id,
            telegram_tag,
            city: None,
            notification_enabled: DEFAULT_NOTIFICATIONS_ENABLED,
            created_at: Utc::now(),
        }
    }
}

/// What to do with a driver's city.
///
/// In chat an empty token keeps the city, `-` clears it and anything else is
/// a city name to look up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CityChange {
    #[default]
    Keep,
    Clear,
    Set(String),
}

impl CityChange {
    pub fn from_token(token: &str) -> Self {
        match token.trim() {
            "" => CityChange::Keep,
            "-" => CityChange::Clear,
            name => CityChange::Set(name.to_string()),
        }
    }
}

/// City change with the name already resolved; applied by the repository in
/// a single statement together with the notification flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CityUpdate {
    #[default]
    Keep,
    Clear,
    Set(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverUpdate {
    pub city: CityUpdate,
    pub notification_enabled: Option<bool>,
}

impl DriverUpdate {
    pub fn is_noop(&self) -> bool {
        self.city == CityUpdate::Keep && self.notification_enabled.is_none()
    }
}

/// Decoded `SET_CITY_AND_NOTIFICATION` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettingsRequest {
    pub driver_uuid: Uuid,
    pub city: CityChange,
    pub notification_enabled: Option<bool>,
}
