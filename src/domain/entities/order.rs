use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order visibility state. Both transitions are allowed and neither is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Active,
    Archived,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a status string is neither `active` nor `archived`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status '{}', expected active or archived", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(OrderStatus::Active),
            "archived" => Ok(OrderStatus::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Cargo dimensions in centimetres. Either all three are known or none is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Dimensions {
    /// Builds the triple only when every side is present.
    pub fn from_parts(length: Option<f64>, width: Option<f64>, height: Option<f64>) -> Option<Self> {
        match (length, width, height) {
            (Some(length_cm), Some(width_cm), Some(height_cm)) => Some(Self {
                length_cm,
                width_cm,
                height_cm,
            }),
            _ => None,
        }
    }
}

/// One end of a route: a weak city reference plus free-text address.
///
/// An address with no city is the "plain text" location form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub city_uuid: Option<Uuid>,
    /// Denormalized from `cities` at read time.
    pub city_name: Option<String>,
    pub address: Option<String>,
}

impl RoutePoint {
    pub fn new(city: Option<&super::City>, address: Option<String>) -> Self {
        Self {
            city_uuid: city.map(|c| c.uuid),
            city_name: city.map(|c| c.name.clone()),
            address,
        }
    }
}

/// Customer display fields joined onto an order at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
    pub telegram_id: Option<i64>,
    pub telegram_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub uuid: Uuid,
    pub customer_uuid: Uuid,
    pub title: String,
    pub description: String,
    pub weight_kg: f64,
    pub dimensions: Option<Dimensions>,
    pub from: RoutePoint,
    pub to: RoutePoint,
    pub tags: Vec<String>,
    pub price: f64,
    pub available_from: Option<NaiveDate>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub customer: Option<CustomerContact>,
}

impl Order {
    /// First eight characters of the UUID, used as a human-friendly reference.
    pub fn short_id(&self) -> String {
        short_uuid(&self.uuid)
    }
}

pub fn short_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Fields accepted by `OrderService::create_order`, with city references
/// already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_uuid: Uuid,
    pub title: String,
    pub description: String,
    pub weight_kg: f64,
    pub dimensions: Option<Dimensions>,
    pub from: RoutePoint,
    pub to: RoutePoint,
    pub tags: Vec<String>,
    pub price: f64,
    pub available_from: Option<NaiveDate>,
}

/// An order as typed into chat: cities are referenced by name and still need
/// resolving.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderRequest {
    pub title: String,
    pub description: String,
    pub weight_kg: f64,
    pub dimensions: Option<Dimensions>,
    pub from_city_name: Option<String>,
    pub from_address: Option<String>,
    pub to_city_name: Option<String>,
    pub to_address: Option<String>,
    pub tags: Vec<String>,
    pub price: f64,
    pub available_from: Option<NaiveDate>,
    pub customer_uuid: Uuid,
}

/// Order counters shown by the admin `/status` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderStats {
    pub total: usize,
    pub active: usize,
    pub archived: usize,
}
