//! Domain entities - Core business objects with no external dependencies

pub mod city;
pub mod customer;
pub mod driver;
pub mod message;
pub mod order;
pub mod user;

pub use city::City;
pub use customer::{Customer, NewCustomer};
pub use driver::{
    CityChange, CityRef, CityUpdate, Driver, DriverSettingsRequest, DriverUpdate,
    DEFAULT_NOTIFICATIONS_ENABLED,
};
pub use message::{Message, Reply, ReplyKeyboard};
pub use order::{
    short_uuid, CreateOrderRequest, CustomerContact, Dimensions, NewOrder, Order, OrderStats,
    OrderStatus, RoutePoint, UnknownStatus,
};
pub use user::User;
