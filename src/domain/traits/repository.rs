//! Persistence capabilities, one trait per entity.
//!
//! Every call is one storage round trip. Lookups that find nothing return
//! `Ok(None)`; updates report how many rows they touched.

use uuid::Uuid;

use crate::application::errors::StorageError;
use crate::domain::entities::{City, Customer, Driver, DriverUpdate, Order, OrderStatus};

pub trait OrderRepository: Send + Sync {
    fn create_order(&self, order: &Order) -> Result<(), StorageError>;
    /// All orders, newest first, with customer and city names joined.
    fn get_all_orders(&self) -> Result<Vec<Order>, StorageError>;
    fn get_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError>;
    /// Inclusive bounds; a `None` bound is unconstrained.
    fn get_orders_by_weight_range(&self, min: Option<f64>, max: Option<f64>) -> Result<Vec<Order>, StorageError>;
    fn count_orders(&self) -> Result<usize, StorageError>;
    fn count_orders_by_status(&self, status: OrderStatus) -> Result<usize, StorageError>;
    fn update_order_status(&self, order_uuid: Uuid, status: OrderStatus) -> Result<usize, StorageError>;
}

pub trait CustomerRepository: Send + Sync {
    fn create_customer(&self, customer: &Customer) -> Result<(), StorageError>;
    fn get_customer_by_uuid(&self, uuid: Uuid) -> Result<Option<Customer>, StorageError>;
    fn get_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, StorageError>;
    fn get_customer_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>, StorageError>;
    fn get_all_customers(&self) -> Result<Vec<Customer>, StorageError>;
    fn count_customers(&self) -> Result<usize, StorageError>;
}

pub trait DriverRepository: Send + Sync {
    fn create_driver(&self, driver: &Driver) -> Result<(), StorageError>;
    fn get_driver_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Driver>, StorageError>;
    fn get_all_drivers(&self) -> Result<Vec<Driver>, StorageError>;
    fn count_drivers(&self) -> Result<usize, StorageError>;
    /// Applies city and notification changes in one statement.
    fn update_driver(&self, driver_uuid: Uuid, update: DriverUpdate) -> Result<usize, StorageError>;
}

pub trait CityRepository: Send + Sync {
    fn get_city_by_name(&self, name: &str) -> Result<Option<City>, StorageError>;
}
