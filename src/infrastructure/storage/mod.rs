//! In-memory storage implementation
//!
//! Backs the repository traits with plain vectors. Used by the console dev
//! mode and by tests; enforces the same unique keys as the SQLite schema.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::application::errors::StorageError;
use crate::domain::entities::{
    City, CityRef, CityUpdate, Customer, CustomerContact, Driver, DriverUpdate, Order, OrderStatus,
};
use crate::domain::traits::{CityRepository, CustomerRepository, DriverRepository, OrderRepository};

#[derive(Default)]
struct Tables {
    cities: Vec<City>,
    customers: Vec<Customer>,
    drivers: Vec<Driver>,
    orders: Vec<Order>,
}

impl Tables {
    fn city_name(&self, uuid: Option<Uuid>) -> Option<String> {
        let uuid = uuid?;
        self.cities.iter().find(|c| c.uuid == uuid).map(|c| c.name.clone())
    }

    /// Fill the denormalized read-time fields, like the SQL joins do.
    fn hydrate(&self, order: &Order) -> Order {
        let mut order = order.clone();
        order.from.city_name = self.city_name(order.from.city_uuid);
        order.to.city_name = self.city_name(order.to.city_uuid);
        order.customer = self
            .customers
            .iter()
            .find(|c| c.uuid == order.customer_uuid)
            .map(|c| CustomerContact {
                name: c.name.clone(),
                phone: c.phone.clone(),
                telegram_id: c.telegram_id,
                telegram_tag: c.telegram_tag.clone(),
            });
        order
    }

    /// Newest first; insertion order breaks ties.
    fn orders_where(&self, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .rev()
            .filter(|o| keep(o))
            .map(|o| self.hydrate(o))
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given city names already present.
    pub fn with_cities<S: AsRef<str>>(names: &[S]) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.write() {
            tables.cities = names.iter().map(|n| City::new(n.as_ref())).collect();
        }
        store
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|e| StorageError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl OrderRepository for InMemoryStore {
    fn create_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        if tables.orders.iter().any(|o| o.uuid == order.uuid) {
            return Err(StorageError::Conflict(format!("orders.uuid {}", order.uuid)));
        }
        let mut stored = order.clone();
        stored.customer = None;
        tables.orders.push(stored);
        Ok(())
    }

    fn get_all_orders(&self) -> Result<Vec<Order>, StorageError> {
        Ok(self.read()?.orders_where(|_| true))
    }

    fn get_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError> {
        Ok(self.read()?.orders_where(|o| o.status == status))
    }

    fn get_orders_by_weight_range(&self, min: Option<f64>, max: Option<f64>) -> Result<Vec<Order>, StorageError> {
        Ok(self.read()?.orders_where(|o| {
            min.map_or(true, |min| o.weight_kg >= min) && max.map_or(true, |max| o.weight_kg <= max)
        }))
    }

    fn count_orders(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.orders.len())
    }

    fn count_orders_by_status(&self, status: OrderStatus) -> Result<usize, StorageError> {
        Ok(self.read()?.orders.iter().filter(|o| o.status == status).count())
    }

    fn update_order_status(&self, order_uuid: Uuid, status: OrderStatus) -> Result<usize, StorageError> {
        let mut tables = self.write()?;
        match tables.orders.iter_mut().find(|o| o.uuid == order_uuid) {
            Some(order) => {
                order.status = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl CustomerRepository for InMemoryStore {
    fn create_customer(&self, customer: &Customer) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        if tables.customers.iter().any(|c| c.phone == customer.phone) {
            return Err(StorageError::Conflict(format!("customers.phone {}", customer.phone)));
        }
        if let Some(id) = customer.telegram_id {
            if tables.customers.iter().any(|c| c.telegram_id == Some(id)) {
                return Err(StorageError::Conflict(format!("customers.telegram_id {}", id)));
            }
        }
        tables.customers.push(customer.clone());
        Ok(())
    }

    fn get_customer_by_uuid(&self, uuid: Uuid) -> Result<Option<Customer>, StorageError> {
        Ok(self.read()?.customers.iter().find(|c| c.uuid == uuid).cloned())
    }

    fn get_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, StorageError> {
        Ok(self.read()?.customers.iter().find(|c| c.phone == phone).cloned())
    }

    fn get_customer_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>, StorageError> {
        Ok(self
            .read()?
            .customers
            .iter()
            .find(|c| c.telegram_id == Some(telegram_id))
            .cloned())
    }

    fn get_all_customers(&self) -> Result<Vec<Customer>, StorageError> {
        let mut customers = self.read()?.customers.clone();
        customers.reverse();
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    fn count_customers(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.customers.len())
    }
}

impl DriverRepository for InMemoryStore {
    fn create_driver(&self, driver: &Driver) -> Result<(), StorageError> {
        let mut tables = self.write()?;
        if tables.drivers.iter().any(|d| d.telegram_id == driver.telegram_id) {
            return Err(StorageError::Conflict(format!("drivers.telegram_id {}", driver.telegram_id)));
        }
        tables.drivers.push(driver.clone());
        Ok(())
    }

    fn get_driver_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Driver>, StorageError> {
        Ok(self
            .read()?
            .drivers
            .iter()
            .find(|d| d.telegram_id == telegram_id)
            .cloned())
    }

    fn get_all_drivers(&self) -> Result<Vec<Driver>, StorageError> {
        let mut drivers = self.read()?.drivers.clone();
        drivers.reverse();
        drivers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(drivers)
    }

    fn count_drivers(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.drivers.len())
    }

    fn update_driver(&self, driver_uuid: Uuid, update: DriverUpdate) -> Result<usize, StorageError> {
        let mut tables = self.write()?;
        let city = match update.city {
            CityUpdate::Keep => None,
            CityUpdate::Clear => Some(None),
            CityUpdate::Set(uuid) => {
                let name = tables.city_name(Some(uuid)).unwrap_or_default();
                Some(Some(CityRef { uuid, name }))
            }
        };
        let Some(driver) = tables.drivers.iter_mut().find(|d| d.uuid == driver_uuid) else {
            return Ok(0);
        };
        if let Some(city) = city {
            driver.city = city;
        }
        if let Some(enabled) = update.notification_enabled {
            driver.notification_enabled = enabled;
        }
        Ok(1)
    }
}

impl CityRepository for InMemoryStore {
    fn get_city_by_name(&self, name: &str) -> Result<Option<City>, StorageError> {
        Ok(self.read()?.cities.iter().find(|c| c.name == name).cloned())
    }
}
