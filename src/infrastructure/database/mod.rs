//! SQLite storage
//!
//! One connection behind a mutex. Every repository call is a single
//! statement, so concurrent callers never observe half-applied updates.

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::application::errors::StorageError;
use crate::domain::entities::{
    City, CityRef, CityUpdate, Customer, CustomerContact, Dimensions, Driver, DriverUpdate, Order,
    OrderStatus, RoutePoint,
};
use crate::domain::traits::{CityRepository, CustomerRepository, DriverRepository, OrderRepository};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS cities (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS customers (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT NOT NULL UNIQUE,
    telegram_id INTEGER UNIQUE,
    telegram_tag TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS drivers (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    telegram_id INTEGER NOT NULL UNIQUE,
    telegram_tag TEXT,
    city_uuid TEXT REFERENCES cities(uuid) ON DELETE SET NULL,
    notification_enabled INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    uuid TEXT PRIMARY KEY,
    customer_uuid TEXT NOT NULL REFERENCES customers(uuid),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
    length_cm REAL,
    width_cm REAL,
    height_cm REAL,
    from_city_uuid TEXT REFERENCES cities(uuid) ON DELETE SET NULL,
    from_address TEXT,
    to_city_uuid TEXT REFERENCES cities(uuid) ON DELETE SET NULL,
    to_address TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    price REAL NOT NULL CHECK (price > 0),
    available_from TEXT,
    status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'archived')),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
CREATE INDEX IF NOT EXISTS idx_orders_weight ON orders(weight_kg);
";

const ORDER_SELECT: &str = "
SELECT o.uuid, o.customer_uuid, o.title, o.description, o.weight_kg,
       o.length_cm, o.width_cm, o.height_cm,
       o.from_city_uuid, fc.name, o.from_address,
       o.to_city_uuid, tc.name, o.to_address,
       o.tags, o.price, o.available_from, o.status, o.created_at,
       c.name, c.phone, c.telegram_id, c.telegram_tag
FROM orders o
LEFT JOIN customers c ON c.uuid = o.customer_uuid
LEFT JOIN cities fc ON fc.uuid = o.from_city_uuid
LEFT JOIN cities tc ON tc.uuid = o.to_city_uuid";

const ORDER_ORDER_BY: &str = "ORDER BY o.created_at DESC, o.rowid DESC";

const CUSTOMER_SELECT: &str =
    "SELECT uuid, name, phone, telegram_id, telegram_tag, created_at FROM customers";

const DRIVER_SELECT: &str = "
SELECT d.uuid, d.name, d.telegram_id, d.telegram_tag, d.city_uuid, ci.name,
       d.notification_enabled, d.created_at
FROM drivers d
LEFT JOIN cities ci ON ci.uuid = d.city_uuid";

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Insert the named cities that are not present yet. Returns how many
    /// were added.
    pub fn seed_cities<S: AsRef<str>>(&self, names: &[S]) -> Result<usize, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("INSERT OR IGNORE INTO cities (uuid, name) VALUES (?1, ?2)")?;
        let mut added = 0;
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            added += stmt.execute(params![Uuid::new_v4().to_string(), name])?;
        }
        Ok(added)
    }

    fn query_orders(&self, filter: &str, params: impl rusqlite::Params) -> Result<Vec<Order>, StorageError> {
        let conn = self.conn()?;
        let sql = format!("{} {} {}", ORDER_SELECT, filter, ORDER_ORDER_BY);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params, order_from_row)?;
        let mut orders = Vec::new();
        for order in rows {
            orders.push(order?);
        }
        Ok(orders)
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> Result<usize, StorageError> {
        let count: i64 = self.conn()?.query_row(sql, params, |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

/// Unique and primary key violations become `Conflict`; the rest pass through.
fn map_write_err(e: rusqlite::Error) -> StorageError {
    match &e {
        rusqlite::Error::SqliteFailure(err, message)
            if err.code == ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
        {
            StorageError::Conflict(message.clone().unwrap_or_else(|| e.to_string()))
        }
        _ => StorageError::Sqlite(e),
    }
}

fn conversion_err(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text).map_err(|e| conversion_err(idx, e))
}

fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| Uuid::parse_str(&t).map_err(|e| conversion_err(idx, e)))
        .transpose()
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let tags: String = row.get(14)?;
    let tags: Vec<String> = serde_json::from_str(&tags).map_err(|e| conversion_err(14, e))?;
    let status: String = row.get(17)?;
    let status: OrderStatus = status.parse().map_err(|e| conversion_err(17, e))?;
    let customer_name: Option<String> = row.get(19)?;

    Ok(Order {
        uuid: uuid_at(row, 0)?,
        customer_uuid: uuid_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        weight_kg: row.get(4)?,
        dimensions: Dimensions::from_parts(row.get(5)?, row.get(6)?, row.get(7)?),
        from: RoutePoint {
            city_uuid: opt_uuid_at(row, 8)?,
            city_name: row.get(9)?,
            address: row.get(10)?,
        },
        to: RoutePoint {
            city_uuid: opt_uuid_at(row, 11)?,
            city_name: row.get(12)?,
            address: row.get(13)?,
        },
        tags,
        price: row.get(15)?,
        available_from: row.get(16)?,
        status,
        created_at: row.get(18)?,
        customer: match customer_name {
            Some(name) => Some(CustomerContact {
                name,
                phone: row.get(20)?,
                telegram_id: row.get(21)?,
                telegram_tag: row.get(22)?,
            }),
            None => None,
        },
    })
}

fn customer_from_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        uuid: uuid_at(row, 0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        telegram_id: row.get(3)?,
        telegram_tag: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn driver_from_row(row: &Row<'_>) -> rusqlite::Result<Driver> {
    let city = match (opt_uuid_at(row, 4)?, row.get::<_, Option<String>>(5)?) {
        (Some(uuid), Some(name)) => Some(CityRef { uuid, name }),
        _ => None,
    };
    Ok(Driver {
        uuid: uuid_at(row, 0)?,
        name: row.get(1)?,
        telegram_id: row.get(2)?,
        telegram_tag: row.get(3)?,
        city,
        notification_enabled: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn city_from_row(row: &Row<'_>) -> rusqlite::Result<City> {
    Ok(City {
        uuid: uuid_at(row, 0)?,
        name: row.get(1)?,
    })
}

impl OrderRepository for Database {
    fn create_order(&self, order: &Order) -> Result<(), StorageError> {
        let tags = serde_json::to_string(&order.tags).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let dims = order.dimensions.as_ref();
        self.conn()?
            .execute(
                "INSERT INTO orders (uuid, customer_uuid, title, description, weight_kg,
                    length_cm, width_cm, height_cm, from_city_uuid, from_address,
                    to_city_uuid, to_address, tags, price, available_from, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    order.uuid.to_string(),
                    order.customer_uuid.to_string(),
                    order.title,
                    order.description,
                    order.weight_kg,
                    dims.map(|d| d.length_cm),
                    dims.map(|d| d.width_cm),
                    dims.map(|d| d.height_cm),
                    order.from.city_uuid.map(|u| u.to_string()),
                    order.from.address,
                    order.to.city_uuid.map(|u| u.to_string()),
                    order.to.address,
                    tags,
                    order.price,
                    order.available_from,
                    order.status.as_str(),
                    order.created_at,
                ],
            )
            .map_err(map_write_err)?;
        Ok(())
    }

    fn get_all_orders(&self) -> Result<Vec<Order>, StorageError> {
        self.query_orders("", [])
    }

    fn get_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StorageError> {
        self.query_orders("WHERE o.status = ?1", [status.as_str()])
    }

    fn get_orders_by_weight_range(&self, min: Option<f64>, max: Option<f64>) -> Result<Vec<Order>, StorageError> {
        self.query_orders(
            "WHERE (?1 IS NULL OR o.weight_kg >= ?1) AND (?2 IS NULL OR o.weight_kg <= ?2)",
            params![min, max],
        )
    }

    fn count_orders(&self) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM orders", [])
    }

    fn count_orders_by_status(&self, status: OrderStatus) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM orders WHERE status = ?1", [status.as_str()])
    }

    fn update_order_status(&self, order_uuid: Uuid, status: OrderStatus) -> Result<usize, StorageError> {
        Ok(self.conn()?.execute(
            "UPDATE orders SET status = ?1 WHERE uuid = ?2",
            params![status.as_str(), order_uuid.to_string()],
        )?)
    }
}

impl CustomerRepository for Database {
    fn create_customer(&self, customer: &Customer) -> Result<(), StorageError> {
        self.conn()?
            .execute(
                "INSERT INTO customers (uuid, name, phone, telegram_id, telegram_tag, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    customer.uuid.to_string(),
                    customer.name,
                    customer.phone,
                    customer.telegram_id,
                    customer.telegram_tag,
                    customer.created_at,
                ],
            )
            .map_err(map_write_err)?;
        Ok(())
    }

    fn get_customer_by_uuid(&self, uuid: Uuid) -> Result<Option<Customer>, StorageError> {
        let sql = format!("{} WHERE uuid = ?1", CUSTOMER_SELECT);
        Ok(self
            .conn()?
            .query_row(&sql, [uuid.to_string()], customer_from_row)
            .optional()?)
    }

    fn get_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, StorageError> {
        let sql = format!("{} WHERE phone = ?1", CUSTOMER_SELECT);
        Ok(self.conn()?.query_row(&sql, [phone], customer_from_row).optional()?)
    }

    fn get_customer_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Customer>, StorageError> {
        let sql = format!("{} WHERE telegram_id = ?1", CUSTOMER_SELECT);
        Ok(self
            .conn()?
            .query_row(&sql, [telegram_id], customer_from_row)
            .optional()?)
    }

    fn get_all_customers(&self) -> Result<Vec<Customer>, StorageError> {
        let conn = self.conn()?;
        let sql = format!("{} ORDER BY created_at DESC, rowid DESC", CUSTOMER_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], customer_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count_customers(&self) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM customers", [])
    }
}

impl DriverRepository for Database {
    fn create_driver(&self, driver: &Driver) -> Result<(), StorageError> {
        self.conn()?
            .execute(
                "INSERT INTO drivers (uuid, name, telegram_id, telegram_tag, city_uuid,
                    notification_enabled, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    driver.uuid.to_string(),
                    driver.name,
                    driver.telegram_id,
                    driver.telegram_tag,
                    driver.city.as_ref().map(|c| c.uuid.to_string()),
                    driver.notification_enabled,
                    driver.created_at,
                ],
            )
            .map_err(map_write_err)?;
        Ok(())
    }

    fn get_driver_by_telegram_id(&self, telegram_id: i64) -> Result<Option<Driver>, StorageError> {
        let sql = format!("{} WHERE d.telegram_id = ?1", DRIVER_SELECT);
        Ok(self
            .conn()?
            .query_row(&sql, [telegram_id], driver_from_row)
            .optional()?)
    }

    fn get_all_drivers(&self) -> Result<Vec<Driver>, StorageError> {
        let conn = self.conn()?;
        let sql = format!("{} ORDER BY d.created_at DESC, d.rowid DESC", DRIVER_SELECT);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], driver_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn count_drivers(&self) -> Result<usize, StorageError> {
        self.count("SELECT COUNT(*) FROM drivers", [])
    }

    fn update_driver(&self, driver_uuid: Uuid, update: DriverUpdate) -> Result<usize, StorageError> {
        let (mode, city_uuid) = match update.city {
            CityUpdate::Keep => ("keep", None),
            CityUpdate::Clear => ("clear", None),
            CityUpdate::Set(uuid) => ("set", Some(uuid.to_string())),
        };
        Ok(self.conn()?.execute(
            "UPDATE drivers SET
                city_uuid = CASE ?1 WHEN 'keep' THEN city_uuid WHEN 'clear' THEN NULL ELSE ?2 END,
                notification_enabled = COALESCE(?3, notification_enabled)
             WHERE uuid = ?4",
            params![mode, city_uuid, update.notification_enabled, driver_uuid.to_string()],
        )?)
    }
}

impl CityRepository for Database {
    fn get_city_by_name(&self, name: &str) -> Result<Option<City>, StorageError> {
        Ok(self
            .conn()?
            .query_row("SELECT uuid, name FROM cities WHERE name = ?1", [name], city_from_row)
            .optional()?)
    }
}
