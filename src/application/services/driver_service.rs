use std::sync::Arc;

use uuid::Uuid;

use crate::application::errors::{ServiceError, StorageError};
use crate::domain::entities::{CityChange, CityUpdate, Driver, DriverUpdate};
use crate::domain::traits::{CityRepository, DriverRepository};

/// Driver registration and settings
pub struct DriverService {
    drivers: Arc<dyn DriverRepository>,
    cities: Arc<dyn CityRepository>,
}

impl DriverService {
    pub fn new(drivers: Arc<dyn DriverRepository>, cities: Arc<dyn CityRepository>) -> Self {
        Self { drivers, cities }
    }

    /// Fetch the driver for a telegram id, registering it on first contact.
    pub fn ensure_driver_exists_by_telegram(
        &self,
        name: &str,
        telegram_id: i64,
        telegram_tag: Option<String>,
    ) -> Result<Driver, ServiceError> {
        if let Some(driver) = self.drivers.get_driver_by_telegram_id(telegram_id)? {
            return Ok(driver);
        }

        let driver = Driver::register(name, telegram_id, telegram_tag);
        match self.drivers.create_driver(&driver) {
            Ok(()) => {
                tracing::info!(driver = %driver.uuid, telegram_id, "Driver registered");
                Ok(driver)
            }
            Err(StorageError::Conflict(_)) => {
                tracing::debug!(telegram_id, "Driver registered concurrently, re-reading");
                self.drivers
                    .get_driver_by_telegram_id(telegram_id)?
                    .ok_or_else(|| {
                        StorageError::Conflict(format!("drivers.telegram_id {}", telegram_id)).into()
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a city change and a notification flag in one update.
    ///
    /// A city name must resolve. An unknown driver UUID is not an error.
    pub fn update_driver_city_and_notifications(
        &self,
        driver_uuid: Uuid,
        city: CityChange,
        notification_enabled: Option<bool>,
    ) -> Result<(), ServiceError> {
        let city = match city {
            CityChange::Keep => CityUpdate::Keep,
            CityChange::Clear => CityUpdate::Clear,
            CityChange::Set(name) => match self.cities.get_city_by_name(name.trim())? {
                Some(city) => CityUpdate::Set(city.uuid),
                None => return Err(ServiceError::CityNotFound(name)),
            },
        };

        let update = DriverUpdate {
            city,
            notification_enabled,
        };
        if update.is_noop() {
            tracing::debug!(driver = %driver_uuid, "Nothing to update");
            return Ok(());
        }

        let rows = self.drivers.update_driver(driver_uuid, update)?;
        if rows == 0 {
            tracing::warn!(driver = %driver_uuid, "Driver update matched no driver");
        } else {
            tracing::info!(driver = %driver_uuid, ?update, "Driver updated");
        }
        Ok(())
    }

    pub fn get_all_drivers(&self) -> Result<Vec<Driver>, ServiceError> {
        Ok(self.drivers.get_all_drivers()?)
    }

    pub fn count_drivers(&self) -> Result<usize, ServiceError> {
        Ok(self.drivers.count_drivers()?)
    }
}
