use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::errors::{ServiceError, StorageError};
use crate::domain::entities::{Customer, NewCustomer};
use crate::domain::traits::CustomerRepository;

/// Customer registration and listings
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerRepository>) -> Self {
        Self { customers }
    }

    /// Create a customer. Phone and telegram id must both be unused.
    pub fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer, ServiceError> {
        let name = new_customer.name.trim();
        let phone = new_customer.phone.trim();
        if name.is_empty() {
            return Err(ServiceError::EmptyField("name"));
        }
        if phone.is_empty() {
            return Err(ServiceError::EmptyField("phone"));
        }

        if self.customers.get_customer_by_phone(phone)?.is_some() {
            return Err(ServiceError::DuplicatePhone(phone.to_string()));
        }
        if let Some(telegram_id) = new_customer.telegram_id {
            if self.customers.get_customer_by_telegram_id(telegram_id)?.is_some() {
                return Err(ServiceError::DuplicateTelegramId(telegram_id));
            }
        }

        let customer = Customer {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            phone: phone.to_string(),
            telegram_id: new_customer.telegram_id,
            telegram_tag: new_customer.telegram_tag.filter(|t| !t.trim().is_empty()),
            created_at: Utc::now(),
        };

        match self.customers.create_customer(&customer) {
            Ok(()) => {}
            // Lost a race against a concurrent insert of the same key
            Err(StorageError::Conflict(detail)) if detail.contains("telegram_id") => {
                return Err(ServiceError::DuplicateTelegramId(customer.telegram_id.unwrap_or_default()));
            }
            Err(StorageError::Conflict(_)) => return Err(ServiceError::DuplicatePhone(customer.phone)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(customer = %customer.uuid, "Customer created");
        Ok(customer)
    }

    pub fn get_all_customers(&self) -> Result<Vec<Customer>, ServiceError> {
        Ok(self.customers.get_all_customers()?)
    }

    pub fn count_customers(&self) -> Result<usize, ServiceError> {
        Ok(self.customers.count_customers()?)
    }
}
