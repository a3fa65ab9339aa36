//! Application services - Business logic orchestration

pub mod customer_service;
pub mod driver_service;
pub mod message_service;
pub mod order_service;

pub use customer_service::CustomerService;
pub use driver_service::DriverService;
pub use message_service::MessageService;
pub use order_service::OrderService;

use std::sync::Arc;

use crate::domain::traits::{CityRepository, CustomerRepository, DriverRepository, OrderRepository};

/// The three domain services, sharing one store.
#[derive(Clone)]
pub struct Services {
    pub orders: Arc<OrderService>,
    pub customers: Arc<CustomerService>,
    pub drivers: Arc<DriverService>,
}

impl Services {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: OrderRepository + CustomerRepository + DriverRepository + CityRepository + 'static,
    {
        Self {
            orders: Arc::new(OrderService::new(store.clone(), store.clone(), store.clone())),
            customers: Arc::new(CustomerService::new(store.clone())),
            drivers: Arc::new(DriverService::new(store.clone(), store)),
        }
    }
}
