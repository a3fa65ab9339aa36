use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::errors::ServiceError;
use crate::domain::entities::{
    City, CreateOrderRequest, NewOrder, Order, OrderStats, OrderStatus, RoutePoint,
};
use crate::domain::traits::{CityRepository, CustomerRepository, OrderRepository};

/// Order lifecycle: creation, status changes and listings
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerRepository>,
    cities: Arc<dyn CityRepository>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerRepository>,
        cities: Arc<dyn CityRepository>,
    ) -> Self {
        Self {
            orders,
            customers,
            cities,
        }
    }

    /// Validate and persist a new active order.
    pub fn create_order(&self, new_order: NewOrder) -> Result<Order, ServiceError> {
        validate_order(&new_order)?;

        if self.customers.get_customer_by_uuid(new_order.customer_uuid)?.is_none() {
            return Err(ServiceError::CustomerNotFound(new_order.customer_uuid));
        }

        let order = Order {
            uuid: Uuid::new_v4(),
            customer_uuid: new_order.customer_uuid,
            title: new_order.title,
            description: new_order.description,
            weight_kg: new_order.weight_kg,
            dimensions: new_order.dimensions,
            from: new_order.from,
            to: new_order.to,
            tags: new_order.tags,
            price: new_order.price,
            available_from: new_order.available_from,
            status: OrderStatus::Active,
            created_at: Utc::now(),
            customer: None,
        };

        self.orders.create_order(&order)?;
        tracing::info!(order = %order.uuid, customer = %order.customer_uuid, "Order created");
        Ok(order)
    }

    /// Resolve city names, then create. Nothing is written if a city is unknown.
    pub fn create_order_from_request(&self, request: CreateOrderRequest) -> Result<Order, ServiceError> {
        let from_city = self.resolve_city(request.from_city_name.as_deref())?;
        let to_city = self.resolve_city(request.to_city_name.as_deref())?;

        self.create_order(NewOrder {
            customer_uuid: request.customer_uuid,
            title: request.title,
            description: request.description,
            weight_kg: request.weight_kg,
            dimensions: request.dimensions,
            from: RoutePoint::new(from_city.as_ref(), request.from_address),
            to: RoutePoint::new(to_city.as_ref(), request.to_address),
            tags: request.tags,
            price: request.price,
            available_from: request.available_from,
        })
    }

    /// Set the status. Re-setting the current status is a no-op success and an
    /// unknown UUID affects nothing.
    pub fn update_order_status(&self, order_uuid: Uuid, status: OrderStatus) -> Result<(), ServiceError> {
        let rows = self.orders.update_order_status(order_uuid, status)?;
        if rows == 0 {
            tracing::warn!(order = %order_uuid, %status, "Status update matched no order");
        } else {
            tracing::info!(order = %order_uuid, %status, "Order status updated");
        }
        Ok(())
    }

    /// Same as [`update_order_status`](Self::update_order_status) with the
    /// status given as text.
    pub fn update_order_status_str(&self, order_uuid: Uuid, status: &str) -> Result<(), ServiceError> {
        let status: OrderStatus = status.parse()?;
        self.update_order_status(order_uuid, status)
    }

    /// Orders with `min <= weight <= max`. Omitted bounds are unconstrained.
    pub fn get_orders_by_weight_range(&self, min: Option<f64>, max: Option<f64>) -> Result<Vec<Order>, ServiceError> {
        for (field, bound) in [("min_weight", min), ("max_weight", max)] {
            if let Some(value) = bound {
                if value < 0.0 {
                    return Err(ServiceError::NegativeBound { field, value });
                }
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(ServiceError::InvalidWeightRange { min, max });
            }
        }

        match (min, max) {
            (None, None) => self.get_all_orders(),
            _ => Ok(self.orders.get_orders_by_weight_range(min, max)?),
        }
    }

    pub fn get_all_orders(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.get_all_orders()?)
    }

    pub fn get_active_orders(&self) -> Result<Vec<Order>, ServiceError> {
        self.get_orders_by_status(OrderStatus::Active)
    }

    pub fn get_orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ServiceError> {
        Ok(self.orders.get_orders_by_status(status)?)
    }

    pub fn order_stats(&self) -> Result<OrderStats, ServiceError> {
        Ok(OrderStats {
            total: self.orders.count_orders()?,
            active: self.orders.count_orders_by_status(OrderStatus::Active)?,
            archived: self.orders.count_orders_by_status(OrderStatus::Archived)?,
        })
    }

    fn resolve_city(&self, name: Option<&str>) -> Result<Option<City>, ServiceError> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        match self.cities.get_city_by_name(name)? {
            Some(city) => Ok(Some(city)),
            None => Err(ServiceError::CityNotFound(name.to_string())),
        }
    }
}

fn validate_order(order: &NewOrder) -> Result<(), ServiceError> {
    if order.title.trim().is_empty() {
        return Err(ServiceError::EmptyField("title"));
    }
    if order.description.trim().is_empty() {
        return Err(ServiceError::EmptyField("description"));
    }
    positive("weight", order.weight_kg)?;
    positive("price", order.price)?;
    if let Some(dims) = &order.dimensions {
        positive("length", dims.length_cm)?;
        positive("width", dims.width_cm)?;
        positive("height", dims.height_cm)?;
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ServiceError> {
    // NaN fails this check too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ServiceError::NonPositive { field, value })
    }
}
