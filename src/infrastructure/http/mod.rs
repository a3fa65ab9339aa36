//! HTTP read API
//!
//! `GET /v1/orders` lists orders for the public website, optionally filtered
//! by weight. Responses allow any origin.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::application::errors::ServiceError;
use crate::application::messaging::formatter::{
    format_date, format_dimensions, format_location, format_tags, NOT_SPECIFIED,
};
use crate::application::services::OrderService;
use crate::domain::entities::Order;

/// Errors returned by the API handlers
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_storage() {
            tracing::error!(error = %err, "Order query failed");
            ApiError::Internal
        } else {
            ApiError::BadRequest(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub min_weight: Option<String>,
    pub max_weight: Option<String>,
}

/// An order as shown on the website
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub customer: Option<String>,
    pub phone: Option<String>,
    /// Route line
    pub from: String,
    /// Address line
    pub to: String,
    pub weight: f64,
    pub dimensions: String,
    pub tags: String,
    pub price: f64,
    pub date: String,
    pub status: String,
    pub uuid: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let location = format_location(&order.from, &order.to);
        Self {
            id: order.short_id(),
            title: order.title.clone(),
            description: order.description.clone(),
            customer: order.customer.as_ref().map(|c| c.name.clone()),
            phone: order.customer.as_ref().map(|c| c.phone.clone()),
            from: location.route,
            to: location.addresses,
            weight: order.weight_kg,
            dimensions: format_dimensions(order.dimensions.as_ref()),
            tags: format_tags(&order.tags),
            price: order.price,
            date: order
                .available_from
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            status: order.status.to_string(),
            uuid: order.uuid.to_string(),
        }
    }
}

fn parse_weight(field: &str, value: Option<&str>) -> Result<Option<f64>, ApiError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match value.parse::<f64>() {
        Ok(weight) if weight.is_finite() => Ok(Some(weight)),
        _ => Err(ApiError::BadRequest(format!("invalid {} '{}'", field, value))),
    }
}

async fn get_orders(
    State(orders): State<Arc<OrderService>>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let min = parse_weight("min_weight", query.min_weight.as_deref())?;
    let max = parse_weight("max_weight", query.max_weight.as_deref())?;
    tracing::debug!(?min, ?max, "GET /v1/orders");

    let result = tokio::task::spawn_blocking(move || orders.get_orders_by_weight_range(min, max))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Order query task failed");
            ApiError::Internal
        })?;

    let orders = result?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

pub fn router(orders: Arc<OrderService>) -> Router {
    Router::new()
        .route("/v1/orders", get(get_orders))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(orders)
}

/// Serve until `shutdown` flips to `true`.
pub async fn serve(
    addr: SocketAddr,
    orders: Arc<OrderService>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP API listening");
    axum::serve(listener, router(orders))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;
    tracing::info!("HTTP API stopped");
    Ok(())
}
