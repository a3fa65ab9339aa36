//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod repository;

pub use bot::{Bot, BotInfo};
pub use repository::{CityRepository, CustomerRepository, DriverRepository, OrderRepository};
