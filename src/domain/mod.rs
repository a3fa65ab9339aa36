//! Domain layer - Core business objects and the seams to infrastructure
//!
//! This layer contains:
//! - Entities: Order, Customer, Driver, City and the chat message types
//! - Traits: Abstractions for infrastructure (Bot, repositories)

pub mod entities;
pub mod traits;
