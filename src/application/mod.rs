//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: order, customer and driver rules plus the bot message loop
//! - Errors: parse, service, storage, transport and config errors
//! - Messaging: command parsing, dispatching and reply formatting

pub mod errors;
pub mod messaging;
pub mod services;
