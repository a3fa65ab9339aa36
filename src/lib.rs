//! dalnoboy - freight broker bots
//!
//! Customers' orders are entered through an admin chat bot, drivers browse
//! them through a driver bot, and a small HTTP API feeds the public website.

pub mod application;
pub mod domain;
pub mod infrastructure;
