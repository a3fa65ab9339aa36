//! Message handling - Parsing, routing and rendering of chat messages

pub mod dispatcher;
pub mod formatter;
pub mod keyboards;
pub mod parser;

pub use dispatcher::{AdminDispatcher, DriverDispatcher, MessageHandler};
pub use parser::{parse_command, AdminCommand, CommandKey};
