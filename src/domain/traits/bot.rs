use async_trait::async_trait;
use crate::domain::entities::{Message, ReplyKeyboard};
use crate::application::errors::BotError;

/// Bot trait - abstraction for chat transports (Telegram, console)
#[async_trait]
pub trait Bot: Send + Sync {
    /// Connect to the platform and report who we are
    async fn start(&self) -> Result<BotInfo, BotError>;

    /// Wait for the next batch of inbound text messages, in arrival order.
    /// An empty batch means the wait timed out.
    async fn next_messages(&self) -> Result<Vec<Message>, BotError>;

    /// Send a plain text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError>;

    /// Send a message with a reply keyboard
    async fn send_with_keyboard(&self, chat_id: i64, text: &str, keyboard: &ReplyKeyboard) -> Result<(), BotError>;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
