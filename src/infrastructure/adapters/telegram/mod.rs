//! Telegram adapter
//!
//! Long-polls `getUpdates` and sends plain text replies with an optional
//! reply keyboard. Only text messages are surfaced to the bot loop.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::{self, ReplyKeyboard};
use crate::domain::traits::{Bot, BotInfo};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct ReplyKeyboardMarkup<'a> {
    keyboard: Vec<Vec<KeyboardButton<'a>>>,
    resize_keyboard: bool,
    one_time_keyboard: bool,
}

impl<'a> From<&'a ReplyKeyboard> for ReplyKeyboardMarkup<'a> {
    fn from(keyboard: &'a ReplyKeyboard) -> Self {
        Self {
            keyboard: keyboard
                .rows
                .iter()
                .map(|row| row.iter().map(|text| KeyboardButton { text }).collect())
                .collect(),
            resize_keyboard: keyboard.resize,
            one_time_keyboard: false,
        }
    }
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyKeyboardMarkup<'a>>,
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    poll_timeout_secs: u64,
    offset: AtomicI64,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, poll_timeout_secs: u64) -> Result<Self, BotError> {
        // The HTTP timeout must outlast the long-poll window
        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .map_err(|e| BotError::Config(e.to_string()))?;
        Ok(Self {
            token: token.into(),
            client,
            poll_timeout_secs,
            offset: AtomicI64::new(0),
        })
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn call<Req: Serialize, Res: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Res, BotError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let data: ApiResponse<Res> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.without_url().to_string()))?;

        match data.result {
            Some(result) if data.ok => Ok(result),
            _ => Err(BotError::Network(format!(
                "Telegram API error ({}): {}",
                status,
                data.description.unwrap_or_default()
            ))),
        }
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: [&'static str; 1],
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update]) -> Option<i64> {
        updates.iter().map(|u| u.update_id + 1).max()
    }

    async fn send(&self, chat_id: i64, text: &str, keyboard: Option<&ReplyKeyboard>) -> Result<(), BotError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            reply_markup: keyboard.map(ReplyKeyboardMarkup::from),
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }
}

/// Map an update to a domain message. Non-text updates are dropped.
pub fn to_domain_message(update: Update) -> Option<entities::Message> {
    let message = update.message?;
    let text = message.text?;
    let from = message.from?;
    let sender = entities::User {
        id: from.id,
        username: from.username,
        first_name: from.first_name,
        last_name: from.last_name,
    };
    Some(entities::Message::new(message.chat.id, sender, text))
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<BotInfo, BotError> {
        #[derive(Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        let me: Me = self.call("getMe", &serde_json::json!({})).await?;
        Ok(BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username.unwrap_or_default(),
        })
    }

    async fn next_messages(&self) -> Result<Vec<entities::Message>, BotError> {
        let updates = self.get_updates(self.offset.load(Ordering::SeqCst)).await?;
        if let Some(next) = Self::get_next_offset(&updates) {
            self.offset.store(next, Ordering::SeqCst);
        }
        Ok(updates.into_iter().filter_map(to_domain_message).collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        tracing::debug!(chat = chat_id, len = text.len(), "Sending message");
        self.send(chat_id, text, None).await
    }

    async fn send_with_keyboard(&self, chat_id: i64, text: &str, keyboard: &ReplyKeyboard) -> Result<(), BotError> {
        tracing::debug!(chat = chat_id, len = text.len(), "Sending message with keyboard");
        self.send(chat_id, text, Some(keyboard)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_to_message() {
        let update: Update = serde_json::from_str(
            r#"{"update_id": 10, "message": {"message_id": 1, "chat": {"id": 99},
                "from": {"id": 7, "first_name": "Petr", "username": "petr"}, "text": "/start"}}"#,
        )
        .unwrap();
        let message = to_domain_message(update).unwrap();
        assert_eq!(message.chat_id, 99);
        assert_eq!(message.sender.id, 7);
        assert_eq!(message.sender.tag().as_deref(), Some("@petr"));
        assert_eq!(message.text, "/start");
    }

    #[test]
    fn test_non_text_updates_dropped() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 11, "message": {"message_id": 2, "chat": {"id": 1}}}"#).unwrap();
        assert!(to_domain_message(update).is_none());
    }

    #[test]
    fn test_next_offset() {
        let updates: Vec<Update> = serde_json::from_str(r#"[{"update_id": 3}, {"update_id": 5}]"#).unwrap();
        assert_eq!(TelegramAdapter::get_next_offset(&updates), Some(6));
        assert_eq!(TelegramAdapter::get_next_offset(&[]), None);
    }

    #[test]
    fn test_keyboard_markup_shape() {
        let keyboard = ReplyKeyboard::new(&[&["a", "b"], &["c"]]);
        let request = SendMessageRequest {
            chat_id: 1,
            text: "hi",
            reply_markup: Some(ReplyKeyboardMarkup::from(&keyboard)),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["reply_markup"]["keyboard"][1][0]["text"], "c");
        assert_eq!(json["reply_markup"]["resize_keyboard"], true);

        let plain = SendMessageRequest {
            chat_id: 1,
            text: "hi",
            reply_markup: None,
        };
        assert!(serde_json::to_value(&plain).unwrap().get("reply_markup").is_none());
    }
}
