use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::application::errors::BotError;
use crate::application::messaging::formatter::{split_message, DEFAULT_MAX_MESSAGE_LEN};
use crate::application::messaging::MessageHandler;
use crate::domain::entities::{Message, Reply};
use crate::domain::traits::Bot;

/// Pause between the parts of a split reply.
const PART_DELAY: Duration = Duration::from_millis(100);
/// Back-off after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Inbound loop for one bot: poll, handle each message in order, reply.
pub struct MessageService<B: Bot, H: MessageHandler> {
    name: String,
    bot: B,
    handler: Arc<H>,
    max_message_len: usize,
}

impl<B: Bot, H: MessageHandler + 'static> MessageService<B, H> {
    pub fn new(name: impl Into<String>, bot: B, handler: H) -> Self {
        Self {
            name: name.into(),
            bot,
            handler: Arc::new(handler),
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }

    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len;
        self
    }

    /// Run the handler on the blocking pool; it talks to storage synchronously.
    pub async fn process(&self, message: Message) -> Result<Reply, BotError> {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.handle(&message))
            .await
            .map_err(|e| BotError::Internal(format!("handler task failed: {}", e)))
    }

    /// Send a reply, split to the length limit. Only the first part carries
    /// the keyboard.
    pub async fn respond(&self, chat_id: i64, reply: &Reply) -> Result<(), BotError> {
        let parts = split_message(&reply.text, self.max_message_len);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(PART_DELAY).await;
            }
            match (&reply.keyboard, i) {
                (Some(keyboard), 0) => self.bot.send_with_keyboard(chat_id, part, keyboard).await?,
                _ => self.bot.send_message(chat_id, part).await?,
            }
        }
        Ok(())
    }

    /// Poll until `shutdown` flips to `true`. A batch already received is
    /// finished before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), BotError> {
        let info = self.bot.start().await?;
        tracing::info!(
            bot = %self.name,
            id = %info.id,
            name = %info.name,
            username = %info.username,
            "Bot started"
        );

        while !*shutdown.borrow() {
            let batch = tokio::select! {
                _ = shutdown.changed() => break,
                batch = self.bot.next_messages() => batch,
            };

            let messages = match batch {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(bot = %self.name, error = %e, "Polling failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                    }
                }
            };

            for message in messages {
                let chat_id = message.chat_id;
                tracing::debug!(bot = %self.name, chat = chat_id, user = message.sender.id, "Message received");
                let reply = match self.process(message).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::error!(bot = %self.name, error = %e, "Handler failed");
                        continue;
                    }
                };
                if let Err(e) = self.respond(chat_id, &reply).await {
                    tracing::warn!(bot = %self.name, chat = chat_id, error = %e, "Failed to send reply");
                }
            }
        }

        tracing::info!(bot = %self.name, "Bot stopped");
        Ok(())
    }
}
