//! Console adapter for development/testing
//!
//! Reads messages from a line stream (stdin by default). A message ends at an
//! empty line, so multi-line commands can be typed as in chat; a first line
//! starting with `/` is sent on its own.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::{watch, Mutex};

use crate::application::errors::BotError;
use crate::domain::entities::{Message, ReplyKeyboard, User};
use crate::domain::traits::{Bot, BotInfo};

const CONSOLE_CHAT_ID: i64 = 0;

type LineStream = Lines<Box<dyn AsyncBufRead + Unpin + Send>>;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    lines: Mutex<LineStream>,
    user: User,
    on_eof: Option<watch::Sender<bool>>,
}

impl ConsoleAdapter {
    pub fn new(reader: impl AsyncBufRead + Unpin + Send + 'static, user: User) -> Self {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
        Self {
            lines: Mutex::new(reader.lines()),
            user,
            on_eof: None,
        }
    }

    pub fn stdin(user: User) -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), user)
    }

    /// Signal `shutdown` when the input ends.
    pub fn with_shutdown(mut self, shutdown: watch::Sender<bool>) -> Self {
        self.on_eof = Some(shutdown);
        self
    }

    async fn read_block(&self) -> Result<Option<String>, BotError> {
        let mut lines = self.lines.lock().await;
        let mut block: Vec<String> = Vec::new();

        loop {
            let line = lines
                .next_line()
                .await
                .map_err(|e| BotError::Network(format!("console read failed: {}", e)))?;
            match line {
                None => break,
                Some(line) if line.trim().is_empty() => {
                    if block.is_empty() {
                        continue;
                    }
                    break;
                }
                Some(line) => {
                    let is_slash = block.is_empty() && line.trim_start().starts_with('/');
                    block.push(line);
                    if is_slash {
                        break;
                    }
                }
            }
        }

        Ok((!block.is_empty()).then(|| block.join("\n")))
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<BotInfo, BotError> {
        tracing::info!("Starting console bot (dev mode)");
        println!("Type a message and finish it with an empty line. Ctrl-D exits.");
        Ok(BotInfo {
            id: "console".to_string(),
            name: "dalnoboy".to_string(),
            username: "console".to_string(),
        })
    }

    async fn next_messages(&self) -> Result<Vec<Message>, BotError> {
        match self.read_block().await? {
            Some(text) => Ok(vec![Message::new(CONSOLE_CHAT_ID, self.user.clone(), text)]),
            None => {
                if let Some(shutdown) = &self.on_eof {
                    let _ = shutdown.send(true);
                }
                Ok(Vec::new())
            }
        }
    }

    async fn send_message(&self, _chat_id: i64, text: &str) -> Result<(), BotError> {
        println!("[BOT] {}", text);
        Ok(())
    }

    async fn send_with_keyboard(&self, _chat_id: i64, text: &str, keyboard: &ReplyKeyboard) -> Result<(), BotError> {
        println!("[BOT] {}", text);
        for row in &keyboard.rows {
            println!("  [Buttons] {}", row.join(" | "));
        }
        Ok(())
    }
}
