use super::User;

/// An inbound chat text message.
#[derive(Debug, Clone)]
pub struct Message {
    pub chat_id: i64,
    pub sender: User,
    pub text: String,
}

impl Message {
    pub fn new(chat_id: i64, sender: User, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender,
            text: text.into(),
        }
    }

    /// Text with surrounding whitespace removed, as used for button matching.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }
}

/// A fixed reply keyboard shown under the input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
}

impl ReplyKeyboard {
    pub fn new(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|b| b.to_string()).collect())
                .collect(),
            resize: true,
        }
    }
}

/// Outbound answer to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}
