use std::fmt;

/// Sender identity as delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            username: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: Option<impl Into<String>>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = last.map(|l| l.into());
        self
    }

    /// "First Last", falling back to the username and then the numeric id.
    pub fn display_name(&self) -> String {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            username.to_string()
        } else {
            self.id.to_string()
        }
    }

    /// `@username`, if the sender has one.
    pub fn tag(&self) -> Option<String> {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(|u| format!("@{}", u))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
