//! UI-agnostic conversation types
//!
//! These are shared by the terminal UI and the one-shot CLI and don't depend
//! on any rendering framework.

use serde::Deserialize;
use std::fmt;

/// Identifier of a message within one conversation. Assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// A scripture reference returned alongside an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerseCitation {
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    #[serde(default)]
    pub shloka: Option<String>,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub hindi_translation: Option<String>,
}

impl VerseCitation {
    /// "Chapter 2, Verse 47"
    pub fn reference(&self) -> String {
        format!("Chapter {}, Verse {}", self.chapter, self.verse)
    }
}

/// One conversational turn half
#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    role: Role,
    pub content: String,
    pub timestamp: String,
    pub verses: Option<Vec<VerseCitation>>,
    pub show_verses: bool,
}

impl Message {
    pub(crate) fn new(id: MessageId, role: Role, content: String, verses: Option<Vec<VerseCitation>>) -> Self {
        Self {
            id,
            role,
            content,
            timestamp: current_time_of_day(),
            verses,
            show_verses: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn verse_count(&self) -> usize {
        self.verses.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn has_verses(&self) -> bool {
        self.verse_count() > 0
    }
}

/// Local time of day, e.g. "09:41"
fn current_time_of_day() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
