pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod options;
pub mod preferences;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatClient, ChatGateway, ChatReply, ChatRequest};
pub use config::Settings;
pub use conversation::{Conversation, PendingTurn, TurnPhase};
pub use error::GatewayError;
pub use options::{Language, Mood, Theme};
pub use preferences::{FilePreferences, MemoryPreferences, PreferenceStore, Preferences};
pub use state::{Message, MessageId, Role, VerseCitation};
