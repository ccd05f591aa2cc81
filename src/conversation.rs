//! In-memory conversation state and the per-turn lifecycle.
//!
//! A turn moves `Idle -> Sending -> Idle`. `Sending` is only entered from
//! `Idle` with non-blank input and is always left again once the exchange
//! settles, whatever the outcome. Each completed turn adds exactly one user
//! message followed by exactly one assistant message.

use tracing::{info, warn};

use crate::client::{ChatGateway, ChatReply};
use crate::error::GatewayError;
use crate::options::{Language, Mood};
use crate::state::{Message, MessageId, Role, VerseCitation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPhase {
    #[default]
    Idle,
    Sending,
}

/// Snapshot of what to send for a turn that has just begun
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub message: String,
    pub language: Language,
    pub mood: Mood,
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
    phase: TurnPhase,
    mood: Mood,
    language: Language,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_language(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == TurnPhase::Sending
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.phase = if loading {
            TurnPhase::Sending
        } else {
            TurnPhase::Idle
        };
    }

    /// Whether a send may be initiated with this input right now
    pub fn can_send(&self, input: &str) -> bool {
        self.phase == TurnPhase::Idle && !input.trim().is_empty()
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }

    /// Append a user message. Blank text is refused and nothing is appended.
    pub fn append_user_message(&mut self, text: &str) -> Option<MessageId> {
        if text.trim().is_empty() {
            return None;
        }
        let id = self.allocate_id();
        self.messages
            .push(Message::new(id, Role::User, text.to_string(), None));
        Some(id)
    }

    pub fn append_assistant_message(
        &mut self,
        content: &str,
        verses: Option<Vec<VerseCitation>>,
    ) -> MessageId {
        let verses = verses.filter(|v| !v.is_empty());
        let id = self.allocate_id();
        self.messages
            .push(Message::new(id, Role::Assistant, content.to_string(), verses));
        id
    }

    /// Flip the verse panel of one message. Unknown ids are ignored.
    pub fn toggle_verses(&mut self, id: MessageId) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.show_verses = !message.show_verses;
                true
            }
            None => false,
        }
    }

    /// Start a turn: append the user message and enter `Sending`.
    ///
    /// Returns `None` without touching any state when a turn is already in
    /// flight or the input is blank.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        if !self.can_send(input) {
            return None;
        }
        self.append_user_message(input)?;
        self.set_loading(true);

        info!(mood = self.mood.as_str(), language = self.language.as_str(), "turn dispatched");
        Some(PendingTurn {
            message: input.to_string(),
            language: self.language,
            mood: self.mood,
        })
    }

    /// Settle the in-flight turn with exactly one assistant message
    pub fn complete_turn(&mut self, outcome: Result<ChatReply, GatewayError>) -> MessageId {
        let id = match outcome {
            Ok(reply) => {
                info!(verses = reply.relevant_verses.len(), "turn completed");
                self.append_assistant_message(&reply.response, Some(reply.relevant_verses))
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "turn failed");
                self.append_assistant_message(&narrate_failure(&err), None)
            }
        };
        self.set_loading(false);
        id
    }

    /// Run a whole turn against `gateway`
    pub async fn exchange<G>(&mut self, gateway: &G, input: &str) -> Option<MessageId>
    where
        G: ChatGateway + ?Sized,
    {
        let turn = self.begin_turn(input)?;
        let outcome = gateway
            .send_turn(&turn.message, turn.language.as_str(), turn.mood.as_str())
            .await;
        Some(self.complete_turn(outcome))
    }
}

/// In-conversation text for a failed exchange
pub fn narrate_failure(err: &GatewayError) -> String {
    format!("I'm having difficulty right now. Please try again. ({})", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(chapter: u32, verse: u32) -> VerseCitation {
        VerseCitation {
            chapter,
            verse,
            text: "...".to_string(),
            shloka: None,
            transliteration: None,
            hindi_translation: None,
        }
    }

    fn reply(text: &str, verses: Vec<VerseCitation>) -> ChatReply {
        ChatReply {
            response: text.to_string(),
            relevant_verses: verses,
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_append_user_message_adds_one_user_turn() {
        let mut conversation = Conversation::new();
        for text in ["a", "  padded  ", "How to find peace?"] {
            let before = conversation.len();
            let id = conversation.append_user_message(text).unwrap();
            assert_eq!(conversation.len(), before + 1);
            let last = conversation.messages().last().unwrap();
            assert_eq!(last.id, id);
            assert_eq!(last.role(), Role::User);
            assert_eq!(last.content, text);
        }
    }

    #[test]
    fn test_blank_input_appends_nothing() {
        let mut conversation = Conversation::new();
        assert!(conversation.append_user_message("").is_none());
        assert!(conversation.append_user_message(" \t\n ").is_none());
        assert!(conversation.begin_turn("   ").is_none());
        assert!(conversation.is_empty());
        assert_eq!(conversation.phase(), TurnPhase::Idle);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut conversation = Conversation::new();
        let a = conversation.append_user_message("one").unwrap();
        let b = conversation.append_assistant_message("two", None);
        let c = conversation.append_user_message("three").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_assistant_message_starts_with_verses_hidden() {
        let mut conversation = Conversation::new();
        let id = conversation.append_assistant_message("reply", Some(vec![citation(2, 48)]));
        let message = conversation.get(id).unwrap();
        assert_eq!(message.role(), Role::Assistant);
        assert!(!message.show_verses);
        assert_eq!(message.verse_count(), 1);
    }

    #[test]
    fn test_empty_verse_list_is_stored_as_none() {
        let mut conversation = Conversation::new();
        let id = conversation.append_assistant_message("reply", Some(Vec::new()));
        assert!(conversation.get(id).unwrap().verses.is_none());
    }

    #[test]
    fn test_toggle_verses_flips_only_target() {
        let mut conversation = Conversation::new();
        let first = conversation.append_assistant_message("one", Some(vec![citation(2, 47)]));
        let second = conversation.append_assistant_message("two", Some(vec![citation(6, 5)]));

        assert!(conversation.toggle_verses(second));
        assert!(!conversation.get(first).unwrap().show_verses);
        assert!(conversation.get(second).unwrap().show_verses);

        assert!(conversation.toggle_verses(second));
        assert!(!conversation.get(second).unwrap().show_verses);
    }

    #[test]
    fn test_toggle_verses_unknown_id_is_noop() {
        let mut conversation = Conversation::new();
        let id = conversation.append_assistant_message("one", Some(vec![citation(2, 47)]));
        assert!(!conversation.toggle_verses(MessageId(999)));
        assert!(!conversation.get(id).unwrap().show_verses);
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_begin_turn_enters_sending_and_snapshots_selectors() {
        let mut conversation = Conversation::with_language(Language::Hindi);
        conversation.set_mood(Mood::Anxious);

        let turn = conversation.begin_turn("How to find peace?").unwrap();
        assert_eq!(turn.message, "How to find peace?");
        assert_eq!(turn.language, Language::Hindi);
        assert_eq!(turn.mood, Mood::Anxious);
        assert!(conversation.is_loading());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_second_turn_refused_while_sending() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("first").unwrap();
        assert!(!conversation.can_send("second"));
        assert!(conversation.begin_turn("second").is_none());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_complete_turn_success_appends_reply_and_goes_idle() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("How to find peace?").unwrap();
        conversation.complete_turn(Ok(reply("Seek stillness...", vec![citation(2, 48)])));

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.phase(), TurnPhase::Idle);
        let last = conversation.messages().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert_eq!(last.content, "Seek stillness...");
        assert_eq!(last.verse_count(), 1);
    }

    #[test]
    fn test_complete_turn_failure_is_narrated() {
        let mut conversation = Conversation::new();
        conversation.begin_turn("hello").unwrap();
        conversation.complete_turn(Err(GatewayError::ServerRejected(
            "model unavailable".to_string(),
        )));

        assert_eq!(conversation.len(), 2);
        assert!(!conversation.is_loading());
        let last = conversation.messages().last().unwrap();
        assert_eq!(last.role(), Role::Assistant);
        assert!(last.content.contains("model unavailable"));
        assert!(last.verses.is_none());
        assert!(conversation.can_send("again"));
    }

    #[test]
    fn test_rate_limit_narration_contains_notice() {
        let text = narrate_failure(&GatewayError::RateLimited);
        assert!(text.contains(crate::error::RATE_LIMIT_NOTICE));
        assert!(text.starts_with("I'm having difficulty right now."));
    }
}
