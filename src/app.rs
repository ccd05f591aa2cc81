use std::sync::Arc;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::warn;

use gitaguide::{
    ChatGateway, ChatReply, Conversation, GatewayError, Language, MessageId, Mood,
    PreferenceStore, Preferences, Theme,
};

/// Starter prompts offered on an empty conversation
pub const SUGGESTIONS: [&str; 3] = [
    "What is my purpose?",
    "How to find peace?",
    "Dealing with anxiety",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

type TurnTask = JoinHandle<Result<ChatReply, GatewayError>>;

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation and the exchange currently in flight (at most one)
    pub conversation: Conversation,
    gateway: Arc<dyn ChatGateway>,
    pending: Option<TurnTask>,

    // Persisted preferences
    pub preferences: Preferences,
    store: Box<dyn PreferenceStore>,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in chars

    // Chat view
    pub selected_message: Option<MessageId>,
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub follow_tail: bool,
    pub chat_area: Option<Rect>,

    // Mood picker popup
    pub show_mood_picker: bool,
    pub mood_picker_state: ListState,

    // Transient footer notice (e.g. a preference that failed to save)
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator
}

impl App {
    pub fn new(gateway: Arc<dyn ChatGateway>, store: Box<dyn PreferenceStore>) -> Self {
        let preferences = Preferences::load(store.as_ref());
        let conversation = Conversation::with_language(preferences.language);

        Self {
            should_quit: false,
            // Normal mode so the number keys pick a starter prompt
            input_mode: InputMode::Normal,

            conversation,
            gateway,
            pending: None,

            preferences,
            store,

            input: String::new(),
            cursor: 0,

            selected_message: None,
            chat_scroll: 0,
            chat_height: 0,
            follow_tail: true,
            chat_area: None,

            show_mood_picker: false,
            mood_picker_state: ListState::default(),

            notice: None,

            animation_frame: 0,
        }
    }

    pub fn theme(&self) -> Theme {
        self.preferences.theme
    }

    /// Send is enabled only when idle with non-blank input
    pub fn can_send(&self) -> bool {
        self.pending.is_none() && self.conversation.can_send(&self.input)
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Begin a turn with the current input and dispatch it in the background
    pub fn submit_input(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(turn) = self.conversation.begin_turn(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.notice = None;
        self.follow_tail = true;

        let gateway = Arc::clone(&self.gateway);
        self.pending = Some(tokio::spawn(async move {
            gateway
                .send_turn(&turn.message, turn.language.as_str(), turn.mood.as_str())
                .await
        }));
    }

    /// Apply the outcome of the in-flight exchange once it has settled
    pub async fn poll_pending_turn(&mut self) {
        let finished = self.pending.as_ref().is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.pending.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "chat task did not complete");
                Err(GatewayError::Interrupted)
            }
        };

        self.conversation.complete_turn(outcome);
        self.follow_tail = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.preferences.theme.toggle();
        if let Err(e) = self.preferences.set_theme(self.store.as_mut(), theme) {
            warn!(error = %e, "could not save theme");
            self.notice = Some(format!("Theme not saved: {}", e));
        }
    }

    pub fn cycle_language(&mut self) {
        self.set_language(self.preferences.language.cycle());
    }

    pub fn set_language(&mut self, language: Language) {
        self.conversation.set_language(language);
        if let Err(e) = self.preferences.set_language(self.store.as_mut(), language) {
            warn!(error = %e, "could not save language");
            self.notice = Some(format!("Language not saved: {}", e));
        }
    }

    /// Copy a starter prompt into the input box (empty conversation only)
    pub fn apply_suggestion(&mut self, index: usize) {
        if !self.conversation.is_empty() {
            return;
        }
        if let Some(text) = SUGGESTIONS.get(index) {
            self.input = text.to_string();
            self.cursor = self.input.chars().count();
            self.input_mode = InputMode::Editing;
        }
    }

    // Selection among messages that carry citations

    fn cited_ids(&self) -> Vec<MessageId> {
        self.conversation
            .messages()
            .iter()
            .filter(|m| m.has_verses())
            .map(|m| m.id)
            .collect()
    }

    pub fn select_next_cited(&mut self) {
        let ids = self.cited_ids();
        if ids.is_empty() {
            return;
        }
        self.selected_message = Some(match self.selected_message {
            Some(current) => ids
                .iter()
                .copied()
                .find(|id| *id > current)
                .unwrap_or(ids[ids.len() - 1]),
            None => ids[0],
        });
    }

    pub fn select_prev_cited(&mut self) {
        let ids = self.cited_ids();
        if ids.is_empty() {
            return;
        }
        self.selected_message = Some(match self.selected_message {
            Some(current) => ids
                .iter()
                .rev()
                .copied()
                .find(|id| *id < current)
                .unwrap_or(ids[0]),
            None => ids[ids.len() - 1],
        });
    }

    /// Show or hide the verse panel of the selected message, or the latest cited one
    pub fn toggle_selected_verses(&mut self) {
        let target = self
            .selected_message
            .or_else(|| self.cited_ids().last().copied());
        if let Some(id) = target {
            self.selected_message = Some(id);
            self.conversation.toggle_verses(id);
        }
    }

    // Scrolling

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_up(self.chat_height.max(2) / 2);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_down(self.chat_height.max(2) / 2);
    }

    // Mood picker

    pub fn open_mood_picker(&mut self) {
        let current = Mood::all()
            .iter()
            .position(|m| *m == self.conversation.mood());
        self.mood_picker_state.select(current.or(Some(0)));
        self.show_mood_picker = true;
    }

    pub fn mood_picker_nav_down(&mut self) {
        let count = Mood::all().len();
        let i = self.mood_picker_state.selected().map(|i| (i + 1) % count).unwrap_or(0);
        self.mood_picker_state.select(Some(i));
    }

    pub fn mood_picker_nav_up(&mut self) {
        let count = Mood::all().len();
        let i = self
            .mood_picker_state
            .selected()
            .map(|i| if i == 0 { count - 1 } else { i - 1 })
            .unwrap_or(0);
        self.mood_picker_state.select(Some(i));
    }

    pub fn select_mood(&mut self) {
        if let Some(mood) = self
            .mood_picker_state
            .selected()
            .and_then(|i| Mood::all().get(i).copied())
        {
            self.conversation.set_mood(mood);
        }
        self.show_mood_picker = false;
    }
}
