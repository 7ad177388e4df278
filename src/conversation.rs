//! Conversation state: message store, input buffer, model selection and the
//! single-request guard.
//!
//! Everything here is synchronous. The network call happens elsewhere; this
//! module only decides whether a submission is accepted and records its
//! outcome.

use crate::message::ChatMessage;
use tracing::{debug, warn};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Request lifecycle state. Gates both submission and the model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
}

/// Text being composed, with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Replace the whole text and move the cursor to the end
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

/// A fixed, closed set of model identifiers with one selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelector {
    models: Vec<String>,
    selected: usize,
}

impl ModelSelector {
    /// Returns `None` for an empty set: there is nothing to select from.
    pub fn new(models: Vec<String>) -> Option<Self> {
        if models.is_empty() {
            None
        } else {
            Some(Self { models, selected: 0 })
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn current(&self) -> &str {
        &self.models[self.selected]
    }

    fn select(&mut self, idx: usize) -> bool {
        if idx < self.models.len() {
            self.selected = idx;
            true
        } else {
            false
        }
    }
}

/// Everything the transport needs for one request, captured at submit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub question: String,
    pub model: Option<String>,
    /// All messages including the one just submitted
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pub input: InputBuffer,
    state: RequestState,
    selector: Option<ModelSelector>,
}

impl Conversation {
    pub fn new(models: Vec<String>) -> Self {
        Self {
            messages: Vec::new(),
            input: InputBuffer::default(),
            state: RequestState::Idle,
            selector: ModelSelector::new(models),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn append_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input.set(text);
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == RequestState::Pending
    }

    /// Accept the current input as a user message.
    ///
    /// Returns `None` without touching any state when the input is blank or a
    /// request is already pending.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.is_busy() {
            debug!("submit ignored, request pending");
            return None;
        }
        if self.input.is_blank() {
            return None;
        }

        let question = self.input.text().to_string();
        let message = ChatMessage::user(question.clone());
        let id = message.id().clone();
        self.messages.push(message);
        self.clear_input();
        self.state = RequestState::Pending;

        let model = self.selected_model().map(str::to_string);
        debug!(%id, ?model, len = question.chars().count(), "submission accepted");

        Some(Submission {
            question,
            model,
            history: self.messages.clone(),
        })
    }

    /// Record the reply to the pending request and return to idle.
    pub fn resolve(&mut self, content: impl Into<String>) -> bool {
        if !self.is_busy() {
            warn!("reply arrived with no request pending, dropped");
            return false;
        }
        let message = ChatMessage::assistant(content);
        debug!(id = %message.id(), "reply recorded");
        self.messages.push(message);
        self.state = RequestState::Idle;
        true
    }

    pub fn selector(&self) -> Option<&ModelSelector> {
        self.selector.as_ref()
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selector.as_ref().map(ModelSelector::current)
    }

    /// The selector is read-only while a request is pending
    pub fn can_select_model(&self) -> bool {
        self.selector.is_some() && !self.is_busy()
    }

    pub fn select_model(&mut self, idx: usize) -> bool {
        if self.is_busy() {
            return false;
        }
        match self.selector.as_mut() {
            Some(selector) => selector.select(idx),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ChatRole;
    use crate::variant::BACKEND_MODELS;

    fn backend() -> Conversation {
        Conversation::new(BACKEND_MODELS.iter().map(|m| m.to_string()).collect())
    }

    #[test]
    fn test_submit_appends_user_and_goes_pending() {
        let mut conv = backend();
        conv.set_input("Xin chào");

        let sub = conv.submit().expect("accepted");
        assert_eq!(sub.question, "Xin chào");
        assert_eq!(sub.model.as_deref(), Some("Qwen3 4B pretrain"));
        assert_eq!(sub.history.len(), 1);
        assert_eq!(conv.messages().len(), 1);
        assert_eq!(conv.messages()[0].role(), ChatRole::User);
        assert_eq!(conv.input.text(), "");
        assert!(conv.is_busy());
    }

    #[test]
    fn test_round_trip_scenario() {
        let mut conv = backend();
        conv.set_input("Xin chào");
        conv.submit().unwrap();
        assert!(conv.resolve("Chào bạn"));

        let got: Vec<(ChatRole, &str)> = conv.messages().iter().map(|m| (m.role(), m.content())).collect();
        assert_eq!(got, vec![(ChatRole::User, "Xin chào"), (ChatRole::Assistant, "Chào bạn")]);
        assert_eq!(conv.input.text(), "");
        assert!(!conv.is_busy());
    }

    #[test]
    fn test_blank_input_rejected() {
        let mut conv = backend();
        for text in ["", "   ", "\n\t "] {
            conv.set_input(text);
            assert!(conv.submit().is_none());
        }
        assert!(conv.messages().is_empty());
        assert_eq!(conv.state(), RequestState::Idle);
    }

    #[test]
    fn test_submit_while_pending_is_noop() {
        let mut conv = backend();
        conv.set_input("một");
        conv.submit().unwrap();

        conv.set_input("hai");
        assert!(conv.submit().is_none());
        assert_eq!(conv.messages().len(), 1);
        // Buffer is left alone so the user does not lose what they typed
        assert_eq!(conv.input.text(), "hai");
    }

    #[test]
    fn test_question_is_not_trimmed() {
        let mut conv = Conversation::new(Vec::new());
        conv.set_input("  hỏi  ");
        let sub = conv.submit().unwrap();
        assert_eq!(sub.question, "  hỏi  ");
        assert_eq!(sub.model, None);
    }

    #[test]
    fn test_resolve_without_pending_is_dropped() {
        let mut conv = backend();
        assert!(!conv.resolve("lạc"));
        assert!(conv.messages().is_empty());
    }

    #[test]
    fn test_selector_locked_while_pending() {
        let mut conv = backend();
        assert!(conv.select_model(2));
        assert_eq!(conv.selected_model(), Some("Qwen3 4B finetune"));

        conv.set_input("q");
        conv.submit().unwrap();
        assert!(!conv.can_select_model());
        assert!(!conv.select_model(0));
        assert_eq!(conv.selected_model(), Some("Qwen3 4B finetune"));

        conv.resolve("a");
        assert!(conv.select_model(1));
        assert!(!conv.select_model(7));
        assert_eq!(conv.selected_model(), Some("Qwen3 1.7B"));
    }

    #[test]
    fn test_model_change_only_affects_next_submission() {
        let mut conv = backend();
        conv.set_input("first");
        let first = conv.submit().unwrap();
        conv.resolve("ok");

        conv.select_model(1);
        conv.set_input("second");
        let second = conv.submit().unwrap();

        assert_eq!(first.model.as_deref(), Some("Qwen3 4B pretrain"));
        assert_eq!(second.model.as_deref(), Some("Qwen3 1.7B"));
        assert_eq!(second.history.len(), 3);
    }

    #[test]
    fn test_input_buffer_utf8_editing() {
        let mut input = InputBuffer::default();
        input.insert_str("Chà");
        input.move_left();
        input.insert('o');
        assert_eq!(input.text(), "Choà");
        input.move_end();
        input.backspace();
        assert_eq!(input.text(), "Cho");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "ho");
        assert_eq!(input.cursor(), 0);
        input.move_right();
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_empty_model_list_has_no_selector() {
        let conv = Conversation::new(Vec::new());
        assert!(conv.selector().is_none());
        assert!(!conv.can_select_model());
    }
}
