use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::autoscroll::Autoscroll;
use crate::client::ChatClient;
use crate::conversation::Conversation;
use crate::message::ChatMessage;
use crate::tui::AppEvent;
use crate::variant::Variant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub variant: Variant,

    // Conversation and the client that answers it
    pub conversation: Conversation,
    client: ChatClient,
    replies: UnboundedSender<AppEvent>,

    // Chat view state
    pub autoscroll: Autoscroll,
    pub chat_height: u16, // Inner height of the chat area, set during render
    pub chat_area: Option<Rect>, // For mouse hit-testing

    // Animation state
    pub animation_frame: u8, // 0-2 for the typing indicator

    // Model picker state
    pub show_model_picker: bool,
    pub model_picker_state: ListState,
}

impl App {
    pub fn new(client: ChatClient, replies: UnboundedSender<AppEvent>) -> Self {
        let variant = client.variant();
        let mut conversation = Conversation::new(variant.models());
        if let Some(greeting) = variant.greeting() {
            conversation.append_message(ChatMessage::assistant(greeting));
        }

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            variant,

            conversation,
            client,
            replies,

            autoscroll: Autoscroll::new(),
            chat_height: 0,
            chat_area: None,

            animation_frame: 0,

            show_model_picker: false,
            model_picker_state: ListState::default(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.conversation.is_busy()
    }

    /// Submit the input buffer. Returns whether a request was issued.
    pub fn submit(&mut self) -> bool {
        let Some(submission) = self.conversation.submit() else {
            return false;
        };
        info!(model = ?submission.model, "question submitted");

        let client = self.client.clone();
        let replies = self.replies.clone();
        let failure = self.variant.failure_text();

        // The inner task isolates a panic so a reply is always delivered
        tokio::spawn(async move {
            let text = match tokio::spawn(async move { client.reply(&submission).await }).await {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "request task aborted");
                    failure.to_string()
                }
            };
            if replies.send(AppEvent::Reply(text)).is_err() {
                error!("reply dropped, event loop has stopped");
            }
        });

        true
    }

    pub fn on_reply(&mut self, text: String) {
        self.conversation.resolve(text);
        self.animation_frame = 0;
    }

    /// Tick animation frame and scroll animation (called by Tick event)
    pub fn tick(&mut self) {
        if self.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.autoscroll.tick();
    }

    pub fn scroll_half_page_down(&mut self) {
        self.autoscroll.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.autoscroll.scroll_up((self.chat_height / 2).max(1));
    }

    // Model picker methods
    pub fn open_model_picker(&mut self) {
        let Some(selector) = self.conversation.selector() else {
            return;
        };
        if !self.conversation.can_select_model() {
            return;
        }
        self.model_picker_state.select(Some(selector.selected_index()));
        self.show_model_picker = true;
    }

    pub fn model_picker_nav_down(&mut self) {
        let len = self.conversation.selector().map(|s| s.models().len()).unwrap_or(0);
        if len > 0 {
            let i = self.model_picker_state.selected().unwrap_or(0);
            self.model_picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn model_picker_nav_up(&mut self) {
        let i = self.model_picker_state.selected().unwrap_or(0);
        self.model_picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn select_model(&mut self) {
        if let Some(i) = self.model_picker_state.selected() {
            if self.conversation.select_model(i) {
                info!(model = ?self.conversation.selected_model(), "model selected");
            }
        }
        self.show_model_picker = false;
    }
}
