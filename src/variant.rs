use clap::ValueEnum;

/// Which transport and presentation the chat view runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Variant {
    /// QA backend with model selection
    #[default]
    Backend,
    /// QA backend, question only
    Basic,
    /// Gemini generateContent called directly
    Gemini,
}

/// Backend models offered by the selector, in display order
pub const BACKEND_MODELS: [&str; 3] = ["Qwen3 4B pretrain", "Qwen3 1.7B", "Qwen3 4B finetune"];

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Backend => "backend",
            Variant::Basic => "basic",
            Variant::Gemini => "gemini",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "backend" => Some(Variant::Backend),
            "basic" => Some(Variant::Basic),
            "gemini" => Some(Variant::Gemini),
            _ => None,
        }
    }

    /// Models the selector offers; empty when the variant has no selector
    pub fn models(&self) -> Vec<String> {
        match self {
            Variant::Backend => BACKEND_MODELS.iter().map(|m| m.to_string()).collect(),
            Variant::Basic | Variant::Gemini => Vec::new(),
        }
    }

    /// Message the conversation starts with, if any
    pub fn greeting(&self) -> Option<&'static str> {
        match self {
            Variant::Gemini => Some("Xin chào! Tôi là Gemini. Bạn cần hỏi gì?"),
            Variant::Backend | Variant::Basic => None,
        }
    }

    /// Shown in place of an answer when a successful response has none
    pub fn fallback_text(&self) -> &'static str {
        match self {
            Variant::Backend | Variant::Basic => "Bot chưa trả lời!",
            Variant::Gemini => "(Không có phản hồi từ Gemini)",
        }
    }

    /// Shown for any transport or HTTP status failure
    pub fn failure_text(&self) -> &'static str {
        match self {
            Variant::Backend | Variant::Basic => "Lỗi kết nối tới server!",
            Variant::Gemini => "Xin lỗi, tôi không thể trả lời lúc này.",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Backend | Variant::Basic => "UET AI",
            Variant::Gemini => "Gemini",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Variant::Backend | Variant::Basic => "Trợ lý hỏi đáp về quy chế đào tạo",
            Variant::Gemini => "Trò chuyện trực tiếp với Gemini",
        }
    }

    /// Placeholder shown in the input box
    pub fn placeholder(&self) -> &'static str {
        match self {
            Variant::Backend | Variant::Basic => "Nhập câu hỏi của bạn",
            Variant::Gemini => "Nhập tin nhắn...",
        }
    }

    /// Text for the typing indicator; `None` means animated dots
    pub fn pending_text(&self) -> Option<&'static str> {
        match self {
            Variant::Gemini => Some("Gemini đang trả lời..."),
            Variant::Backend | Variant::Basic => None,
        }
    }

    /// Whether Shift+Enter inserts a newline instead of submitting
    pub fn multiline_input(&self) -> bool {
        matches!(self, Variant::Gemini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrips_names() {
        for v in [Variant::Backend, Variant::Basic, Variant::Gemini] {
            assert_eq!(Variant::from_str(v.as_str()), Some(v));
        }
        assert_eq!(Variant::from_str(" Gemini "), Some(Variant::Gemini));
        assert_eq!(Variant::from_str("openai"), None);
    }

    #[test]
    fn test_only_backend_has_models() {
        assert_eq!(Variant::Backend.models()[0], "Qwen3 4B pretrain");
        assert_eq!(Variant::Backend.models().len(), 3);
        assert!(Variant::Basic.models().is_empty());
        assert!(Variant::Gemini.models().is_empty());
    }

    #[test]
    fn test_texts_per_variant() {
        assert_eq!(Variant::Backend.failure_text(), "Lỗi kết nối tới server!");
        assert_eq!(Variant::Backend.fallback_text(), "Bot chưa trả lời!");
        assert_eq!(Variant::Gemini.failure_text(), "Xin lỗi, tôi không thể trả lời lúc này.");
        assert!(Variant::Backend.greeting().is_none());
        assert!(Variant::Gemini.greeting().is_some());
    }
}
