//! Chat panel view: bubbles, warning banner and composer text.
//!
//! Pure projections of a `SessionState` snapshot. Nothing here mutates
//! state; the front-end re-renders from a fresh snapshot after every
//! operation.

use serde::Serialize;

use crate::models::{ConversationMessage, MessageType};
use crate::store::SessionState;

/// Placeholder shown in the empty message composer.
pub const COMPOSER_PLACEHOLDER: &str = "例如：头痛三天，伴有发热";

/// Prefix of the high-risk banner.
pub const WARNING_BANNER_PREFIX: &str = "⚠️ 高危症状预警：";

// ═══════════════════════════════════════════
// Frontend-facing types
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleAlign {
    Left,
    Right,
}

/// One rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatBubble {
    pub role: MessageType,
    pub content: String,
    /// HH:MM:SS
    pub time: String,
    pub align: BubbleAlign,
}

impl ChatBubble {
    fn from_message(message: &ConversationMessage) -> Self {
        let align = match message.message_type {
            MessageType::User => BubbleAlign::Right,
            MessageType::System => BubbleAlign::Left,
        };
        Self {
            role: message.message_type,
            content: message.content.clone(),
            time: message.display_time(),
            align,
        }
    }
}

// ═══════════════════════════════════════════
// Projections
// ═══════════════════════════════════════════

/// Bubbles in log order. A pending service notice is rendered last.
pub fn chat_bubbles(state: &SessionState) -> Vec<ChatBubble> {
    state
        .conversation
        .iter()
        .chain(state.notice.iter())
        .map(ChatBubble::from_message)
        .collect()
}

/// Banner text, present only while a warning is active.
pub fn warning_banner(state: &SessionState) -> Option<String> {
    state
        .warning
        .as_deref()
        .map(|w| format!("{WARNING_BANNER_PREFIX}{w}"))
}

/// Short plain-text rendering of a bubble for terminal front-ends.
pub fn format_bubble(bubble: &ChatBubble) -> String {
    let who = match bubble.role {
        MessageType::User => "我",
        MessageType::System => "医生助手",
    };
    match bubble.align {
        BubbleAlign::Right => format!("{:>40} [{}] {}", bubble.content, bubble.time, who),
        BubbleAlign::Left => format!("{} [{}] {}", who, bubble.time, bubble.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_turn() -> SessionState {
        let mut state = SessionState::default();
        state.conversation.append(ConversationMessage::user("头痛"));
        state
            .conversation
            .append(ConversationMessage::system("请补充说明"));
        state
    }

    #[test]
    fn user_right_system_left() {
        let bubbles = chat_bubbles(&state_with_turn());
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].align, BubbleAlign::Right);
        assert_eq!(bubbles[0].role, MessageType::User);
        assert_eq!(bubbles[1].align, BubbleAlign::Left);
        assert_eq!(bubbles[1].content, "请补充说明");
    }

    #[test]
    fn bubble_time_is_clock_format() {
        let bubbles = chat_bubbles(&state_with_turn());
        let time = &bubbles[0].time;
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn notice_renders_after_log() {
        let mut state = state_with_turn();
        state.notice = Some(ConversationMessage::system("服务不可用"));
        let bubbles = chat_bubbles(&state);
        assert_eq!(bubbles.len(), 3);
        assert_eq!(bubbles[2].content, "服务不可用");
        assert_eq!(bubbles[2].align, BubbleAlign::Left);
    }

    #[test]
    fn banner_follows_warning() {
        let mut state = SessionState::default();
        assert!(warning_banner(&state).is_none());

        state.warning = Some("持续高热需立即就医".into());
        assert_eq!(
            warning_banner(&state).unwrap(),
            "⚠️ 高危症状预警：持续高热需立即就医"
        );
    }

    #[test]
    fn empty_session_has_no_bubbles() {
        assert!(chat_bubbles(&SessionState::default()).is_empty());
    }

    #[test]
    fn format_bubble_names_speaker() {
        let bubbles = chat_bubbles(&state_with_turn());
        assert!(format_bubble(&bubbles[0]).ends_with("我"));
        assert!(format_bubble(&bubbles[1]).starts_with("医生助手"));
    }
}
