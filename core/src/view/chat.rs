//! Chat bubbles

use super::html::{escape, escape_multiline};
use crate::model::ChatRole;

/// One chat bubble. Assistant text keeps its line breaks.
pub fn render_bubble(role: ChatRole, text: &str) -> String {
    match role {
        ChatRole::User => format!(
            r#"<div class="chat-bubble p-3 shadow-sm user ms-auto text-white">{}</div>"#,
            escape(text)
        ),
        ChatRole::Assistant => format!(
            r#"<div class="chat-bubble p-3 shadow-sm ai">{}</div>"#,
            escape_multiline(text)
        ),
    }
}

/// Inline explanation for a missed quiz question
pub fn render_explanation(text: &str) -> String {
    format!("<strong>ORIA:</strong> {}", escape_multiline(text))
}

/// System line announcing a quest saved from chat
pub fn quest_saved_notice(title: &str) -> String {
    format!("SYSTEM ALERT: Saved new quest \"{title}\" to your active quests!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bubbles_escape() {
        let user = render_bubble(ChatRole::User, "<script>");
        assert!(user.contains("user ms-auto"));
        assert!(user.contains("&lt;script&gt;"));

        let ai = render_bubble(ChatRole::Assistant, "line 1\nline 2");
        assert!(ai.contains("line 1<br>line 2"));
    }

    #[test]
    fn test_explanation() {
        assert_eq!(
            render_explanation("Because."),
            "<strong>ORIA:</strong> Because."
        );
    }

    #[test]
    fn test_quest_saved_notice() {
        assert_eq!(
            quest_saved_notice("Run 5k"),
            r#"SYSTEM ALERT: Saved new quest "Run 5k" to your active quests!"#
        );
    }
}
