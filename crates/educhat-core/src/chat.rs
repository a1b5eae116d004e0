//! Chat transcript view-model.

use tracing::{info, warn};

use crate::api::types::{ChatReply, ChatRequest, HistoryEntry};
use crate::error::ClientError;
use crate::mode::ChatMode;
use crate::selection::{AddressBar, SelectionStore};
use crate::state::ChatMessage;

pub const CHAT_ERROR_REPLY: &str =
    "Sorry, there was an error processing your message. Please try again.";

/// Transcript plus the cached session token.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    typing: bool,
    session_id: Option<String>,
    pub mode: ChatMode,
}

impl ChatTranscript {
    pub fn new(mode: ChatMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether the "typing" placeholder is showing.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn set_session_id(&mut self, id: impl Into<String>) {
        self.session_id = Some(id.into());
    }

    /// Echoes the user's message and shows the placeholder. Whitespace-only
    /// input changes nothing and yields no request.
    pub fn submit(&mut self, input: &str, document_ids: Vec<String>) -> Option<ChatRequest> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::user(message));
        self.typing = true;

        Some(ChatRequest {
            message: message.to_string(),
            session_id: self.session_id.clone().unwrap_or_default(),
            document_ids,
            mode: self.mode,
        })
    }

    pub fn apply_reply(&mut self, reply: ChatReply) {
        self.typing = false;
        if let Some(content) = reply.last_assistant_message() {
            self.messages.push(ChatMessage::assistant(content));
        }
        if self.session_id.is_none() {
            if let Some(id) = reply.session_id {
                info!(session_id = %id, "chat session established");
                self.session_id = Some(id);
            }
        }
    }

    /// Any failure becomes the same apology; the cause only goes to the log.
    pub fn apply_failure(&mut self, error: &ClientError) {
        warn!(error = %error, kind = error.kind(), "error sending message");
        self.typing = false;
        self.messages.push(ChatMessage::assistant(CHAT_ERROR_REPLY));
    }

    /// Cancelling drops the placeholder without an apology.
    pub fn cancel_pending(&mut self) {
        self.typing = false;
    }

    /// Replaces the transcript with a session's stored history.
    pub fn load_history(&mut self, session_id: &str, history: &[HistoryEntry]) {
        self.session_id = Some(session_id.to_string());
        self.messages = history.iter().filter_map(HistoryEntry::to_message).collect();
        self.typing = false;
    }
}

/// Documents to chat about: the address bar's `selected_docs` wins, the
/// selection store is the fallback.
pub fn resolve_document_ids(address_bar: &AddressBar, selection: &SelectionStore) -> Vec<String> {
    address_bar
        .selected_docs()
        .unwrap_or_else(|| selection.selected().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;

    fn reply_with(history: &[(&str, &str)], session_id: Option<&str>) -> ChatReply {
        ChatReply {
            response: None,
            chat_history: history
                .iter()
                .map(|(role, content)| HistoryEntry {
                    role: role.to_string(),
                    content: content.to_string(),
                    timestamp: None,
                })
                .collect(),
            session_id: session_id.map(str::to_string),
            sources: vec![],
        }
    }

    #[test]
    fn test_whitespace_input_is_ignored() {
        let mut chat = ChatTranscript::new(ChatMode::Standard);
        assert!(chat.submit("   \t\n", vec![]).is_none());
        assert!(chat.messages().is_empty());
        assert!(!chat.is_typing());
    }

    #[test]
    fn test_round_trip_appends_one_of_each() {
        let mut chat = ChatTranscript::new(ChatMode::Eli5);
        let request = chat.submit("  What is DNA? ", vec!["d1".to_string()]).unwrap();
        assert_eq!(request.message, "What is DNA?");
        assert_eq!(request.session_id, "");
        assert_eq!(request.mode, ChatMode::Eli5);
        assert!(chat.is_typing());

        chat.apply_reply(reply_with(
            &[("user", "What is DNA?"), ("assistant", "A molecule that stores genes.")],
            Some("s-42"),
        ));

        assert!(!chat.is_typing());
        let roles: Vec<ChatRole> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(chat.messages()[1].content, "A molecule that stores genes.");
        assert_eq!(chat.session_id(), Some("s-42"));
    }

    #[test]
    fn test_session_id_is_only_set_once() {
        let mut chat = ChatTranscript::new(ChatMode::Standard);
        chat.set_session_id("first");
        let request = chat.submit("hi", vec![]).unwrap();
        assert_eq!(request.session_id, "first");

        chat.apply_reply(reply_with(&[("assistant", "hello")], Some("second")));
        assert_eq!(chat.session_id(), Some("first"));
    }

    #[test]
    fn test_failure_shows_apology() {
        let mut chat = ChatTranscript::new(ChatMode::Standard);
        chat.submit("hi", vec![]);
        chat.apply_failure(&ClientError::Cancelled);

        assert!(!chat.is_typing());
        assert_eq!(chat.messages().len(), 2);
        assert_eq!(chat.messages()[1].content, CHAT_ERROR_REPLY);
    }

    #[test]
    fn test_reply_without_assistant_entry_adds_nothing() {
        let mut chat = ChatTranscript::new(ChatMode::Standard);
        chat.submit("hi", vec![]);
        chat.apply_reply(reply_with(&[("user", "hi")], None));
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.is_typing());
    }

    #[test]
    fn test_url_selection_wins_over_store() {
        let mut store = SelectionStore::new();
        store.set_available(vec!["a".to_string(), "b".to_string()]);
        store.toggle("a");

        let with_param = AddressBar::parse("http://localhost:8000/?selected_docs=b").unwrap();
        assert_eq!(resolve_document_ids(&with_param, &store), vec!["b"]);

        let without = AddressBar::parse("http://localhost:8000/").unwrap();
        assert_eq!(resolve_document_ids(&without, &store), vec!["a"]);
    }

    #[test]
    fn test_load_history_skips_unknown_roles() {
        let mut chat = ChatTranscript::new(ChatMode::Standard);
        let history = vec![
            HistoryEntry {
                role: "system".to_string(),
                content: "prompt".to_string(),
                timestamp: None,
            },
            HistoryEntry {
                role: "user".to_string(),
                content: "hi".to_string(),
                timestamp: None,
            },
        ];
        chat.load_history("s-1", &history);
        assert_eq!(chat.messages(), &[ChatMessage::user("hi")]);
        assert_eq!(chat.session_id(), Some("s-1"));
    }
}
