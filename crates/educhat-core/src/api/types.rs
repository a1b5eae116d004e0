//! Request and response bodies of the EduChat REST API.

use serde::{Deserialize, Serialize};

use crate::mode::ChatMode;
use crate::quiz::{Difficulty, QuestionType};
use crate::state::{ChatMessage, ChatRole};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub document_ids: Vec<String>,
    pub mode: ChatMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub sources: Vec<ChatSource>,
}

impl ChatReply {
    /// The newest history entry, if it came from the assistant.
    pub fn last_assistant_message(&self) -> Option<&str> {
        self.chat_history
            .last()
            .filter(|entry| entry.role == "assistant")
            .map(|entry| entry.content.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryEntry {
    pub fn to_message(&self) -> Option<ChatMessage> {
        ChatRole::from_str(&self.role).map(|role| ChatMessage {
            role,
            content: self.content.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatSource {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    pub title: String,
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_filename: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub processed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    #[serde(default)]
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizRequest {
    pub document_ids: Vec<String>,
    pub num_questions: u32,
    pub question_types: Vec<QuestionType>,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub documents: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_reply_picks_last_assistant_entry() {
        let reply: ChatReply = serde_json::from_str(
            r#"{
                "response": "Mitochondria",
                "chat_history": [
                    {"role": "user", "content": "What is the powerhouse of the cell?"},
                    {"role": "assistant", "content": "Mitochondria", "timestamp": "2024-03-01T10:00:00"}
                ],
                "sources": [{"document_id": "d1", "source": "bio.pdf", "text": "..."}]
            }"#,
        )
        .unwrap();

        assert_eq!(reply.last_assistant_message(), Some("Mitochondria"));
        assert_eq!(reply.sources.len(), 1);
        assert!(reply.session_id.is_none());
    }

    #[test]
    fn test_chat_reply_ignores_trailing_user_entry() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"chat_history": [{"role": "user", "content": "hello"}]}"#,
        )
        .unwrap();
        assert_eq!(reply.last_assistant_message(), None);
    }

    #[test]
    fn test_document_tolerates_missing_fields() {
        let list: DocumentList = serde_json::from_str(
            r#"{"documents": [{"id": "a1", "original_filename": "notes.pdf", "file_type": "pdf"}]}"#,
        )
        .unwrap();
        let doc = &list.documents[0];
        assert_eq!(doc.title, "");
        assert_eq!(doc.category, None);
        assert!(!doc.processed);
    }

    #[test]
    fn test_quiz_request_omits_topic_when_absent() {
        let request = QuizRequest {
            document_ids: vec!["d1".to_string()],
            num_questions: 5,
            question_types: vec![QuestionType::MultipleChoice, QuestionType::TrueFalse],
            difficulty: Difficulty::Medium,
            topic: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "document_ids": ["d1"],
                "num_questions": 5,
                "question_types": ["multiple_choice", "true_false"],
                "difficulty": "medium"
            })
        );
    }

    #[test]
    fn test_question_type_field_is_renamed() {
        let q: Question = serde_json::from_str(
            r#"{"question": "2+2?", "type": "short_answer", "answer": "4"}"#,
        )
        .unwrap();
        assert_eq!(q.kind.as_deref(), Some("short_answer"));
        assert!(q.options.is_none());
        assert!(q.explanation.is_none());
    }
}
