pub mod client;
pub mod types;

pub use client::EduChatClient;
pub use types::{
    ChatReply, ChatRequest, Document, DocumentList, DocumentSummary, HistoryEntry, Question, Quiz,
    QuizRequest, SessionInfo, SessionRequest,
};
