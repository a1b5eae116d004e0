pub mod alerts;
pub mod api;
pub mod chat;
pub mod config;
pub mod documents;
pub mod error;
pub mod mode;
pub mod quiz;
pub mod requests;
pub mod selection;
pub mod state;
pub mod upload;

// Re-export main types for convenience
pub use alerts::{Alert, AlertCenter, Severity};
pub use api::EduChatClient;
pub use chat::ChatTranscript;
pub use config::Config;
pub use documents::{DeletePrompt, DocumentListView, SummaryModal};
pub use error::{ClientError, Result};
pub use mode::ChatMode;
pub use quiz::{QuizSettings, QuizView};
pub use requests::RequestSlot;
pub use selection::{AddressBar, SelectionStore};
pub use state::{ChatMessage, ChatRole};
pub use upload::UploadForm;
