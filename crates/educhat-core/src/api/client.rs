use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{
    ChatReply, ChatRequest, Document, DocumentList, DocumentSummary, HistoryEntry, Quiz,
    QuizRequest, SessionInfo, SessionRequest,
};
use crate::error::{ClientError, Result};
use crate::quiz::QuizMode;
use crate::upload::UploadRequest;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client for the EduChat backend.
#[derive(Clone)]
pub struct EduChatClient {
    client: Client,
    base_url: String,
}

impl EduChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // Request builders are split out so the wire shape can be inspected
    // without a server.

    pub fn chat_message_request(&self, request: &ChatRequest) -> RequestBuilder {
        self.client.post(self.url("/api/chat/message")).json(request)
    }

    pub fn create_session_request(&self, request: &SessionRequest) -> RequestBuilder {
        self.client.post(self.url("/api/chat/sessions")).json(request)
    }

    pub fn quiz_request(&self, mode: QuizMode, request: &QuizRequest) -> RequestBuilder {
        self.client.post(self.url(mode.endpoint())).json(request)
    }

    pub fn delete_document_request(&self, document_id: &str) -> RequestBuilder {
        self.client
            .delete(self.url(&format!("/api/documents/{}", document_id)))
    }

    pub async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = self.url("/api/chat/message");
        self.execute(self.chat_message_request(request), url).await
    }

    pub async fn create_session(&self, title: &str, document_ids: &[String]) -> Result<SessionInfo> {
        let url = self.url("/api/chat/sessions");
        let request = SessionRequest {
            title: title.to_string(),
            document_ids: document_ids.to_vec(),
        };
        self.execute(self.create_session_request(&request), url).await
    }

    pub async fn session_history(&self, session_id: &str) -> Result<Vec<HistoryEntry>> {
        let url = self.url(&format!("/api/chat/sessions/{}", session_id));
        self.execute(self.client.get(&url), url).await
    }

    /// Sends a chat message, opening a server-side session first when the
    /// request carries none. The returned reply always names the session used.
    pub async fn send_chat(&self, mut request: ChatRequest) -> Result<ChatReply> {
        if request.session_id.is_empty() {
            let title = format!("Chat Session {}", chrono::Local::now().format("%Y-%m-%d %H:%M"));
            match self.create_session(&title, &request.document_ids).await {
                Ok(session) => {
                    info!(session_id = %session.id, "opened chat session");
                    request.session_id = session.id;
                }
                Err(e) => warn!(error = %e, kind = e.kind(), "could not open chat session"),
            }
        }

        let mut reply = self.send_message(&request).await?;
        if reply.session_id.is_none() && !request.session_id.is_empty() {
            reply.session_id = Some(request.session_id);
        }
        Ok(reply)
    }

    pub async fn upload_document(&self, upload: &UploadRequest) -> Result<Value> {
        let url = self.url("/api/documents/upload");
        let path_label = upload.file_path.display().to_string();

        let bytes = tokio::fs::read(&upload.file_path)
            .await
            .map_err(|source| ClientError::Io {
                path: path_label.clone(),
                source,
            })?;
        let file_name = upload
            .file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        if let Some(title) = &upload.title {
            form = form.text("title", title.clone());
        }
        if let Some(category) = &upload.category {
            form = form.text("category", category.clone());
        }

        debug!(path = %path_label, "uploading document");
        self.execute(self.client.post(&url).multipart(form), url).await
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        let url = self.url("/api/documents/");
        let list: DocumentList = self.execute(self.client.get(&url), url).await?;
        Ok(list.documents)
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Document> {
        let url = self.url(&format!("/api/documents/{}", document_id));
        self.execute(self.client.get(&url), url).await
    }

    pub async fn document_summary(&self, document_id: &str) -> Result<DocumentSummary> {
        let url = self.url(&format!("/api/documents/{}/summary", document_id));
        self.execute(self.client.get(&url), url).await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<Value> {
        let url = self.url(&format!("/api/documents/{}", document_id));
        self.execute(self.delete_document_request(document_id), url).await
    }

    pub async fn generate_quiz(&self, mode: QuizMode, request: &QuizRequest) -> Result<Quiz> {
        let url = self.url(mode.endpoint());
        self.execute(self.quiz_request(mode, request), url).await
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder, url: String) -> Result<T> {
        let response = builder.send().await.map_err(|source| ClientError::Network {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                url,
                status,
                detail: extract_detail(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }
}

/// Pulls the `detail` field out of an error body, falling back to the raw text.
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ChatMode;
    use crate::quiz::{Difficulty, QuestionType};
    use reqwest::Method;

    fn body_json(request: &reqwest::Request) -> Value {
        let bytes = request
            .body()
            .and_then(|b| b.as_bytes())
            .expect("request has a buffered body");
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = EduChatClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_chat_message_request_shape() {
        let client = EduChatClient::new(DEFAULT_BASE_URL);
        let request = client
            .chat_message_request(&ChatRequest {
                message: "Explain osmosis".to_string(),
                session_id: "s-1".to_string(),
                document_ids: vec!["d1".to_string(), "d2".to_string()],
                mode: ChatMode::Eli5,
            })
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:8000/api/chat/message");
        assert_eq!(
            body_json(&request),
            serde_json::json!({
                "message": "Explain osmosis",
                "session_id": "s-1",
                "document_ids": ["d1", "d2"],
                "mode": "eli5"
            })
        );
    }

    #[test]
    fn test_quiz_request_uses_mode_endpoint() {
        let client = EduChatClient::new(DEFAULT_BASE_URL);
        let body = QuizRequest {
            document_ids: vec!["d1".to_string()],
            num_questions: 3,
            question_types: vec![QuestionType::ShortAnswer],
            difficulty: Difficulty::Hard,
            topic: Some("Photosynthesis".to_string()),
        };

        let standard = client.quiz_request(QuizMode::Standard, &body).build().unwrap();
        assert_eq!(standard.url().path(), "/api/quiz/generate");

        let topic = client.quiz_request(QuizMode::Topic, &body).build().unwrap();
        assert_eq!(topic.url().path(), "/api/quiz/generate/topic");
        assert_eq!(body_json(&topic)["topic"], "Photosynthesis");
        assert_eq!(body_json(&topic)["difficulty"], "hard");
    }

    #[test]
    fn test_delete_request_targets_document() {
        let client = EduChatClient::new(DEFAULT_BASE_URL);
        let request = client.delete_document_request("abc-123").build().unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().path(), "/api/documents/abc-123");
    }

    #[test]
    fn test_session_request_shape() {
        let client = EduChatClient::new(DEFAULT_BASE_URL);
        let request = client
            .create_session_request(&SessionRequest {
                title: "Chat Session 2024-03-01 10:00".to_string(),
                document_ids: vec![],
            })
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/api/chat/sessions");
        assert_eq!(body_json(&request)["document_ids"], serde_json::json!([]));
    }

    #[test]
    fn test_extract_detail_prefers_json_detail() {
        assert_eq!(
            extract_detail(r#"{"detail": "Document not found"}"#),
            "Document not found"
        );
        assert_eq!(extract_detail("Internal Server Error\n"), "Internal Server Error");
        assert_eq!(extract_detail(r#"{"detail": [1, 2]}"#), "[1,2]");
    }

    /// Serves one canned JSON body per connection, in order, and hands back
    /// the request line and JSON body of everything it received.
    async fn stub_server(
        replies: Vec<&'static str>,
    ) -> (String, tokio::task::JoinHandle<Vec<(String, Value)>>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let header_end = loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break pos + 4;
                    }
                };
                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .filter_map(|l| l.split_once(':'))
                    .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < header_end + content_length {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                }
                let request_line = head.lines().next().unwrap_or_default().to_string();
                let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
                seen.push((request_line, body));

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            seen
        });
        (base_url, handle)
    }

    #[tokio::test]
    async fn test_send_chat_opens_session_and_backfills_id() {
        let (base_url, server) = stub_server(vec![
            r#"{"id": "s-42", "title": "Chat Session"}"#,
            r#"{"response": "Osmosis is diffusion of water."}"#,
        ])
        .await;
        let client = EduChatClient::new(&base_url);

        let reply = client
            .send_chat(ChatRequest {
                message: "Explain osmosis".to_string(),
                session_id: String::new(),
                document_ids: vec!["d1".to_string()],
                mode: ChatMode::Standard,
            })
            .await
            .unwrap();
        assert_eq!(reply.session_id.as_deref(), Some("s-42"));
        assert_eq!(reply.response.as_deref(), Some("Osmosis is diffusion of water."));

        let seen = server.await.unwrap();
        assert!(seen[0].0.starts_with("POST /api/chat/sessions "));
        assert!(seen[0].1["title"]
            .as_str()
            .is_some_and(|t| t.starts_with("Chat Session ")));
        assert_eq!(seen[0].1["document_ids"], serde_json::json!(["d1"]));
        assert!(seen[1].0.starts_with("POST /api/chat/message "));
        assert_eq!(seen[1].1["session_id"], "s-42");
    }

    #[tokio::test]
    async fn test_send_chat_reuses_known_session() {
        let (base_url, server) =
            stub_server(vec![r#"{"response": "Hi", "session_id": "s-7"}"#]).await;
        let client = EduChatClient::new(&base_url);

        let reply = client
            .send_chat(ChatRequest {
                message: "Hello".to_string(),
                session_id: "s-7".to_string(),
                document_ids: vec![],
                mode: ChatMode::Eli5,
            })
            .await
            .unwrap();
        assert_eq!(reply.session_id.as_deref(), Some("s-7"));

        let seen = server.await.unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.starts_with("POST /api/chat/message "));
        assert_eq!(seen[0].1["session_id"], "s-7");
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let client = EduChatClient::new(DEFAULT_BASE_URL);
        let upload = UploadRequest {
            file_path: std::path::PathBuf::from("/definitely/not/here.pdf"),
            title: None,
            category: None,
        };
        let err = client.upload_document(&upload).await.unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
