use std::time::Instant;

use anyhow::Result;
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tracing::{debug, error, info, warn};

use educhat_core::api::types::{ChatReply, Document, DocumentSummary, HistoryEntry, Quiz};
use educhat_core::chat::resolve_document_ids;
use educhat_core::quiz::{QuestionType, QuizMode};
use educhat_core::{
    AddressBar, AlertCenter, ChatMode, ChatTranscript, Config, DeletePrompt, DocumentListView,
    EduChatClient, QuizSettings, QuizView, RequestSlot, SelectionStore, Severity, SummaryModal,
    UploadForm,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Chat,
    Documents,
    Quiz,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::Chat, Screen::Documents, Screen::Quiz]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Chat => "Chat",
            Screen::Documents => "Documents",
            Screen::Quiz => "Quiz",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Screen::Chat => Screen::Documents,
            Screen::Documents => Screen::Quiz,
            Screen::Quiz => Screen::Chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// One row of the quiz settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizRow {
    Document(usize),
    QuestionType(QuestionType),
    Mode,
    Difficulty,
    Count,
    Topic,
}

/// Startup options gathered from the command line and config file.
pub struct AppOptions {
    pub base_url: String,
    pub start_url: String,
    pub chat_mode: ChatMode,
    pub settings: QuizSettings,
    pub session_id: Option<String>,
}

impl AppOptions {
    pub fn from_config(config: &Config) -> Self {
        let base_url = config.resolved_base_url();
        let mut settings = QuizSettings::new();
        settings.difficulty = config.resolved_difficulty();
        if let Some(n) = config.default_num_questions {
            settings.num_questions = n.clamp(QuizSettings::MIN_QUESTIONS, QuizSettings::MAX_QUESTIONS);
        }
        Self {
            start_url: config.start_url.clone().unwrap_or_else(|| format!("{}/", base_url)),
            base_url,
            chat_mode: config.resolved_chat_mode(),
            settings,
            session_id: None,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub client: EduChatClient,
    pub address_bar: AddressBar,
    pub alerts: AlertCenter,

    // Animation state
    pub animation_frame: u8, // 0-8, three ticks per ellipsis step

    // Chat state
    pub chat: ChatTranscript,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_task: RequestSlot<ChatReply>,
    pub history_task: RequestSlot<(String, Vec<HistoryEntry>)>,

    // Document state
    pub documents: Vec<Document>,
    pub document_view: DocumentListView,
    pub document_state: ListState,
    pub selection: SelectionStore,
    pub documents_task: RequestSlot<Vec<Document>>,
    pub summary_task: RequestSlot<DocumentSummary>,
    pub detail_task: RequestSlot<Document>,
    pub delete_task: RequestSlot<DeletePrompt>,
    pub summary_modal: Option<SummaryModal>,
    pub delete_prompt: Option<DeletePrompt>,
    pub document_detail: Option<Document>,

    // Upload state
    pub show_upload_form: bool,
    pub upload_form: UploadForm,
    pub upload_task: RequestSlot<()>,

    // Quiz state
    pub quiz_settings: QuizSettings,
    pub quiz_selection: SelectionStore,
    pub quiz_row: usize,
    pub quiz_task: RequestSlot<Quiz>,
    pub quiz_view: Option<QuizView>,
    pub quiz_card: usize,

    // Panel areas for mouse hit-testing (updated during render)
    pub alert_areas: Vec<(u64, Rect)>,
    pub modal_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    pending_session: Option<String>,
}

impl App {
    pub fn new(options: AppOptions) -> Result<Self> {
        let client = EduChatClient::new(&options.base_url);
        let address_bar = AddressBar::parse(&options.start_url)?;

        // Pre-check whatever the start location already selects, then keep
        // the location in step with every later change.
        let mut selection = SelectionStore::new();
        if let Some(ids) = address_bar.selected_docs() {
            info!(count = ids.len(), "restoring document selection from url");
            selection.restore(ids);
        }
        selection.subscribe(Box::new(address_bar.clone()));

        let mut document_state = ListState::default();
        document_state.select(Some(0));

        Ok(Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Normal,
            client,
            address_bar,
            alerts: AlertCenter::new(),

            animation_frame: 0,

            chat: ChatTranscript::new(options.chat_mode),
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: RequestSlot::new("chat"),
            history_task: RequestSlot::new("history"),

            documents: Vec::new(),
            document_view: DocumentListView::default(),
            document_state,
            selection,
            documents_task: RequestSlot::new("documents"),
            summary_task: RequestSlot::new("summary"),
            detail_task: RequestSlot::new("detail"),
            delete_task: RequestSlot::new("delete"),
            summary_modal: None,
            delete_prompt: None,
            document_detail: None,

            show_upload_form: false,
            upload_form: UploadForm::new(),
            upload_task: RequestSlot::new("upload"),

            quiz_settings: options.settings,
            quiz_selection: SelectionStore::new(),
            quiz_row: 0,
            quiz_task: RequestSlot::new("quiz"),
            quiz_view: None,
            quiz_card: 0,

            alert_areas: Vec::new(),
            modal_area: None,
            chat_area: None,

            pending_session: options.session_id,
        })
    }

    /// Kicks off the requests every screen needs on load.
    pub fn start(&mut self) {
        self.refresh_documents();
        if let Some(session_id) = self.pending_session.take() {
            let client = self.client.clone();
            self.history_task.start(async move {
                let history = client.session_history(&session_id).await;
                history.map(|entries| (session_id, entries))
            });
        }
    }

    /// Applies whatever requests have completed since the last tick.
    pub async fn poll_tasks(&mut self) {
        let now = Instant::now();
        self.alerts.prune_expired(now);
        if self.summary_modal.as_ref().is_some_and(|m| m.is_finished(now)) {
            self.summary_modal = None;
            self.modal_area = None;
        }

        if let Some(outcome) = self.chat_task.poll_finished().await {
            match outcome {
                Ok(reply) => self.chat.apply_reply(reply),
                Err(e) => self.chat.apply_failure(&e),
            }
            self.scroll_chat_to_bottom();
        }

        if let Some(outcome) = self.history_task.poll_finished().await {
            match outcome {
                Ok((session_id, history)) => {
                    self.chat.load_history(&session_id, &history);
                    self.scroll_chat_to_bottom();
                }
                Err(e) => warn!(error = %e, kind = e.kind(), "error fetching chat history"),
            }
        }

        if let Some(outcome) = self.documents_task.poll_finished().await {
            match outcome {
                Ok(documents) => self.set_documents(documents),
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error refreshing documents");
                    self.alerts.show(
                        "Error loading documents. Please refresh the page.",
                        Severity::Danger,
                    );
                }
            }
        }

        if let Some(outcome) = self.upload_task.poll_finished().await {
            self.upload_form.busy = false;
            match outcome {
                Ok(()) => {
                    self.alerts.show("Document uploaded successfully!", Severity::Success);
                    self.upload_form.reset();
                    self.show_upload_form = false;
                    self.refresh_documents();
                }
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error uploading document");
                    self.alerts.show("Error uploading document. Please try again.", Severity::Danger);
                }
            }
        }

        if let Some(outcome) = self.summary_task.poll_finished().await {
            match outcome {
                Ok(summary) => self.summary_modal = Some(SummaryModal::new(summary)),
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error getting document summary");
                    self.alerts.show(
                        "Error getting document summary. Please try again.",
                        Severity::Danger,
                    );
                }
            }
        }

        if let Some(outcome) = self.detail_task.poll_finished().await {
            match outcome {
                Ok(document) => self.document_detail = Some(document),
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error getting document details");
                    self.alerts.show(
                        "Error loading document details. Please try again.",
                        Severity::Danger,
                    );
                }
            }
        }

        if let Some(outcome) = self.delete_task.poll_finished().await {
            match outcome {
                Ok(prompt) => {
                    info!(document_id = %prompt.document_id, "document deleted");
                    self.alerts.show(prompt.success_message(), Severity::Success);
                    self.refresh_documents();
                }
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error deleting document");
                    self.alerts.show("Error deleting document. Please try again.", Severity::Danger);
                }
            }
        }

        if let Some(outcome) = self.quiz_task.poll_finished().await {
            self.quiz_settings.busy = false;
            match outcome {
                Ok(quiz) => {
                    info!(questions = quiz.questions.len(), "quiz generated");
                    self.quiz_view = Some(QuizView::from_quiz(&quiz));
                    self.quiz_card = 0;
                }
                Err(e) => {
                    error!(error = %e, kind = e.kind(), "error generating quiz");
                    self.alerts.show("Error generating quiz. Please try again.", Severity::Danger);
                }
            }
        }
    }

    // Documents

    /// Re-runs the listing. A listing already in flight may predate the
    /// change being refreshed for, so it is dropped in favour of a new one.
    pub fn refresh_documents(&mut self) {
        if self.documents_task.cancel() {
            debug!("superseding in-flight document listing");
        }
        let client = self.client.clone();
        self.documents_task
            .start(async move { client.list_documents().await });
    }

    fn set_documents(&mut self, documents: Vec<Document>) {
        self.document_view = DocumentListView::build(&documents);
        self.documents = documents;
        let ids = self.document_view.ids();
        self.selection.set_available(ids.clone());
        self.quiz_selection.set_available(ids);

        let len = self.document_view.len();
        let selected = self.document_state.selected().unwrap_or(0);
        self.document_state
            .select(if len == 0 { None } else { Some(selected.min(len - 1)) });
        self.document_detail = None;
    }

    pub fn focused_card_id(&self) -> Option<String> {
        self.document_state
            .selected()
            .and_then(|i| self.document_view.card_at(i))
            .map(|c| c.id.clone())
    }

    pub fn document_nav_down(&mut self) {
        let len = self.document_view.len();
        if len > 0 {
            let i = self.document_state.selected().unwrap_or(0);
            self.document_state.select(Some((i + 1).min(len - 1)));
            self.document_detail = None;
        }
    }

    pub fn document_nav_up(&mut self) {
        let i = self.document_state.selected().unwrap_or(0);
        self.document_state.select(Some(i.saturating_sub(1)));
        self.document_detail = None;
    }

    pub fn toggle_focused_document(&mut self) {
        if let Some(id) = self.focused_card_id() {
            self.selection.toggle(&id);
        }
    }

    pub fn toggle_select_all(&mut self) {
        self.selection.toggle_all();
    }

    pub fn request_summary(&mut self) {
        if let Some(id) = self.focused_card_id() {
            let client = self.client.clone();
            self.summary_task
                .start(async move { client.document_summary(&id).await });
        }
    }

    pub fn request_detail(&mut self) {
        if let Some(id) = self.focused_card_id() {
            let client = self.client.clone();
            self.detail_task
                .start(async move { client.get_document(&id).await });
        }
    }

    pub fn close_summary(&mut self) {
        if let Some(modal) = self.summary_modal.as_mut() {
            modal.close(Instant::now());
        }
    }

    pub fn prompt_delete(&mut self) {
        if self.delete_task.is_busy() {
            debug!("delete already in flight; not prompting");
            return;
        }
        let card = self
            .document_state
            .selected()
            .and_then(|i| self.document_view.card_at(i));
        if let Some(card) = card {
            self.delete_prompt = Some(DeletePrompt::new(card));
        }
    }

    pub fn answer_delete_prompt(&mut self, confirmed: bool) {
        let Some(prompt) = self.delete_prompt.take() else {
            return;
        };
        let kept = prompt.clone();
        if prompt.resolve(confirmed).is_some() {
            let client = self.client.clone();
            let document_id = kept.document_id.clone();
            self.delete_task.start(async move {
                client.delete_document(&document_id).await.map(|_| kept)
            });
        }
    }

    /// Titles of the documents the next chat message will be about.
    pub fn chat_context_titles(&self) -> Vec<String> {
        resolve_document_ids(&self.address_bar, &self.selection)
            .iter()
            .map(|id| {
                self.document_view
                    .cards()
                    .find(|c| &c.id == id)
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| id.clone())
            })
            .collect()
    }

    // Chat

    pub fn submit_chat(&mut self) {
        if self.chat_task.is_busy() {
            return;
        }
        let document_ids = resolve_document_ids(&self.address_bar, &self.selection);
        if let Some(request) = self.chat.submit(&self.chat_input, document_ids) {
            self.chat_input.clear();
            self.chat_cursor = 0;
            let client = self.client.clone();
            self.chat_task.start(async move { client.send_chat(request).await });
            // Scroll to bottom so "Thinking..." is visible
            self.scroll_chat_to_bottom();
        }
    }

    pub fn cycle_chat_mode(&mut self) {
        self.chat.mode = self.chat.mode.next();
        if let Err(e) = Config::save_chat_mode(self.chat.mode) {
            warn!(error = %e, "could not save chat mode");
        }
    }

    // Upload

    pub fn open_upload_form(&mut self) {
        self.show_upload_form = true;
    }

    pub fn submit_upload(&mut self) {
        if self.upload_task.is_busy() {
            return;
        }
        if let Some(request) = self.upload_form.prepare(&mut self.alerts) {
            self.upload_form.busy = true;
            let client = self.client.clone();
            self.upload_task
                .start(async move { client.upload_document(&request).await.map(|_| ()) });
        }
    }

    // Quiz

    pub fn quiz_rows(&self) -> Vec<QuizRow> {
        let mut rows: Vec<QuizRow> = (0..self.document_view.len()).map(QuizRow::Document).collect();
        rows.extend(QuestionType::all().into_iter().map(QuizRow::QuestionType));
        rows.extend([QuizRow::Mode, QuizRow::Difficulty, QuizRow::Count]);
        if self.quiz_settings.mode == QuizMode::Topic {
            rows.push(QuizRow::Topic);
        }
        rows
    }

    pub fn current_quiz_row(&self) -> Option<QuizRow> {
        self.quiz_rows().get(self.quiz_row).copied()
    }

    pub fn quiz_row_down(&mut self) {
        let len = self.quiz_rows().len();
        if len > 0 {
            self.quiz_row = (self.quiz_row + 1).min(len - 1);
        }
    }

    pub fn quiz_row_up(&mut self) {
        self.quiz_row = self.quiz_row.saturating_sub(1);
    }

    /// Space/Enter on a settings row: toggle, cycle, or start editing.
    pub fn activate_quiz_row(&mut self) {
        match self.current_quiz_row() {
            Some(QuizRow::Document(i)) => {
                if let Some(id) = self.document_view.card_at(i).map(|c| c.id.clone()) {
                    self.quiz_selection.toggle(&id);
                }
            }
            Some(QuizRow::QuestionType(kind)) => self.quiz_settings.toggle_question_type(kind),
            Some(QuizRow::Mode) => {
                self.quiz_settings.mode = self.quiz_settings.mode.next();
                let len = self.quiz_rows().len();
                self.quiz_row = self.quiz_row.min(len.saturating_sub(1));
            }
            Some(QuizRow::Difficulty) => {
                self.quiz_settings.difficulty = self.quiz_settings.difficulty.next()
            }
            Some(QuizRow::Count) => self.quiz_settings.increase_questions(),
            Some(QuizRow::Topic) => self.input_mode = InputMode::Editing,
            None => {}
        }
    }

    pub fn submit_quiz(&mut self) {
        if self.quiz_task.is_busy() {
            return;
        }
        let document_ids = self.quiz_selection.selected().to_vec();
        if let Some(request) = self.quiz_settings.prepare(&document_ids, &mut self.alerts) {
            self.quiz_settings.busy = true;
            let mode = self.quiz_settings.mode;
            let client = self.client.clone();
            self.quiz_task
                .start(async move { client.generate_quiz(mode, &request).await });
        }
    }

    pub fn quiz_card_down(&mut self) {
        if let Some(view) = &self.quiz_view {
            let len = view.cards.len();
            if len > 0 {
                self.quiz_card = (self.quiz_card + 1).min(len - 1);
            }
        }
    }

    pub fn quiz_card_up(&mut self) {
        self.quiz_card = self.quiz_card.saturating_sub(1);
    }

    /// Moves the radio selection of the focused card by `delta`.
    pub fn shift_quiz_option(&mut self, delta: isize) {
        let card = self.quiz_card;
        if let Some(view) = self.quiz_view.as_mut() {
            let Some(c) = view.cards.get(card) else {
                return;
            };
            let count = c.option_count();
            if count == 0 {
                return;
            }
            let next = match c.selected_option {
                None if delta < 0 => count - 1,
                None => 0,
                Some(i) => (i as isize + delta).clamp(0, count as isize - 1) as usize,
            };
            view.select_option(card, next);
        }
    }

    pub fn check_quiz_answers(&mut self) {
        if let Some(view) = self.quiz_view.as_mut() {
            view.grade();
        }
    }

    pub fn new_quiz(&mut self) {
        self.quiz_view = None;
        self.quiz_card = 0;
    }

    // Requests

    /// Aborts whatever the current screen is waiting on.
    pub fn cancel_active_request(&mut self) -> bool {
        match self.screen {
            Screen::Chat => {
                let cancelled = self.chat_task.cancel();
                if cancelled {
                    self.chat.cancel_pending();
                }
                cancelled
            }
            Screen::Documents => {
                let mut cancelled = self.documents_task.cancel();
                cancelled |= self.summary_task.cancel();
                cancelled |= self.detail_task.cancel();
                cancelled |= self.delete_task.cancel();
                cancelled
            }
            Screen::Quiz => {
                let cancelled = self.quiz_task.cancel();
                if cancelled {
                    self.quiz_settings.busy = false;
                }
                cancelled
            }
        }
    }

    pub fn cancel_upload(&mut self) {
        if self.upload_task.cancel() {
            self.upload_form.busy = false;
        }
    }

    // Alerts

    pub fn dismiss_alert_at(&mut self, x: u16, y: u16) -> bool {
        let hit = self
            .alert_areas
            .iter()
            .find(|(_, r)| point_in_rect(x, y, *r))
            .map(|(id, _)| *id);
        match hit {
            Some(id) => self.alerts.dismiss(id),
            None => false,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 9;
        }
    }

    /// Scroll chat to bottom so the newest message is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for msg in self.chat.messages() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "Tutor:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines = total_lines.saturating_add(char_count / wrap_width + 1);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.chat.is_typing() {
            total_lines = total_lines.saturating_add(2); // "Tutor:" + typing indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height as usize
        } else {
            20
        };

        if total_lines > visible_height {
            let overflow = total_lines - visible_height;
            self.chat_scroll = u16::try_from(overflow).unwrap_or(u16::MAX);
        }
    }
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options(start_url: &str) -> AppOptions {
        AppOptions {
            base_url: "http://localhost:8000".to_string(),
            start_url: start_url.to_string(),
            chat_mode: ChatMode::Standard,
            settings: QuizSettings::new(),
            session_id: None,
        }
    }

    fn doc(id: &str, title: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            file_type: "pdf".to_string(),
            ..Document::default()
        }
    }

    #[test]
    fn test_start_url_preselects_documents() {
        let mut app = App::new(options("http://localhost:8000/?selected_docs=b")).unwrap();
        app.set_documents(vec![doc("a", "Alpha"), doc("b", "Beta")]);
        assert!(app.selection.is_selected("b"));
        assert!(!app.selection.is_selected("a"));
        assert_eq!(app.chat_context_titles(), vec!["Beta"]);
    }

    #[test]
    fn test_select_all_updates_address_bar() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.set_documents(vec![doc("a", "Alpha"), doc("b", "Beta")]);

        app.toggle_select_all();
        assert_eq!(
            app.address_bar.selected_docs(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        app.toggle_select_all();
        assert_eq!(app.address_bar.selected_docs(), None);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.set_documents(vec![doc("a", "Alpha")]);

        app.prompt_delete();
        assert_eq!(
            app.delete_prompt.as_ref().map(|p| p.message()),
            Some("Are you sure you want to delete \"Alpha\"?".to_string())
        );
        app.answer_delete_prompt(false);
        assert!(app.delete_prompt.is_none());
        assert!(!app.delete_task.is_busy());
        assert_eq!(app.document_view.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_after_delete_supersedes_stale_listing() {
        let mut opts = options("http://127.0.0.1:9/");
        opts.base_url = "http://127.0.0.1:9".to_string();
        let mut app = App::new(opts).unwrap();
        app.set_documents(vec![doc("a", "Alpha"), doc("b", "Beta")]);
        let prompt = app
            .document_view
            .cards()
            .find(|c| c.id == "a")
            .map(DeletePrompt::new)
            .unwrap();
        app.set_documents(vec![doc("b", "Beta")]);

        // Listing taken before the delete landed; it still reports "a".
        app.documents_task.start(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok(vec![doc("a", "Alpha"), doc("b", "Beta")])
        });
        app.delete_task.start(async move { Ok(prompt) });

        while app.delete_task.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
            app.poll_tasks().await;
        }
        assert!(app.documents_task.is_busy());
        assert!(app
            .alerts
            .alerts()
            .iter()
            .any(|a| a.severity == Severity::Success));

        tokio::time::sleep(Duration::from_millis(150)).await;
        app.poll_tasks().await;
        assert_eq!(app.document_view.len(), 1);
        assert!(app.document_view.cards().all(|c| c.id != "a"));
    }

    #[tokio::test]
    async fn test_no_delete_prompt_while_delete_in_flight() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.set_documents(vec![doc("a", "Alpha"), doc("b", "Beta")]);
        let pending = app.document_view.card_at(0).map(DeletePrompt::new).unwrap();
        app.delete_task.start(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(pending)
        });

        app.prompt_delete();
        assert!(app.delete_prompt.is_none());

        app.delete_task.cancel();
        app.prompt_delete();
        assert!(app.delete_prompt.is_some());
    }

    #[test]
    fn test_chat_scroll_clamps_on_huge_transcript() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.chat_height = 20;
        app.chat_width = 50;

        app.chat.submit("short question", vec![]);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 0);

        app.chat.submit(&"x\n".repeat(70_000), vec![]);
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX);
    }

    #[tokio::test]
    async fn test_whitespace_chat_sends_nothing() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.chat_input = "   ".to_string();
        app.submit_chat();
        assert!(!app.chat_task.is_busy());
        assert!(app.chat.messages().is_empty());
        assert_eq!(app.chat_input, "   ");
    }

    #[tokio::test]
    async fn test_upload_without_file_warns() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.submit_upload();
        assert!(!app.upload_task.is_busy());
        assert!(!app.upload_form.busy);
        assert_eq!(app.alerts.alerts()[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn test_topic_quiz_requires_topic() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        app.set_documents(vec![doc("a", "Alpha")]);
        app.quiz_selection.toggle("a");
        app.quiz_settings.mode = QuizMode::Topic;

        app.submit_quiz();
        assert!(!app.quiz_task.is_busy());
        assert_eq!(app.alerts.alerts()[0].message, "Please enter a topic");
        assert!(app.quiz_rows().contains(&QuizRow::Topic));
    }

    #[test]
    fn test_quiz_option_shifting_clamps() {
        let mut app = App::new(options("http://localhost:8000/")).unwrap();
        let quiz = Quiz {
            questions: vec![educhat_core::api::types::Question {
                question: "Sky is blue?".to_string(),
                kind: Some("true_false".to_string()),
                answer: "True".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        app.quiz_view = Some(QuizView::from_quiz(&quiz));

        app.shift_quiz_option(-1);
        assert_eq!(app.quiz_view.as_ref().unwrap().cards[0].selected_option, Some(1));
        app.shift_quiz_option(5);
        assert_eq!(app.quiz_view.as_ref().unwrap().cards[0].selected_option, Some(1));
        app.shift_quiz_option(-1);
        app.check_quiz_answers();
        let score = app.quiz_view.as_ref().unwrap().score.clone().unwrap();
        assert_eq!(score.correct, 1);
    }
}
