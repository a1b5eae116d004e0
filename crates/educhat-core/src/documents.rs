//! Document listing view-model, summary modal and delete confirmation.

use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::api::types::{Document, DocumentSummary};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const EMPTY_LIST_MESSAGE: &str = "No documents uploaded yet.";
/// How long the summary modal fades before it is removed.
pub const MODAL_FADE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentIcon {
    Pdf,
    Word,
    PowerPoint,
    Image,
    Generic,
}

impl DocumentIcon {
    pub fn from_file_type(file_type: &str) -> Self {
        match file_type {
            "pdf" => DocumentIcon::Pdf,
            "doc" | "docx" => DocumentIcon::Word,
            "ppt" | "pptx" => DocumentIcon::PowerPoint,
            "jpg" | "jpeg" | "png" => DocumentIcon::Image,
            _ => DocumentIcon::Generic,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            DocumentIcon::Pdf => "📕",
            DocumentIcon::Word => "📘",
            DocumentIcon::PowerPoint => "📙",
            DocumentIcon::Image => "🖼",
            DocumentIcon::Generic => "📄",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCard {
    pub id: String,
    pub title: String,
    pub icon: DocumentIcon,
    pub meta: String,
}

impl DocumentCard {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: display_title(doc),
            icon: DocumentIcon::from_file_type(&doc.file_type),
            meta: format!(
                "Type: {} | Uploaded: {}",
                doc.file_type.to_uppercase(),
                format_upload_date(&doc.upload_date)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySection {
    pub name: String,
    pub cards: Vec<DocumentCard>,
}

/// Documents grouped by category, in the order categories first appear.
#[derive(Debug, Clone, Default)]
pub struct DocumentListView {
    pub sections: Vec<CategorySection>,
}

impl DocumentListView {
    pub fn build(documents: &[Document]) -> Self {
        let mut sections: Vec<CategorySection> = Vec::new();
        for doc in documents {
            let category = doc
                .category
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(UNCATEGORIZED);
            let card = DocumentCard::from_document(doc);
            match sections.iter_mut().find(|s| s.name == category) {
                Some(section) => section.cards.push(card),
                None => sections.push(CategorySection {
                    name: category.to_string(),
                    cards: vec![card],
                }),
            }
        }
        Self { sections }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }

    /// Cards in display order, flattened across sections.
    pub fn cards(&self) -> impl Iterator<Item = &DocumentCard> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    pub fn card_at(&self, index: usize) -> Option<&DocumentCard> {
        self.cards().nth(index)
    }

    pub fn ids(&self) -> Vec<String> {
        self.cards().map(|c| c.id.clone()).collect()
    }
}

pub fn display_title(doc: &Document) -> String {
    if !doc.title.is_empty() {
        doc.title.clone()
    } else if !doc.original_filename.is_empty() {
        doc.original_filename.clone()
    } else {
        "Untitled".to_string()
    }
}

/// Renders the server's ISO timestamp as a short date; unknown formats pass through.
pub fn format_upload_date(raw: &str) -> String {
    const SHORT: &str = "%m/%d/%Y";
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(SHORT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(SHORT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(SHORT).to_string();
    }
    raw.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Visible,
    FadingOut(Instant),
}

#[derive(Debug, Clone)]
pub struct SummaryModal {
    pub title: String,
    pub summary: String,
    pub phase: ModalPhase,
}

impl SummaryModal {
    pub fn new(summary: DocumentSummary) -> Self {
        Self {
            title: summary.title,
            summary: summary.summary,
            phase: ModalPhase::Visible,
        }
    }

    /// Starts the fade; closing twice keeps the first start time.
    pub fn close(&mut self, now: Instant) {
        if self.phase == ModalPhase::Visible {
            self.phase = ModalPhase::FadingOut(now);
        }
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.phase, ModalPhase::FadingOut(_))
    }

    /// True once the fade has run its course and the modal should be dropped.
    pub fn is_finished(&self, now: Instant) -> bool {
        match self.phase {
            ModalPhase::Visible => false,
            ModalPhase::FadingOut(since) => now.saturating_duration_since(since) >= MODAL_FADE,
        }
    }
}

/// A pending delete waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub document_id: String,
    pub title: String,
}

impl DeletePrompt {
    pub fn new(card: &DocumentCard) -> Self {
        Self {
            document_id: card.id.clone(),
            title: card.title.clone(),
        }
    }

    pub fn message(&self) -> String {
        format!("Are you sure you want to delete \"{}\"?", self.title)
    }

    /// The id to delete, or `None` when the user declined.
    pub fn resolve(self, confirmed: bool) -> Option<String> {
        confirmed.then_some(self.document_id)
    }

    pub fn success_message(&self) -> String {
        format!("Document \"{}\" deleted successfully", self.title)
    }
}
