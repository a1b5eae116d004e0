use std::path::PathBuf;

use crate::alerts::{AlertCenter, Severity};
use crate::error::{ClientError, Result};

/// A validated upload, ready to be sent as multipart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadField {
    #[default]
    File,
    Title,
    Category,
}

impl UploadField {
    pub fn next(&self) -> Self {
        match self {
            UploadField::File => UploadField::Title,
            UploadField::Title => UploadField::Category,
            UploadField::Category => UploadField::File,
        }
    }
}

/// The upload form: a file path plus optional title and category.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file_path: String,
    pub title: String,
    pub category: String,
    pub focus: UploadField,
    pub busy: bool,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field_mut(&mut self, field: UploadField) -> &mut String {
        match field {
            UploadField::File => &mut self.file_path,
            UploadField::Title => &mut self.title,
            UploadField::Category => &mut self.category,
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            "Uploading..."
        } else {
            "Upload"
        }
    }

    pub fn build_request(&self) -> Result<UploadRequest> {
        let path = self.file_path.trim();
        if path.is_empty() {
            return Err(ClientError::validation("Please select a file to upload"));
        }
        Ok(UploadRequest {
            file_path: PathBuf::from(path),
            title: non_empty(&self.title),
            category: non_empty(&self.category),
        })
    }

    /// Like `build_request`, but a missing file becomes a warning alert.
    pub fn prepare(&self, alerts: &mut AlertCenter) -> Option<UploadRequest> {
        match self.build_request() {
            Ok(request) => Some(request),
            Err(e) => {
                alerts.show(e.to_string(), Severity::Warning);
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            busy: self.busy,
            ..Self::default()
        };
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_warns_without_request() {
        let form = UploadForm::new();
        let mut alerts = AlertCenter::new();

        assert!(form.prepare(&mut alerts).is_none());
        assert_eq!(alerts.alerts().len(), 1);
        assert_eq!(alerts.alerts()[0].severity, Severity::Warning);
        assert_eq!(alerts.alerts()[0].message, "Please select a file to upload");
    }

    #[test]
    fn test_optional_fields_only_when_filled() {
        let mut form = UploadForm::new();
        form.file_path = "/tmp/lecture.pdf".to_string();
        form.category = "Biology".to_string();

        let request = form.build_request().unwrap();
        assert_eq!(request.file_path, PathBuf::from("/tmp/lecture.pdf"));
        assert_eq!(request.title, None);
        assert_eq!(request.category.as_deref(), Some("Biology"));
    }

    #[test]
    fn test_reset_clears_fields() {
        let mut form = UploadForm::new();
        form.file_path = "a.pdf".to_string();
        form.title = "A".to_string();
        form.focus = UploadField::Title;
        form.reset();
        assert!(form.file_path.is_empty());
        assert!(form.title.is_empty());
        assert_eq!(form.focus, UploadField::File);
    }

    #[test]
    fn test_busy_label() {
        let mut form = UploadForm::new();
        assert_eq!(form.submit_label(), "Upload");
        form.busy = true;
        assert_eq!(form.submit_label(), "Uploading...");
    }
}
