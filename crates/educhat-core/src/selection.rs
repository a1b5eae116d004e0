//! Document selection store and its address-bar mirror.
//!
//! The store is the single owner of which documents are checked. Observers are
//! told the full ordered selection after every change; the address bar is one
//! of them and keeps the `selected_docs` query parameter in step.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Url;
use tracing::debug;

use crate::error::{ClientError, Result};

pub const SELECTED_DOCS_PARAM: &str = "selected_docs";

pub trait SelectionObserver: Send {
    fn selection_changed(&mut self, selected: &[String]);
}

pub struct SelectionStore {
    available: Vec<String>,
    selected: Vec<String>,
    observers: Vec<Box<dyn SelectionObserver>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self {
            available: Vec::new(),
            selected: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Seeds the selection (e.g. from the start URL) without notifying observers.
    pub fn restore(&mut self, ids: impl IntoIterator<Item = String>) {
        self.selected.clear();
        for id in ids {
            if !id.is_empty() && !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
        self.reorder();
    }

    pub fn subscribe(&mut self, observer: Box<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    /// Replaces the set of selectable documents. Selections of documents that
    /// no longer exist are dropped; observers hear about it only if that
    /// changed the selection.
    pub fn set_available(&mut self, ids: Vec<String>) {
        self.available = ids;
        let before = self.selected.len();
        let available: HashSet<&String> = self.available.iter().collect();
        self.selected.retain(|id| available.contains(id));
        self.reorder();
        if self.selected.len() != before {
            self.notify();
        }
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True when every available document is checked (the "select all" box state).
    pub fn all_selected(&self) -> bool {
        !self.available.is_empty() && self.available.iter().all(|id| self.is_selected(id))
    }

    pub fn toggle(&mut self, id: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id.to_string());
            self.reorder();
        }
        self.notify();
    }

    pub fn set_all(&mut self, checked: bool) {
        if checked {
            self.selected = self.available.clone();
        } else {
            self.selected.clear();
        }
        self.notify();
    }

    /// Flips the "select all" box: everything when anything is unchecked, nothing otherwise.
    pub fn toggle_all(&mut self) {
        let checked = !self.all_selected();
        self.set_all(checked);
    }

    // Selection follows listing order, the same order the checkboxes appear in.
    fn reorder(&mut self) {
        let available = &self.available;
        self.selected.sort_by_key(|id| {
            available
                .iter()
                .position(|a| a == id)
                .unwrap_or(usize::MAX)
        });
    }

    fn notify(&mut self) {
        debug!(count = self.selected.len(), "document selection changed");
        for observer in self.observers.iter_mut() {
            observer.selection_changed(&self.selected);
        }
    }
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle on the client's current location.
#[derive(Clone)]
pub struct AddressBar {
    url: Arc<Mutex<Url>>,
}

impl AddressBar {
    pub fn parse(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            url: Arc::new(Mutex::new(parsed)),
        })
    }

    pub fn current(&self) -> Url {
        self.url.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn as_string(&self) -> String {
        self.current().to_string()
    }

    /// The ids in `selected_docs`, or `None` when the parameter is absent or blank.
    pub fn selected_docs(&self) -> Option<Vec<String>> {
        let url = self.current();
        let raw = url
            .query_pairs()
            .find(|(key, _)| key == SELECTED_DOCS_PARAM)
            .map(|(_, value)| value.into_owned())?;
        if raw.is_empty() {
            return None;
        }
        Some(raw.split(',').map(str::to_string).collect())
    }

    /// Rewrites `selected_docs` in place, keeping every other parameter.
    pub fn set_selected_docs(&self, ids: &[String]) {
        let mut url = self.url.lock().unwrap_or_else(PoisonError::into_inner);
        let others: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != SELECTED_DOCS_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if others.is_empty() && ids.is_empty() {
            url.set_query(None);
            return;
        }

        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &others {
            pairs.append_pair(key, value);
        }
        if !ids.is_empty() {
            pairs.append_pair(SELECTED_DOCS_PARAM, &ids.join(","));
        }
    }
}

impl SelectionObserver for AddressBar {
    fn selection_changed(&mut self, selected: &[String]) {
        self.set_selected_docs(selected);
    }
}
