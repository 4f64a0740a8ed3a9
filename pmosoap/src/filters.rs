//! Post-traitement du texte extrait, par opération
//!
//! Certains serveurs renvoient un texte qu'il faut encore nettoyer ou
//! inspecter. Ces règles sont enregistrées par nom d'opération et ne
//! concernent que l'extraction texte ([`crate::SoapResponse::text`]).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::SoapError;

/// Operation historically served by [`JournalNumberFilter`].
pub const EXECUTE_OPERATION: &str = "Execute";

/// Transforms or rejects the text extracted for one operation.
pub trait TextFilter: fmt::Debug + Send + Sync {
    fn apply(&self, operation: &str, text: String) -> Result<String, SoapError>;
}

/// Journal posting responses.
///
/// Fails when the text carries the failure marker, otherwise strips the
/// element markers around the journal number. Both the entity-encoded
/// (`&lt;JournalNumber&gt;`) and the plain (`<JournalNumber>`) forms are
/// recognised; only exact markers are removed.
#[derive(Debug, Clone)]
pub struct JournalNumberFilter {
    element: String,
    failure_marker: String,
}

impl Default for JournalNumberFilter {
    fn default() -> Self {
        Self::new("JournalNumber", r#"status="fail""#)
    }
}

impl JournalNumberFilter {
    pub fn new(element: impl Into<String>, failure_marker: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            failure_marker: failure_marker.into(),
        }
    }

    fn strip_markers<'a>(&self, text: &'a str) -> &'a str {
        let element = &self.element;
        let openings = [format!("&lt;{element}&gt;"), format!("<{element}>")];
        let closings = [format!("&lt;/{element}&gt;"), format!("</{element}>")];

        let mut inner = text.trim();
        if let Some(rest) = openings.iter().find_map(|m| inner.strip_prefix(m.as_str())) {
            inner = rest;
        }
        if let Some(rest) = closings.iter().find_map(|m| inner.strip_suffix(m.as_str())) {
            inner = rest;
        }
        inner
    }
}

impl TextFilter for JournalNumberFilter {
    fn apply(&self, operation: &str, text: String) -> Result<String, SoapError> {
        if text.contains(&self.failure_marker) {
            return Err(SoapError::operation_failed(operation));
        }
        Ok(self.strip_markers(&text).to_string())
    }
}

/// Filters indexed by operation name.
#[derive(Debug, Clone)]
pub struct TextFilters {
    filters: HashMap<String, Arc<dyn TextFilter>>,
}

impl Default for TextFilters {
    /// Registers [`JournalNumberFilter`] for [`EXECUTE_OPERATION`].
    fn default() -> Self {
        Self::empty().with(EXECUTE_OPERATION, JournalNumberFilter::default())
    }
}

impl TextFilters {
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    pub fn with(mut self, operation: impl Into<String>, filter: impl TextFilter + 'static) -> Self {
        self.insert(operation, Arc::new(filter));
        self
    }

    pub fn insert(&mut self, operation: impl Into<String>, filter: Arc<dyn TextFilter>) {
        self.filters.insert(operation.into(), filter);
    }

    pub fn remove(&mut self, operation: &str) -> Option<Arc<dyn TextFilter>> {
        self.filters.remove(operation)
    }

    pub fn get(&self, operation: &str) -> Option<Arc<dyn TextFilter>> {
        self.filters.get(operation).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str) -> Result<String, SoapError> {
        JournalNumberFilter::default().apply(EXECUTE_OPERATION, text.to_string())
    }

    #[test]
    fn test_strips_encoded_markers() {
        let text = "&lt;JournalNumber&gt;ABC123&lt;/JournalNumber&gt;";
        assert_eq!(apply(text).unwrap(), "ABC123");
    }

    #[test]
    fn test_strips_plain_markers() {
        assert_eq!(
            apply("  <JournalNumber>ABC123</JournalNumber>\n").unwrap(),
            "ABC123"
        );
    }

    #[test]
    fn test_keeps_marker_characters_inside_value() {
        // Les caractères des marqueurs ne doivent pas être rognés
        assert_eq!(
            apply("&lt;JournalNumber&gt;gateJournal;&lt;/JournalNumber&gt;").unwrap(),
            "gateJournal;"
        );
        assert_eq!(apply("plain text").unwrap(), "plain text");
    }

    #[test]
    fn test_failure_marker() {
        let text = r#"<Response status="fail"><Message>locked</Message></Response>"#;
        assert!(matches!(apply(text), Err(SoapError::OperationFailed(op)) if op == "Execute"));
    }

    #[test]
    fn test_registry() {
        let mut filters = TextFilters::default();
        assert!(filters.get(EXECUTE_OPERATION).is_some());
        assert!(filters.get("Query").is_none());

        filters.remove(EXECUTE_OPERATION);
        assert!(filters.get(EXECUTE_OPERATION).is_none());
        assert!(TextFilters::empty().get(EXECUTE_OPERATION).is_none());
    }
}
