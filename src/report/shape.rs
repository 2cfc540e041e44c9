//! Report document shapes
//!
//! The storage service has returned history under several wrappers over
//! time. Each known wrapper is tried in a fixed order and must validate
//! strictly: the wrapper key has to hold an array of JSON objects. A
//! document matching none of them is rejected.

use serde_json::Value;
use thiserror::Error;

use crate::history::RawEntry;

/// Known wrappers around the entry list, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// `{"entries": [...]}`
    Entries,
    /// `{"history": [...]}`
    History,
    /// `{"data": [...]}`
    Data,
    /// `{"data": {"entries": [...]}}`
    NestedEntries,
    /// `[...]`
    BareArray,
}

impl DocumentShape {
    /// Every shape in the order they are tried
    pub fn all() -> &'static [DocumentShape] {
        &[
            DocumentShape::Entries,
            DocumentShape::History,
            DocumentShape::Data,
            DocumentShape::NestedEntries,
            DocumentShape::BareArray,
        ]
    }

    fn extract<'a>(&self, document: &'a Value) -> Option<&'a Vec<Value>> {
        let list = match self {
            DocumentShape::Entries => document.get("entries"),
            DocumentShape::History => document.get("history"),
            DocumentShape::Data => document.get("data"),
            DocumentShape::NestedEntries => document.get("data").and_then(|d| d.get("entries")),
            DocumentShape::BareArray => Some(document),
        }?;

        list.as_array()
            .filter(|items| items.iter().all(Value::is_object))
    }
}

impl std::fmt::Display for DocumentShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentShape::Entries => write!(f, "entries"),
            DocumentShape::History => write!(f, "history"),
            DocumentShape::Data => write!(f, "data"),
            DocumentShape::NestedEntries => write!(f, "data.entries"),
            DocumentShape::BareArray => write!(f, "array"),
        }
    }
}

/// A report document reduced to its entry list
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub shape: DocumentShape,
    pub entries: Vec<RawEntry>,
}

impl ReportDocument {
    /// Recognize a parsed JSON document
    pub fn from_value(document: &Value) -> Result<Self, ShapeError> {
        for shape in DocumentShape::all() {
            if let Some(items) = shape.extract(document) {
                let entries = items.iter().cloned().map(RawEntry::from).collect();
                return Ok(Self {
                    shape: *shape,
                    entries,
                });
            }
        }

        Err(ShapeError::Unrecognized)
    }

    /// Parse and recognize a JSON document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ShapeError> {
        let document: Value =
            serde_json::from_slice(bytes).map_err(|e| ShapeError::InvalidJson(e.to_string()))?;
        Self::from_value(&document)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Errors recognizing a report document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Unrecognized report document shape")]
    Unrecognized,
}
