//! Content document model
//!
//! The document is a JSON object of named sections. A section is either a
//! scalar value or a mapping of fields; merging only looks one level deep.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::form::{ContentUpdate, SectionUpdate};

/// Value bound to a top-level key of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentValue {
    /// A JSON object; its fields may hold any JSON value
    Section(Map<String, Value>),
    /// Any non-object JSON value
    Scalar(Value),
}

/// The single persisted content document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument {
    sections: IndexMap<String, ContentValue>,
}

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str) -> Option<&ContentValue> {
        self.sections.get(section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContentValue)> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Merge an update into the document.
    ///
    /// Fields of an existing section are overwritten one by one and the
    /// rest kept. A scalar update, or fields aimed at a key that is absent
    /// or holds a scalar, replace the stored value wholesale. Sections the
    /// update does not name are left alone.
    pub fn apply(&mut self, update: ContentUpdate) {
        for (section, incoming) in update {
            let replacement = match (self.sections.get_mut(&section), incoming) {
                (Some(ContentValue::Section(existing)), SectionUpdate::Fields(fields)) => {
                    for (field, value) in fields {
                        existing.insert(field, Value::String(value));
                    }
                    continue;
                }
                (_, incoming) => incoming.into_value(),
            };
            self.sections.insert(section, replacement);
        }
    }
}

impl SectionUpdate {
    fn into_value(self) -> ContentValue {
        match self {
            Self::Scalar(value) => ContentValue::Scalar(Value::String(value)),
            Self::Fields(fields) => ContentValue::Section(
                fields
                    .into_iter()
                    .map(|(field, value)| (field, Value::String(value)))
                    .collect(),
            ),
        }
    }
}
