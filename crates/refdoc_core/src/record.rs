use serde::{Deserialize, Serialize};

use crate::EntryKind;

/// Placeholder stored in [`EntryRecord::example`] when a page has no example.
pub const NO_EXAMPLE: &str = "no example found";

/// One normalized reference entry.
///
/// Serialized field order and names form the output file schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// `"<Kind>: <heading>"`.
    pub title: String,
    #[serde(rename = "type")]
    pub type_signature: String,
    pub description: String,
    pub syntax: String,
    /// Verbatim code, or [`NO_EXAMPLE`].
    pub example: String,
    pub remarks: Vec<String>,
    pub related_topics: Vec<String>,
}

/// Field values gathered from a page before the title is composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFields {
    pub description: String,
    pub type_signature: String,
    pub syntax: String,
    pub example: Option<String>,
    pub remarks: Vec<String>,
    pub related_topics: Vec<String>,
}

impl EntryRecord {
    /// Assemble a record. Returns `None` for a blank heading.
    pub fn compose(kind: EntryKind, heading: &str, fields: EntryFields) -> Option<Self> {
        let heading = heading.trim();
        if heading.is_empty() {
            return None;
        }

        let example = fields
            .example
            .filter(|code| !code.trim().is_empty())
            .unwrap_or_else(|| NO_EXAMPLE.to_string());

        Some(Self {
            title: compose_title(kind, heading),
            type_signature: fields.type_signature,
            description: fields.description,
            syntax: fields.syntax,
            example,
            remarks: fields.remarks,
            related_topics: dedupe_preserving_order(fields.related_topics),
        })
    }
}

pub fn compose_title(kind: EntryKind, heading: &str) -> String {
    format!("{}: {}", kind.label(), heading)
}

/// Split a section body into its non-empty lines.
pub fn split_remarks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
