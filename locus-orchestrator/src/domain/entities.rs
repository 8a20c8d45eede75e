//! Orchestrator domain entities

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::value_objects::{OrderToken, SourceKind};

/// One language row as emitted by the counting engine.
///
/// Field names follow the engine's JSON schema. Both the capitalised and
/// lowercase spellings are accepted; numeric fields missing from a row
/// count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageRecordIn {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Count", alias = "count", default)]
    pub files: u64,
    #[serde(rename = "Lines", alias = "lines", default)]
    pub lines: u64,
    #[serde(rename = "Blank", alias = "blank", default)]
    pub blanks: u64,
    #[serde(rename = "Comment", alias = "comment", default)]
    pub comments: u64,
    #[serde(rename = "Code", alias = "code", default)]
    pub code: u64,
}

/// One language row of the public response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LanguageRecordOut {
    #[schema(example = "Rust")]
    pub language: String,
    #[schema(example = 12)]
    pub files: u64,
    #[schema(example = 1830)]
    pub lines: u64,
    #[schema(example = 201)]
    pub blanks: u64,
    #[schema(example = 96)]
    pub comments: u64,
    #[serde(rename = "linesOfCode")]
    #[schema(example = 1533)]
    pub lines_of_code: u64,
}

impl From<&LanguageRecordIn> for LanguageRecordOut {
    fn from(record: &LanguageRecordIn) -> Self {
        Self {
            language: record.name.clone(),
            files: record.files,
            lines: record.lines,
            blanks: record.blanks,
            comments: record.comments,
            lines_of_code: record.code,
        }
    }
}

/// Mutable state of one analysis request.
///
/// Owned by the handling task; nothing in here is shared between requests.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub order: OrderToken,
    pub source: SourceKind,
    /// Repository identifier, or the uploaded filename once known.
    pub target: String,
    pub workspace: Option<PathBuf>,
    /// Size reported by the source provider, in MB.
    pub size_mb: u64,
    pub languages_in: Vec<LanguageRecordIn>,
    pub languages_out: Vec<LanguageRecordOut>,
}

impl RequestContext {
    pub fn new(order: OrderToken, source: SourceKind, target: impl Into<String>) -> Self {
        Self {
            order,
            source,
            target: target.into(),
            workspace: None,
            size_mb: 0,
            languages_in: Vec::new(),
            languages_out: Vec::new(),
        }
    }
}
