//! Content model structs for documents, classification results and reports.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A markdown document in the vault, identified by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Forward-slash path relative to the vault root (e.g. "notes/Rust.md")
    pub path: String,

    /// File name including extension (e.g. "Rust.md")
    pub name: String,

    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl Document {
    pub fn new(path: impl Into<String>, modified: DateTime<Utc>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            modified,
        }
    }

    /// Name without its extension, which is what `[[links]]` refer to
    pub fn bare_name(&self) -> &str {
        bare_name(&self.name)
    }

    /// Directory prefix of the path, with a trailing slash ("" at the root)
    pub fn dir_prefix(&self) -> &str {
        &self.path[..self.path.len() - self.name.len()]
    }

    /// Time elapsed since the last modification
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.modified)
    }
}

/// Strip the final extension from a file name ("a.b.md" -> "a.b").
pub fn bare_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// A marker-decorated link, resolved to the document it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointedLink {
    /// Document the link resolves to
    pub target: Document,

    /// Link text exactly as written, e.g. "[[folder/Target|alias]]"
    pub raw_link: String,

    /// Document containing the link
    pub source: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// A recovered failure, kept so callers can report it after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub path: Option<String>,
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn warning(code: &str, path: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: DiagnosticSeverity::Warning,
            path: path.map(str::to_string),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Snapshot of one refresh over the vault.
///
/// Rebuilt from scratch on every refresh; nothing is carried over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Modified within the detection window, newest first
    pub detected: Vec<Document>,

    /// Carrying the marker, in scan order
    pub marked: Vec<Document>,

    /// Marker-decorated links, newest target first
    pub pointed: Vec<PointedLink>,

    /// Documents holding at least one marker-decorated link
    pub pointer: Vec<Document>,

    /// Every listed document, special paths included, in enumeration order
    pub corpus: Vec<Document>,

    pub diagnostics: Vec<Diagnostic>,

    pub scanned_at: DateTime<Utc>,
}

impl Classification {
    pub fn new(corpus: Vec<Document>, scanned_at: DateTime<Utc>) -> Self {
        Self {
            detected: Vec::new(),
            marked: Vec::new(),
            pointed: Vec::new(),
            pointer: Vec::new(),
            corpus,
            diagnostics: Vec::new(),
            scanned_at,
        }
    }

    /// Bare name -> first matching corpus index, for repeated lookups
    pub fn name_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::new();
        for (idx, doc) in self.corpus.iter().enumerate() {
            index.entry(doc.bare_name()).or_insert(idx);
        }
        index
    }
}

/// A document renamed by cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub from_path: String,
    pub to_path: String,
    /// Bare name before the rename
    pub old_name: String,
    /// Bare name after the rename
    pub new_name: String,
}

/// Outcome of a cleanup run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleanupReport {
    pub renamed_files: usize,
    pub rewritten_links: usize,
    pub cleared_markers: usize,
    pub renames: Vec<Rename>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CleanupReport {
    /// True when the run changed nothing on disk
    pub fn is_noop(&self) -> bool {
        self.renamed_files == 0 && self.rewritten_links == 0 && self.cleared_markers == 0
    }
}
