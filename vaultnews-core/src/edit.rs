//! Span-based text splicing.
//!
//! Edits are expressed against the original text and applied in a single
//! pass that copies the untouched slices between them, so no offset has to be
//! shifted as earlier edits change the length of the text.

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte range in the original text
    pub range: Range<usize>,
    pub replacement: String,
}

impl Edit {
    pub fn remove(range: Range<usize>) -> Self {
        Self {
            range,
            replacement: String::new(),
        }
    }

    pub fn replace(range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }
}

/// Apply `edits` to `original`.
///
/// Edits are sorted by start offset. An edit overlapping an earlier one, or
/// not on character boundaries, is skipped with a warning.
pub fn apply_edits(original: &str, edits: &[Edit]) -> String {
    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut out = String::with_capacity(original.len());
    let mut cursor = 0;

    for edit in ordered {
        let Range { start, end } = edit.range.clone();
        if start < cursor || end < start || original.get(start..end).is_none() {
            tracing::warn!("Skipping invalid edit {:?} (cursor at {})", edit.range, cursor);
            continue;
        }
        out.push_str(&original[cursor..start]);
        out.push_str(&edit.replacement);
        cursor = end;
    }

    out.push_str(&original[cursor..]);
    out
}
