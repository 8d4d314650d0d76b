//! Word-level diff of a generated response against its human edit.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Unchanged,
    Added,
    Removed,
}

/// A run of adjacent tokens sharing one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSpan {
    pub text: String,
    pub tag: DiffTag,
}

impl DiffSpan {
    fn new(text: impl Into<String>, tag: DiffTag) -> Self {
        Self {
            text: text.into(),
            tag,
        }
    }
}

/// Diff `original` against `edited` at word granularity.
///
/// Concatenating the `Unchanged` and `Removed` spans yields `original`;
/// concatenating the `Unchanged` and `Added` spans yields `edited`. Within a
/// replaced region the `Removed` span always comes first.
pub fn diff(original: &str, edited: &str) -> Vec<DiffSpan> {
    if original == edited {
        return vec![DiffSpan::new(original, DiffTag::Unchanged)];
    }
    if edited.is_empty() {
        return vec![DiffSpan::new(original, DiffTag::Removed)];
    }
    if original.is_empty() {
        return vec![DiffSpan::new(edited, DiffTag::Added)];
    }

    let text_diff = TextDiff::from_words(original, edited);
    let mut spans = Vec::new();
    let mut removed = String::new();
    let mut added = String::new();

    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Delete => removed.push_str(change.value()),
            ChangeTag::Insert => added.push_str(change.value()),
            ChangeTag::Equal => {
                flush_changed(&mut spans, &mut removed, &mut added);
                push_merged(&mut spans, change.value(), DiffTag::Unchanged);
            }
        }
    }
    flush_changed(&mut spans, &mut removed, &mut added);

    spans
}

fn flush_changed(spans: &mut Vec<DiffSpan>, removed: &mut String, added: &mut String) {
    if !removed.is_empty() {
        push_merged(spans, removed, DiffTag::Removed);
        removed.clear();
    }
    if !added.is_empty() {
        push_merged(spans, added, DiffTag::Added);
        added.clear();
    }
}

fn push_merged(spans: &mut Vec<DiffSpan>, text: &str, tag: DiffTag) {
    match spans.last_mut() {
        Some(last) if last.tag == tag => last.text.push_str(text),
        _ => spans.push(DiffSpan::new(text, tag)),
    }
}
