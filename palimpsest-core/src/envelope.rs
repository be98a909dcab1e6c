/*!
Envelope codec: one text blob holding a snapshot's metadata block plus body.

The metadata block is YAML front-matter fenced by `---` lines. The host's
structured-metadata index intentionally skips the hidden snapshot root, so
listing re-parses the envelope itself; decoding is therefore layered: a strict
YAML parse first, then an independent per-field extractor over the raw head
for hand-edited or partially corrupt entries. A snapshot is undecodable only
when neither layer recovers a timestamp; every other field degrades to a safe
default.
*/

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::error::{PalimpsestError, Result};
use crate::snapshot::Snapshot;

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^timestamp:\s*(\d+)\s*$").unwrap());
static NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^note:\s*"?(.*?)"?\s*$"#).unwrap());
static WORD_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^snapshotWordCount:\s*(\d+)\s*$").unwrap());
static ORIGINAL_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^originalPath:\s*"?(.*?)"?\s*$"#).unwrap());
static PINNED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^isPinned:\s*(true|false)\s*$").unwrap());

/// Metadata and body recovered from one snapshot entry.
///
/// `original_path` stays `None` when the entry did not record it; the caller
/// substitutes the document path it was listing under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub timestamp: DateTime<Utc>,
    pub note: String,
    pub word_count: usize,
    pub original_path: Option<String>,
    pub is_pinned: bool,
    pub body: String,
}

impl Decoded {
    /// Build a [`Snapshot`] value for this entry, filling `original_path`
    /// with the caller-supplied fallback when the envelope lacked it.
    pub fn snapshot(&self, path: &str, fallback_original: &str) -> Snapshot {
        Snapshot {
            path: path.to_string(),
            original_path: self
                .original_path
                .clone()
                .unwrap_or_else(|| fallback_original.to_string()),
            timestamp: self.timestamp,
            note: self.note.clone(),
            word_count: self.word_count,
            is_pinned: self.is_pinned,
        }
    }
}

/// Partial field set shared by the strict and fallback parse layers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFields {
    timestamp: Option<i64>,
    note: Option<String>,
    snapshot_word_count: Option<u64>,
    original_path: Option<String>,
    is_pinned: Option<bool>,
}

/// Serialize a snapshot's metadata and body into one envelope.
///
/// The body is written verbatim after the closing fence and one blank line.
/// Double quotes and backslashes in embedded strings are escaped.
pub fn encode(snapshot: &Snapshot, body: &str) -> String {
    format!(
        "---\ntimestamp: {}\nnote: \"{}\"\nsnapshotWordCount: {}\noriginalPath: \"{}\"\nisPinned: {}\n---\n\n{}",
        snapshot.timestamp.timestamp_millis(),
        escape(&snapshot.note),
        snapshot.word_count,
        escape(&snapshot.original_path),
        snapshot.is_pinned,
        body
    )
}

/// Deserialize an envelope back into metadata and body.
///
/// # Errors
/// `PalimpsestError::Decode` when the text has no front-matter block at all
/// or no timestamp can be recovered by either parse layer.
pub fn decode(text: &str) -> Result<Decoded> {
    let (head, body) =
        split(text).ok_or_else(|| PalimpsestError::decode("missing front-matter block"))?;

    let fields = parse_strict(head).unwrap_or_else(|| extract_fields(head));

    let millis = fields
        .timestamp
        .ok_or_else(|| PalimpsestError::decode("no recoverable timestamp"))?;
    let timestamp = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| PalimpsestError::decode(format!("timestamp out of range: {millis}")))?;

    Ok(Decoded {
        timestamp,
        note: fields.note.unwrap_or_default(),
        word_count: fields.snapshot_word_count.unwrap_or(0) as usize,
        original_path: fields.original_path,
        is_pinned: fields.is_pinned.unwrap_or(false),
        body: body.to_string(),
    })
}

/// Split an envelope into its front-matter head and body.
///
/// Strips exactly the fenced block plus at most one following blank line, so
/// both `---\n...\n---\n\nbody` (as written by [`encode`]) and the
/// hand-edited `---\n...\n---\nbody` yield the same body.
pub(crate) fn split(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---\n")?;
    if let Some(idx) = rest.find("\n---\n") {
        let head = &rest[..idx];
        let tail = &rest[idx + 5..];
        let body = tail.strip_prefix('\n').unwrap_or(tail);
        Some((head, body))
    } else if let Some(head) = rest.strip_suffix("\n---") {
        // Closing fence without trailing newline: empty body
        Some((head, ""))
    } else {
        None
    }
}

fn parse_strict(head: &str) -> Option<RawFields> {
    serde_yaml::from_str(head).ok()
}

/// Field-by-field pattern extraction for entries whose metadata block is not
/// valid YAML. Each field is recovered independently.
fn extract_fields(head: &str) -> RawFields {
    RawFields {
        timestamp: TIMESTAMP_RE
            .captures(head)
            .and_then(|c| c[1].parse().ok()),
        note: NOTE_RE.captures(head).map(|c| unescape(&c[1])),
        snapshot_word_count: WORD_COUNT_RE
            .captures(head)
            .and_then(|c| c[1].parse().ok()),
        original_path: ORIGINAL_PATH_RE.captures(head).map(|c| unescape(&c[1])),
        is_pinned: PINNED_RE.captures(head).map(|c| &c[1] == "true"),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(s: &str) -> String {
    s.replace("\\\"", "\"").replace("\\\\", "\\")
}
