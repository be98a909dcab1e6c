/*!
Snapshot data model and the naming scheme for snapshot entries.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::envelope;

/// File suffix for snapshot entries.
pub const SNAPSHOT_SUFFIX: &str = ".md";

/// An immutable, timestamped copy of a document's body plus metadata, stored
/// as one entry in that document's snapshot directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Storage location of this entry inside the vault (lifecycle key)
    pub path: String,

    /// The source document's path at capture time; historical provenance,
    /// never rewritten when the source is renamed
    pub original_path: String,

    /// Capture instant; primary ordering key
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Free-text annotation, empty when none was given
    pub note: String,

    /// Whitespace-delimited token count of the body at capture time
    pub word_count: usize,

    /// Pinned snapshots are excluded from all retention deletion
    pub is_pinned: bool,
}

/// Derive the deterministic snapshot directory name for a document path.
///
/// Characters that are illegal in directory names are replaced with `_`, so
/// every snapshot entry for a document lives under one flat subdirectory of
/// the snapshot root.
pub fn sanitize_path(path: &str) -> String {
    path.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Derive the entry file name for a capture instant.
///
/// One-second granularity; two captures of the same document within the same
/// second collide on the same name, which is an accepted limitation.
pub fn snapshot_file_name(timestamp: &DateTime<Utc>) -> String {
    format!("{}{}", timestamp.format("%Y-%m-%d-%H%M%S"), SNAPSHOT_SUFFIX)
}

/// Count whitespace-delimited tokens in a document body, excluding any
/// structural front-matter block of the source document itself.
pub fn word_count(body: &str) -> usize {
    let text = match envelope::split(body) {
        Some((_, rest)) => rest,
        None => body,
    };
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("Notes/Sub/Plan.md"), "Notes_Sub_Plan.md");
        assert_eq!(sanitize_path("a:b*c?.md"), "a_b_c_.md");
        assert_eq!(sanitize_path("plain.md"), "plain.md");
    }

    #[test]
    fn test_sanitize_is_deterministic() {
        let a = sanitize_path("Daily/2024-01-10.md");
        let b = sanitize_path("Daily/2024-01-10.md");
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot_file_name() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 10, 9, 5, 3).unwrap();
        assert_eq!(snapshot_file_name(&ts), "2024-01-10-090503.md");
    }

    #[test]
    fn test_word_count_plain() {
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t"), 0);
    }

    #[test]
    fn test_word_count_strips_source_front_matter() {
        let body = "---\ntitle: Plan\ntags: [a, b]\n---\n\none two three";
        assert_eq!(word_count(body), 3);
    }

    #[test]
    fn test_word_count_unterminated_front_matter() {
        // No closing fence: treat the whole text as body
        let body = "---\ntitle: Plan\none two three";
        assert_eq!(word_count(body), 6);
    }
}
