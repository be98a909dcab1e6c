/*!
Tiered time-bucketed retention policy.

Three successive windows measured backward from "now", each with a lower
sampling density: everything inside the daily window is kept, the weekly
window keeps one snapshot per calendar day, the monthly window one per ISO
calendar week, and nothing older than the monthly boundary survives. Pinned
snapshots are never deleted, whatever the rules say.
*/

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::store::SnapshotStore;
use crate::vault::Vault;

/// Widths of the three retention windows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionRules {
    /// Full-fidelity window, in days
    pub keep_daily: u32,

    /// One-per-calendar-day window, in weeks
    pub keep_weekly: u32,

    /// One-per-calendar-week window, in months
    pub keep_monthly: u32,
}

impl Default for RetentionRules {
    fn default() -> Self {
        Self {
            keep_daily: 7,
            keep_weekly: 4,
            keep_monthly: 12,
        }
    }
}

/// Compute which snapshots a retention pass would delete.
///
/// Pinned snapshots are partitioned out before anything else; a pinned-only
/// history is never pruned. The remaining snapshots are visited newest first,
/// so the survivor of each day/week bucket is the freshest one in it.
pub fn plan<'a>(
    snapshots: &'a [Snapshot],
    rules: &RetentionRules,
    now: DateTime<Utc>,
) -> Vec<&'a Snapshot> {
    let mut unpinned: Vec<&Snapshot> = snapshots.iter().filter(|s| !s.is_pinned).collect();
    if unpinned.is_empty() {
        return Vec::new();
    }
    unpinned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let daily_boundary = now - Duration::days(i64::from(rules.keep_daily));
    let weekly_boundary = now - Duration::weeks(i64::from(rules.keep_weekly));
    let monthly_boundary = now
        .checked_sub_months(Months::new(rules.keep_monthly))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut seen_days: HashSet<String> = HashSet::new();
    let mut seen_weeks: HashSet<String> = HashSet::new();
    let mut doomed = Vec::new();

    for snapshot in unpinned {
        let ts = snapshot.timestamp;
        if ts > daily_boundary {
            continue;
        }
        if ts > weekly_boundary {
            let day = ts.format("%Y-%m-%d").to_string();
            if !seen_days.insert(day) {
                doomed.push(snapshot);
            }
        } else if ts > monthly_boundary {
            let week = ts.iso_week();
            let key = format!("{}-W{:02}", week.year(), week.week());
            if !seen_weeks.insert(key) {
                doomed.push(snapshot);
            }
        } else {
            doomed.push(snapshot);
        }
    }

    doomed
}

impl<V: Vault> SnapshotStore<V> {
    /// Prune a document's history using the store's configured rules.
    ///
    /// Returns the number of entries actually deleted.
    pub async fn prune(&self, doc_path: &str) -> Result<usize> {
        let rules = self.config().retention;
        self.prune_with(doc_path, &rules).await
    }

    /// Prune a document's history with an explicit rule set.
    ///
    /// A delete failure for one entry does not abort the pass; the failure is
    /// logged and the entry is left for a later pass.
    pub async fn prune_with(&self, doc_path: &str, rules: &RetentionRules) -> Result<usize> {
        let snapshots = self.get_snapshots(doc_path).await?;
        let doomed = plan(&snapshots, rules, Utc::now());

        let mut removed = 0;
        for snapshot in doomed {
            match self.delete_snapshot(snapshot).await {
                Ok(()) => {
                    debug!("Pruned expired snapshot {}", snapshot.path);
                    removed += 1;
                }
                Err(e) => {
                    warn!("Failed to delete expired snapshot {}: {e}", snapshot.path);
                }
            }
        }

        if removed > 0 {
            info!("Pruned {removed} snapshots for {doc_path}");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn snap(ts: DateTime<Utc>, pinned: bool) -> Snapshot {
        Snapshot {
            path: format!(".snapshots/Note_md/{}", ts.format("%Y-%m-%d-%H%M%S.md")),
            original_path: "Note.md".to_string(),
            timestamp: ts,
            note: String::new(),
            word_count: 0,
            is_pinned: pinned,
        }
    }

    fn paths(doomed: &[&Snapshot]) -> Vec<String> {
        doomed.iter().map(|s| s.path.clone()).collect()
    }

    #[test]
    fn test_daily_window_keeps_everything() {
        let now = at(2024, 1, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 7,
            keep_weekly: 4,
            keep_monthly: 12,
        };
        let snapshots = vec![
            snap(at(2024, 1, 15, 11, 0), false),
            snap(at(2024, 1, 15, 9, 0), false),
            snap(at(2024, 1, 12, 8, 0), false),
        ];
        assert!(plan(&snapshots, &rules, now).is_empty());
    }

    #[test]
    fn test_weekly_window_samples_one_per_day() {
        // Three unpinned snapshots on the same calendar day inside the weekly
        // window: only the newest survives.
        let now = at(2024, 1, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 1,
            keep_weekly: 2,
            keep_monthly: 12,
        };
        let snapshots = vec![
            snap(at(2024, 1, 10, 9, 0), false),
            snap(at(2024, 1, 10, 14, 0), false),
            snap(at(2024, 1, 10, 22, 0), false),
        ];
        let doomed = plan(&snapshots, &rules, now);
        assert_eq!(
            paths(&doomed),
            vec![
                snap(at(2024, 1, 10, 14, 0), false).path,
                snap(at(2024, 1, 10, 9, 0), false).path,
            ]
        );
    }

    #[test]
    fn test_monthly_window_samples_one_per_week() {
        let now = at(2024, 6, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 1,
            keep_weekly: 1,
            keep_monthly: 2,
        };
        // 2024-05-20 and 2024-05-22 share ISO week 21
        let snapshots = vec![
            snap(at(2024, 5, 20, 10, 0), false),
            snap(at(2024, 5, 22, 10, 0), false),
        ];
        let doomed = plan(&snapshots, &rules, now);
        assert_eq!(paths(&doomed), vec![snap(at(2024, 5, 20, 10, 0), false).path]);
    }

    #[test]
    fn test_older_than_monthly_boundary_deleted_outright() {
        let now = at(2024, 6, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 1,
            keep_weekly: 1,
            keep_monthly: 2,
        };
        let snapshots = vec![
            snap(at(2024, 1, 1, 10, 0), false),
            snap(at(2023, 6, 1, 10, 0), false),
        ];
        let doomed = plan(&snapshots, &rules, now);
        assert_eq!(doomed.len(), 2);
    }

    #[test]
    fn test_pinned_snapshots_never_deleted() {
        let now = at(2024, 6, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 0,
            keep_weekly: 0,
            keep_monthly: 0,
        };
        let snapshots = vec![
            snap(at(2024, 6, 15, 11, 0), true),
            snap(at(2024, 1, 10, 9, 0), true),
            snap(at(2020, 1, 1, 0, 0), true),
            snap(at(2020, 1, 1, 1, 0), false),
        ];
        let doomed = plan(&snapshots, &rules, now);
        assert!(doomed.iter().all(|s| !s.is_pinned));
        assert_eq!(doomed.len(), 1);
    }

    #[test]
    fn test_pinned_only_history_never_pruned() {
        let now = at(2024, 6, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 0,
            keep_weekly: 0,
            keep_monthly: 0,
        };
        let snapshots = vec![snap(at(2000, 1, 1, 0, 0), true)];
        assert!(plan(&snapshots, &rules, now).is_empty());
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let now = at(2024, 1, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 1,
            keep_weekly: 2,
            keep_monthly: 12,
        };
        let snapshots = vec![
            snap(at(2024, 1, 10, 9, 0), false),
            snap(at(2024, 1, 10, 14, 0), false),
            snap(at(2024, 1, 10, 22, 0), false),
            snap(at(2024, 1, 9, 8, 0), false),
        ];
        let doomed = paths(&plan(&snapshots, &rules, now));

        let survivors: Vec<Snapshot> = snapshots
            .into_iter()
            .filter(|s| !doomed.contains(&s.path))
            .collect();
        assert!(plan(&survivors, &rules, now).is_empty());
    }

    #[test]
    fn test_unsorted_input_keeps_freshest_per_bucket() {
        let now = at(2024, 1, 15, 12, 0);
        let rules = RetentionRules {
            keep_daily: 1,
            keep_weekly: 2,
            keep_monthly: 12,
        };
        // Oldest first: the planner must still retain the 22:00 entry
        let snapshots = vec![
            snap(at(2024, 1, 10, 9, 0), false),
            snap(at(2024, 1, 10, 22, 0), false),
        ];
        let doomed = plan(&snapshots, &rules, now);
        assert_eq!(paths(&doomed), vec![snap(at(2024, 1, 10, 9, 0), false).path]);
    }
}
