use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::member::{AccessLogRow, Member};

/// An active member with no authorized access for this many days counts as
/// absent. The comparison is strict: exactly seven days ago is still present.
pub const ABSENCE_THRESHOLD_DAYS: i64 = 7;

/// Access logs older than this never enter the report query.
pub const LOOKBACK_DAYS: i64 = 30;

/// Latest authorized visit per member.
///
/// Expects rows sorted most recent first (the backend query orders by
/// `scanned_at` descending); the first row seen per member wins. Rows with
/// no member attached, such as manual guest entries, are skipped.
pub fn last_access_index(logs: &[AccessLogRow]) -> HashMap<Uuid, DateTime<Utc>> {
    let mut index = HashMap::new();
    for row in logs {
        if let Some(user_id) = row.user_id {
            index.entry(user_id).or_insert(row.scanned_at);
        }
    }
    index
}

/// One row of the absences report.
#[derive(Debug, Clone, Serialize)]
pub struct AbsentMember {
    #[serde(flatten)]
    pub member: Member,
    /// Missing when the member had no authorized access in the whole
    /// lookback window.
    pub last_access: Option<DateTime<Utc>>,
    /// Whole days since the last visit. Follows `last_access`.
    pub days_absent: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AbsenceReport {
    /// Matching absentees, never-visited first, then longest away first.
    pub absent: Vec<AbsentMember>,
    /// All active members, regardless of the search filter.
    pub total_active: usize,
    /// Share of active members that are absent and match the filter,
    /// rounded to whole percent.
    pub absent_pct: u32,
}

/// Classify, filter and order the absentees for one report request.
///
/// The search matches case-insensitively against "first last" and the email
/// address; an empty search matches everyone. Both the headline count and
/// the percentage reflect the filtered list, mirroring what the table shows.
pub fn build_report(
    members: &[Member],
    logs: &[AccessLogRow],
    now: DateTime<Utc>,
    search: &str,
) -> AbsenceReport {
    let index = last_access_index(logs);
    let threshold = now - Duration::days(ABSENCE_THRESHOLD_DAYS);
    let needle = search.to_lowercase();

    let mut absent: Vec<AbsentMember> = members
        .iter()
        .filter_map(|member| {
            let last_access = index.get(&member.user_id).copied();
            let is_absent = match last_access {
                Some(at) => at < threshold,
                None => true,
            };
            if !is_absent || !matches_search(member, &needle) {
                return None;
            }
            Some(AbsentMember {
                member: member.clone(),
                last_access,
                days_absent: last_access.map(|at| (now - at).num_days()),
            })
        })
        .collect();

    absent.sort_by(|a, b| match (a.last_access, b.last_access) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    });

    let absent_pct = if members.is_empty() {
        0
    } else {
        ((absent.len() as f64 / members.len() as f64) * 100.0).round() as u32
    };

    AbsenceReport {
        absent,
        total_active: members.len(),
        absent_pct,
    }
}

fn matches_search(member: &Member, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    member.full_name().to_lowercase().contains(needle)
        || member.email.to_lowercase().contains(needle)
}
