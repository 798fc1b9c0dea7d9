use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire value the scanners write for a granted access in `access_logs`.
pub const RESULT_AUTHORIZED: &str = "autorizado";

/// Wire value for a paying membership in `members_with_status`.
pub const STATUS_ACTIVE: &str = "activo";

/// Log reason recorded when an admin lets a guest in by hand.
pub const REASON_MANUAL_GUEST: &str = "Acceso invitado manual (Admin)";

/// Row of the hosted `members_with_status` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Slim `access_logs` row as fetched for the retention report.
///
/// `user_id` is nullable on the wire: manual guest entries carry no member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogRow {
    pub user_id: Option<Uuid>,
    pub scanned_at: DateTime<Utc>,
}

/// Insert payload for `access_logs`.
#[derive(Debug, Serialize)]
pub struct NewAccessLog<'a> {
    pub user_id: Option<Uuid>,
    pub result: &'a str,
    pub reason: &'a str,
    pub scanned_at: DateTime<Utc>,
}

impl NewAccessLog<'_> {
    /// Pre-authorized entry for a walk-in guest, recorded outside the token
    /// flow with no member attached.
    pub fn manual_guest(now: DateTime<Utc>) -> Self {
        Self {
            user_id: None,
            result: RESULT_AUTHORIZED,
            reason: REASON_MANUAL_GUEST,
            scanned_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_guest_entry_is_authorized_and_anonymous() {
        let entry = NewAccessLog::manual_guest(Utc::now());
        assert_eq!(entry.result, RESULT_AUTHORIZED);
        assert_eq!(entry.reason, REASON_MANUAL_GUEST);
        assert!(entry.user_id.is_none());
    }

    #[test]
    fn access_log_row_accepts_null_member() {
        let row: AccessLogRow =
            serde_json::from_str(r#"{"user_id":null,"scanned_at":"2026-08-22T10:00:00Z"}"#)
                .unwrap();
        assert!(row.user_id.is_none());
    }
}
