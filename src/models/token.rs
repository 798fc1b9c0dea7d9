use chrono::{DateTime, Utc};
use serde::Serialize;

/// The access token currently on display.
///
/// Held in memory by the rotation controller and replaced wholesale on every
/// rotation; a token value is never reused or extended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl ActiveToken {
    /// A token is usable strictly before its expiry instant.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Insert payload for the hosted `qr_tokens` table.
///
/// Write-only contract: this service never reads token rows back, scanners
/// validate against the table on their own.
#[derive(Debug, Serialize)]
pub struct NewQrToken<'a> {
    pub token: &'a str,
    pub expires_at: DateTime<Utc>,
}
