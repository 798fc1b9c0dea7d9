//! Background job: rotate the displayed access token when it expires.
//!
//! Checks once per second. The controller itself re-checks expiry under its
//! lock, so a tick that races a manual regeneration or a page render rotates
//! at most once; a failed rotation leaves the previous token in place and is
//! retried on the next tick.

use std::time::Duration;

use chrono::Utc;
use tokio::time;

use crate::rotation::RotationController;

/// Spawn the rotation ticker. Call this once at startup.
pub fn spawn(rotation: RotationController) {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            match rotation.tick(Utc::now()).await {
                Ok(Some(token)) => {
                    tracing::debug!(expires_at = %token.expires_at, "ticker rotated access token");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("ticker rotation failed: {}", e);
                }
            }
        }
    });
}
