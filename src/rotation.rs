use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::token::{ActiveToken, NewQrToken};
use crate::store::backend::BackendClient;

/// Lifetime of each displayed access token.
pub const TOKEN_TTL_SECS: i64 = 30;

/// Countdown shown while no token has been minted yet.
pub const COUNTDOWN_PLACEHOLDER: &str = "--:--:--";

/// Mint a new access token: 24 bytes of OS entropy, hex-encoded (48 chars).
///
/// There is deliberately no fallback generator. If the OS entropy source is
/// unavailable the rotation fails and the previous token stays on screen,
/// which is safer than displaying a guessable one.
pub fn generate_token() -> Result<String, AppError> {
    let mut bytes = [0u8; 24];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Remaining validity as `HH:MM:SS`, floored to whole seconds and clamped at
/// zero. `None` renders the placeholder shown before the first mint.
pub fn format_time_left(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(target) = expires_at else {
        return COUNTDOWN_PLACEHOLDER.to_string();
    };
    let left = (target - now).num_seconds().max(0);
    let hours = left / 3600;
    let minutes = (left % 3600) / 60;
    let seconds = left % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Owns the token currently on display and serializes every rotation.
///
/// All writers go through the internal mutex, so the sequence is always
/// mint → persist → swap: the in-memory token only changes after the backend
/// accepted the insert, and a failed insert leaves the previous token (and
/// its expiry) untouched.
///
/// Readers call [`RotationController::current`], which re-checks expiry on
/// every call. A token past its expiry is never handed out, even if the
/// background ticker is late or was never started.
#[derive(Clone)]
pub struct RotationController {
    store: BackendClient,
    ttl: Duration,
    current: Arc<Mutex<Option<ActiveToken>>>,
}

impl RotationController {
    pub fn new(store: BackendClient) -> Self {
        Self::with_ttl(store, Duration::seconds(TOKEN_TTL_SECS))
    }

    /// Same controller with a custom lifetime. Test seam.
    pub fn with_ttl(store: BackendClient, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Force a rotation regardless of the current token's remaining life.
    pub async fn regenerate(&self, now: DateTime<Utc>) -> Result<ActiveToken, AppError> {
        let mut slot = self.current.lock().await;
        self.rotate_locked(&mut slot, now).await
    }

    /// The valid token for `now`, rotating first if the held one expired or
    /// none was minted yet.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<ActiveToken, AppError> {
        let mut slot = self.current.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(now) {
                return Ok(token.clone());
            }
        }
        self.rotate_locked(&mut slot, now).await
    }

    /// One ticker step: rotate only if a token exists and has expired.
    ///
    /// Returns the replacement token when a rotation happened. A missing
    /// token is left alone; the first mint belongs to startup or to the
    /// first read, not the ticker.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Option<ActiveToken>, AppError> {
        let mut slot = self.current.lock().await;
        match slot.as_ref() {
            Some(token) if !token.is_valid_at(now) => {
                let fresh = self.rotate_locked(&mut slot, now).await?;
                Ok(Some(fresh))
            }
            _ => Ok(None),
        }
    }

    /// Whatever token is held right now, expired or not. Lets the QR page
    /// keep showing the previous code when a rotation attempt fails.
    pub async fn snapshot(&self) -> Option<ActiveToken> {
        self.current.lock().await.clone()
    }

    /// Countdown string for the held token.
    pub async fn time_left(&self, now: DateTime<Utc>) -> String {
        let slot = self.current.lock().await;
        format_time_left(slot.as_ref().map(|t| t.expires_at), now)
    }

    async fn rotate_locked(
        &self,
        slot: &mut Option<ActiveToken>,
        now: DateTime<Utc>,
    ) -> Result<ActiveToken, AppError> {
        let value = generate_token()?;
        let expires_at = now + self.ttl;
        self.store
            .insert_qr_token(&NewQrToken {
                token: &value,
                expires_at,
            })
            .await?;

        let token = ActiveToken { value, expires_at };
        *slot = Some(token.clone());
        tracing::debug!(expires_at = %expires_at, "access token rotated");
        Ok(token)
    }
}
