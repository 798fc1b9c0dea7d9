use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AppError;

/// Client for the hosted identity API.
///
/// Sign-in is delegated entirely to the backend's IdP integration: we send
/// the browser to `/auth/v1/authorize` and later exchange the callback code
/// for a session over PKCE. No credential ever touches this service.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    auth_url: String,
}

/// Session returned by the code exchange. The access token is a JWT minted
/// by the backend; we keep it in a cookie and only ever check its expiry.
#[derive(Debug, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub expires_in: i64,
    pub user: SessionUser,
}

#[derive(Debug, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

impl IdentityClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let mut key = reqwest::header::HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        headers.insert("apikey", key);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            auth_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
        })
    }

    /// Browser redirect target for the hosted Google sign-in.
    ///
    /// `prompt=select_account` forces the account chooser so a shared front
    /// desk machine can switch admins without clearing browser state.
    pub fn authorize_url(&self, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}/authorize?provider=google&redirect_to={}&prompt=select_account&access_type=offline&code_challenge={}&code_challenge_method=s256",
            self.auth_url,
            urlencoding::encode(redirect_to),
            code_challenge,
        )
    }

    /// Exchange the callback code for a session (PKCE flow).
    pub async fn exchange_code(&self, auth_code: &str, verifier: &str) -> Result<Session, AppError> {
        let resp = self
            .client
            .post(format!("{}/token?grant_type=pkce", self.auth_url))
            .json(&serde_json::json!({
                "auth_code": auth_code,
                "code_verifier": verifier,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::SignIn(format!("code exchange failed: {status} {body}")));
        }

        Ok(resp.json().await?)
    }
}

/// Fresh PKCE verifier: 32 bytes of OS entropy, hex-encoded (64 chars).
///
/// Fails loudly when the OS entropy source is unavailable rather than
/// falling back to a weaker generator.
pub fn new_pkce_verifier() -> Result<String, AppError> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// S256 code challenge for a verifier: base64url(sha256(verifier)), no padding.
pub fn pkce_challenge(verifier: &str) -> String {
    use base64::Engine;
    let digest = Sha256::digest(verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest)
}
