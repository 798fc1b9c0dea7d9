//! Session gate for the admin dashboard.
//!
//! The backend's identity service issues a JWT at sign-in; we keep it in a
//! cookie and treat its presence plus a live `exp` as "signed in". There is
//! deliberately no signature check here: the hosted backend re-verifies the
//! token on every data request it receives, so a forged cookie can render
//! empty page chrome but never reach member data.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::errors::AppError;

/// Cookie carrying the backend-issued access token.
pub const SESSION_COOKIE: &str = "dojo_session";

/// Short-lived cookie holding the PKCE verifier between the sign-in redirect
/// and the callback.
pub const PKCE_COOKIE: &str = "dojo_pkce";

/// Claims this dashboard cares about.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: Option<String>,
    pub exp: i64,
}

/// Decode the JWT payload and check expiry.
pub fn decode_session(token: &str) -> anyhow::Result<SessionClaims> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow::anyhow!("invalid JWT format: expected 3 parts"));
    }

    use base64::Engine;
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let payload_bytes = engine
        .decode(parts[1])
        .map_err(|e| anyhow::anyhow!("JWT payload decode error: {}", e))?;
    let raw: serde_json::Value = serde_json::from_slice(&payload_bytes)?;

    let sub = raw
        .get("sub")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("JWT missing 'sub' claim"))?
        .to_string();

    let exp = raw
        .get("exp")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow::anyhow!("JWT missing 'exp' claim"))?;

    if exp < Utc::now().timestamp() {
        return Err(anyhow::anyhow!("session expired"));
    }

    Ok(SessionClaims {
        sub,
        email: raw.get("email").and_then(|v| v.as_str()).map(String::from),
        exp,
    })
}

/// The signed-in admin, if the session cookie holds a live token.
///
/// Anything malformed or expired reads as signed out; no error surfaces,
/// the caller just redirects to the login screen.
pub fn session_from_jar(jar: &CookieJar) -> Option<SessionClaims> {
    let cookie = jar.get(SESSION_COOKIE)?;
    decode_session(cookie.value()).ok()
}

/// Gate for the JSON API: requests without a live session get 401.
pub async fn require_session(
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if session_from_jar(&jar).is_none() {
        return Err(AppError::NotAuthenticated);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    fn make_jwt(payload: &str) -> String {
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let header = engine.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        format!("{}.{}.signature", header, engine.encode(payload))
    }

    #[test]
    fn test_decode_live_session() {
        let token = make_jwt(r#"{"sub":"user-123","email":"admin@belezadojo.com","exp":9999999999}"#);
        let claims = decode_session(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, Some("admin@belezadojo.com".to_string()));
    }

    #[test]
    fn test_decode_expired_session() {
        let token = make_jwt(r#"{"sub":"user-123","exp":1000000000}"#);
        let result = decode_session(&token);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expired"));
    }

    #[test]
    fn test_decode_missing_sub() {
        let token = make_jwt(r#"{"exp":9999999999}"#);
        assert!(decode_session(&token).is_err());
    }

    #[test]
    fn test_decode_rejects_non_jwt() {
        assert!(decode_session("not-a-jwt").is_err());
    }

    #[test]
    fn test_jar_without_cookie_is_signed_out() {
        let jar = CookieJar::new();
        assert!(session_from_jar(&jar).is_none());
    }

    #[test]
    fn test_jar_with_garbage_cookie_is_signed_out() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "garbage"));
        assert!(session_from_jar(&jar).is_none());
    }

    #[test]
    fn test_jar_with_live_cookie_is_signed_in() {
        let token = make_jwt(r#"{"sub":"user-9","exp":9999999999}"#);
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, token));
        let claims = session_from_jar(&jar).unwrap();
        assert_eq!(claims.sub, "user-9");
    }
}
