use std::time::Duration;

use url::Url;

use crate::errors::AppError;

/// Third-party QR renderer. Receives only the access URL, never a session
/// or backend credential.
pub const QR_RENDER_BASE: &str = "https://api.qrserver.com/v1/create-qr-code/";

const QR_SIZE: &str = "400x400";
const QR_BACKGROUND: &str = "e2e8f0";
const QR_FOREGROUND: &str = "0f172a";

/// URL members land on when they scan the code: the public validation
/// endpoint with the current token as `t`.
pub fn access_url(public_base: &Url, token: &str) -> String {
    let mut url = public_base.clone();
    url.set_path("/validate");
    url.set_query(None);
    url.query_pairs_mut().append_pair("t", token);
    url.to_string()
}

/// Renderer URL for the QR image encoding `data`.
pub fn image_url(data: &str) -> String {
    format!(
        "{QR_RENDER_BASE}?size={QR_SIZE}&data={}&bgcolor={QR_BACKGROUND}&color={QR_FOREGROUND}",
        urlencoding::encode(data)
    )
}

/// Fetches rendered QR images so downloads are served from our origin.
#[derive(Clone)]
pub struct QrClient {
    client: reqwest::Client,
}

impl QrClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .use_rustls_tls()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build qr renderer HTTP client"),
        }
    }

    pub async fn fetch_png(&self, image_url: &str) -> Result<Vec<u8>, AppError> {
        let resp = self
            .client
            .get(image_url)
            .send()
            .await
            .map_err(|e| AppError::Renderer(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Renderer(format!("renderer returned {status}")));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::Renderer(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Default for QrClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_url_points_at_validate_with_token() {
        let base = Url::parse("https://admin.belezadojo.com").unwrap();
        let url = access_url(&base, "abc123");
        assert_eq!(url, "https://admin.belezadojo.com/validate?t=abc123");
    }

    #[test]
    fn test_access_url_replaces_existing_path_and_query() {
        let base = Url::parse("https://admin.belezadojo.com/app?x=1").unwrap();
        let url = access_url(&base, "tok");
        assert_eq!(url, "https://admin.belezadojo.com/validate?t=tok");
    }

    #[test]
    fn test_image_url_percent_encodes_the_payload() {
        let url = image_url("https://admin.belezadojo.com/validate?t=abc");
        assert!(url.starts_with("https://api.qrserver.com/v1/create-qr-code/?size=400x400&data="));
        assert!(url.contains("data=https%3A%2F%2Fadmin.belezadojo.com%2Fvalidate%3Ft%3Dabc"));
        assert!(url.ends_with("&bgcolor=e2e8f0&color=0f172a"));
    }
}
