use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;

use crate::errors::AppError;
use crate::models::member::{AccessLogRow, Member, NewAccessLog, RESULT_AUTHORIZED, STATUS_ACTIVE};
use crate::models::token::NewQrToken;

/// REST client for the hosted data API.
///
/// Table access goes through `/rest/v1/<table>` with PostgREST-style query
/// operators. The client is built once at startup from explicit endpoint and
/// key configuration and cloned into handlers; writes are single-shot and
/// never retried here, callers decide what a failed write means.
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    rest_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, service_key: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(service_key)?;
        key.set_sensitive(true);
        headers.insert("apikey", key);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
        })
    }

    /// Persist a freshly minted access token.
    ///
    /// Insert-only: scanners validate tokens against the table on their own,
    /// this service never reads a token row back.
    pub async fn insert_qr_token(&self, row: &NewQrToken<'_>) -> Result<(), AppError> {
        let resp = self
            .client
            .post(format!("{}/qr_tokens", self.rest_url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        expect_write_ok(resp, "qr_tokens insert").await
    }

    /// Append one row to the access log.
    pub async fn insert_access_log(&self, row: &NewAccessLog<'_>) -> Result<(), AppError> {
        let resp = self
            .client
            .post(format!("{}/access_logs", self.rest_url))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        expect_write_ok(resp, "access_logs insert").await
    }

    /// Authorized accesses strictly newer than `since`, most recent first.
    ///
    /// Descending order is load-bearing: the report keeps the first row it
    /// sees per member as that member's latest visit.
    pub async fn authorized_accesses_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<AccessLogRow>, AppError> {
        let result_filter = format!("eq.{RESULT_AUTHORIZED}");
        let since_filter = format!("gt.{}", since.to_rfc3339_opts(SecondsFormat::Millis, true));
        let resp = self
            .client
            .get(format!("{}/access_logs", self.rest_url))
            .query(&[
                ("select", "user_id,scanned_at"),
                ("result", result_filter.as_str()),
                ("scanned_at", since_filter.as_str()),
                ("order", "scanned_at.desc"),
            ])
            .send()
            .await?;
        expect_rows(resp, "access_logs select").await
    }

    /// Members whose membership is currently paid up.
    pub async fn active_members(&self) -> Result<Vec<Member>, AppError> {
        let status_filter = format!("eq.{STATUS_ACTIVE}");
        let resp = self
            .client
            .get(format!("{}/members_with_status", self.rest_url))
            .query(&[
                ("select", "user_id,first_name,last_name,email,status"),
                ("status", status_filter.as_str()),
            ])
            .send()
            .await?;
        expect_rows(resp, "members_with_status select").await
    }
}

async fn expect_write_ok(resp: reqwest::Response, context: &'static str) -> Result<(), AppError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    Err(rejected(resp, status, context).await)
}

async fn expect_rows<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
    context: &'static str,
) -> Result<Vec<T>, AppError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(rejected(resp, status, context).await);
    }
    Ok(resp.json().await?)
}

async fn rejected(resp: reqwest::Response, status: StatusCode, context: &'static str) -> AppError {
    let body = resp.text().await.unwrap_or_default();
    AppError::BackendRejected {
        context,
        status,
        body,
    }
}
