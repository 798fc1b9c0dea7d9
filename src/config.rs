use anyhow::Context;
use url::Url;

const PLACEHOLDER_KEY: &str = "CHANGE_ME_SERVICE_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Root of the hosted backend, e.g. https://project.example.co.
    /// The data API lives under /rest/v1 and the identity API under /auth/v1.
    pub backend_url: String,
    /// Service key for the hosted backend (sent as apikey + bearer).
    pub backend_key: String,
    /// Public base URL of this dashboard. Embedded in the QR access URL and
    /// used as the sign-in redirect target, so it must be externally
    /// reachable in production.
    pub public_url: Url,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let backend_key =
        std::env::var("DOJO_BACKEND_KEY").unwrap_or_else(|_| PLACEHOLDER_KEY.into());

    if backend_key == PLACEHOLDER_KEY {
        let env_mode = std::env::var("DOJO_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "DOJO_BACKEND_KEY is still the insecure placeholder. \
                 Set the backend service key before running in production."
            );
        }
        eprintln!("⚠️  DOJO_BACKEND_KEY is not set — using insecure placeholder. Backend calls will be rejected.");
    }

    let port = std::env::var("DOJO_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .unwrap_or(8080);

    let public_url = std::env::var("DOJO_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://localhost:{port}"));
    let public_url = Url::parse(&public_url)
        .with_context(|| format!("DOJO_PUBLIC_URL is not a valid URL: {public_url}"))?;

    Ok(Config {
        port,
        backend_url: std::env::var("DOJO_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:54321".into())
            .trim_end_matches('/')
            .to_string(),
        backend_key,
        public_url,
    })
}
