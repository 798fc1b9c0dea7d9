use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod cli;
mod config;
mod errors;
mod jobs;
mod middleware;
mod models;
mod pages;
mod qr;
mod report;
mod rotation;
mod store;

use qr::QrClient;
use rotation::RotationController;
use store::backend::BackendClient;
use store::identity::IdentityClient;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub store: BackendClient,
    pub identity: IdentityClient,
    pub qr: QrClient,
    pub rotation: RotationController,
    pub config: config::Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "dojo_admin=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Token { command }) => {
            let state = build_state(cfg)?;
            handle_token_command(command, &state).await
        }
        Some(cli::Commands::Access { command }) => {
            let state = build_state(cfg)?;
            handle_access_command(command, &state).await
        }
        Some(cli::Commands::Report { command }) => {
            let state = build_state(cfg)?;
            handle_report_command(command, &state).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn build_state(cfg: config::Config) -> anyhow::Result<Arc<AppState>> {
    let store = BackendClient::new(&cfg.backend_url, &cfg.backend_key)?;
    let identity = IdentityClient::new(&cfg.backend_url, &cfg.backend_key)?;
    let rotation = RotationController::new(store.clone());

    Ok(Arc::new(AppState {
        store,
        identity,
        qr: QrClient::new(),
        rotation,
        config: cfg,
    }))
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    let state = build_state(cfg)?;

    // Mint at startup so the entrance screen never opens without a code.
    // A failure here is logged and the first page render retries.
    match state.rotation.regenerate(chrono::Utc::now()).await {
        Ok(token) => {
            tracing::info!(expires_at = %token.expires_at, "initial access token minted")
        }
        Err(e) => tracing::error!("initial token mint failed: {}", e),
    }

    jobs::ticker::spawn(state.rotation.clone());
    tracing::info!("Rotation ticker started (1s cadence)");

    let app = axum::Router::new()
        // Health endpoints (no auth)
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .route("/readyz", axum::routing::get(readiness_check))
        // JSON API for the polling screens, nested under /api/v1
        .nest("/api/v1", api::api_router())
        // Server-rendered screens
        .merge(pages::router())
        .with_state(state.clone())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Beleza Dojo admin listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows correlating browser errors with dashboard logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

async fn readiness_check() -> &'static str {
    "ok"
}

/// Middleware: injects security headers into every response.
/// These protect against XSS, clickjacking, MIME sniffing, and info leakage.
async fn security_headers_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();

    // Prevent MIME-type sniffing (e.g., interpreting a .txt as HTML)
    headers.insert("X-Content-Type-Options", "nosniff".parse().unwrap());

    // Prevent clickjacking by disallowing iframe embedding
    headers.insert("X-Frame-Options", "DENY".parse().unwrap());

    // Tokens rotate every 30 seconds; nothing here is worth caching
    headers.insert("Cache-Control", "no-store".parse().unwrap());

    // Strip Referrer so access URLs never leak through the QR renderer
    headers.insert("Referrer-Policy", "no-referrer".parse().unwrap());

    // Remove server identity header
    headers.remove("Server");

    resp
}

async fn handle_token_command(
    cmd: cli::TokenCommands,
    state: &Arc<AppState>,
) -> anyhow::Result<()> {
    match cmd {
        cli::TokenCommands::Rotate => {
            let token = state.rotation.regenerate(chrono::Utc::now()).await?;
            let access = qr::access_url(&state.config.public_url, &token.value);
            println!(
                "Token rotated:\n  Token:      {}\n  Expires at: {}\n  Access URL: {}",
                token.value, token.expires_at, access
            );
        }
    }
    Ok(())
}

async fn handle_access_command(
    cmd: cli::AccessCommands,
    state: &Arc<AppState>,
) -> anyhow::Result<()> {
    match cmd {
        cli::AccessCommands::Guest => {
            let entry = models::member::NewAccessLog::manual_guest(chrono::Utc::now());
            state.store.insert_access_log(&entry).await?;
            println!("Guest access registered.");
        }
    }
    Ok(())
}

async fn handle_report_command(
    cmd: cli::ReportCommands,
    state: &Arc<AppState>,
) -> anyhow::Result<()> {
    match cmd {
        cli::ReportCommands::Absences { search } => {
            let now = chrono::Utc::now();
            let since = now - chrono::Duration::days(report::LOOKBACK_DAYS);
            let members = state.store.active_members().await?;
            let logs = state.store.authorized_accesses_since(since).await?;
            let rep = report::build_report(&members, &logs, now, &search);

            if rep.absent.is_empty() {
                println!("No absent members.");
                return Ok(());
            }

            println!("{:<38} {:<24} {:<30} LAST ACCESS", "ID", "NAME", "EMAIL");
            for entry in &rep.absent {
                let last = entry
                    .last_access
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "never".into());
                println!(
                    "{:<38} {:<24} {:<30} {}",
                    entry.member.user_id,
                    entry.member.full_name(),
                    entry.member.email,
                    last
                );
            }
            println!(
                "\n{} of {} active members absent ({}%)",
                rep.absent.len(),
                rep.total_active,
                rep.absent_pct
            );
        }
    }
    Ok(())
}
