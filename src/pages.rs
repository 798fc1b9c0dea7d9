//! Server-rendered screens for the admin dashboard.
//!
//! Every page is a plain HTML string assembled here; the QR screen keeps its
//! countdown and image fresh with a one-second poll against the JSON API.
//! Session checks happen per page: no live session means a redirect to the
//! login screen, never an error.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use url::Url;

use crate::errors::AppError;
use crate::middleware::session::{session_from_jar, PKCE_COOKIE, SESSION_COOKIE};
use crate::models::token::ActiveToken;
use crate::report::{self, AbsenceReport, AbsentMember};
use crate::store::identity;
use crate::{qr, rotation, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_page))
        .route("/auth/signin", get(signin))
        .route("/auth/callback", get(callback))
        .route("/auth/signout", get(signout))
        .route("/qr", get(qr_page))
        .route("/qr/print", get(qr_print_page))
        .route("/qr/download", get(qr_download))
        .route("/reportes", get(report_page))
}

// ── Auth flow ────────────────────────────────────────────────

async fn root(jar: CookieJar) -> Redirect {
    if session_from_jar(&jar).is_some() {
        Redirect::to("/qr")
    } else {
        Redirect::to("/login")
    }
}

async fn login_page(jar: CookieJar) -> Response {
    if session_from_jar(&jar).is_some() {
        return Redirect::to("/qr").into_response();
    }
    Html(render_login()).into_response()
}

/// Mint a PKCE verifier, park it in a cookie and send the browser to the
/// hosted Google sign-in.
async fn signin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let verifier = identity::new_pkce_verifier()?;
    let challenge = identity::pkce_challenge(&verifier);
    let redirect_to = callback_url(&state.config.public_url);
    let authorize = state.identity.authorize_url(&redirect_to, &challenge);

    let cookie = Cookie::build((PKCE_COOKIE, verifier))
        .path("/")
        .http_only(true)
        .secure(secure_cookies(&state.config.public_url))
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to(&authorize)))
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
}

/// Exchange the callback code for a session. Every failure path lands back
/// on the login screen; the cause is logged, not shown.
async fn callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> (CookieJar, Redirect) {
    let Some(code) = params.code else {
        tracing::warn!(error = ?params.error, "sign-in callback without code");
        return (jar, Redirect::to("/login"));
    };
    let Some(verifier) = jar.get(PKCE_COOKIE).map(|c| c.value().to_string()) else {
        tracing::warn!("sign-in callback without verifier cookie");
        return (jar, Redirect::to("/login"));
    };

    let jar = jar.remove(Cookie::build((PKCE_COOKIE, "")).path("/"));
    match state.identity.exchange_code(&code, &verifier).await {
        Ok(session) => {
            tracing::info!(user = %session.user.id, "admin signed in");
            let cookie = Cookie::build((SESSION_COOKIE, session.access_token))
                .path("/")
                .http_only(true)
                .secure(secure_cookies(&state.config.public_url))
                .same_site(SameSite::Lax)
                .build();
            (jar.add(cookie), Redirect::to("/qr"))
        }
        Err(e) => {
            tracing::warn!("sign-in code exchange failed: {}", e);
            (jar, Redirect::to("/login"))
        }
    }
}

async fn signout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Redirect::to("/login"))
}

fn callback_url(public_base: &Url) -> String {
    let mut url = public_base.clone();
    url.set_path("/auth/callback");
    url.set_query(None);
    url.to_string()
}

/// Auth cookies are marked Secure whenever the dashboard itself is served
/// over TLS; a plain-http local run still gets working cookies.
fn secure_cookies(public_base: &Url) -> bool {
    public_base.scheme() == "https"
}

// ── QR screen ────────────────────────────────────────────────

async fn qr_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if session_from_jar(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let now = Utc::now();
    let (token, stale) = match state.rotation.current(now).await {
        Ok(token) => (Some(token), false),
        Err(e) => {
            // Keep showing whatever was minted last; the poll retries.
            tracing::error!("qr page rotation failed: {}", e);
            (state.rotation.snapshot().await, true)
        }
    };

    Html(render_qr(&state, token.as_ref(), stale, now)).into_response()
}

async fn qr_print_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if session_from_jar(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let token = match state.rotation.current(Utc::now()).await {
        Ok(token) => token,
        Err(e) => return e.into_response(),
    };
    Html(render_print(&state, &token)).into_response()
}

/// Proxy the rendered PNG so the download carries our origin and a proper
/// filename instead of the renderer's URL.
async fn qr_download(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if session_from_jar(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let result = async {
        let token = state.rotation.current(Utc::now()).await?;
        let access = qr::access_url(&state.config.public_url, &token.value);
        state.qr.fetch_png(&qr::image_url(&access)).await
    }
    .await;

    match result {
        Ok(png) => (
            [
                (header::CONTENT_TYPE, "image/png"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"QR-Acceso-BelezaDojo.png\"",
                ),
            ],
            png,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Report screen ────────────────────────────────────────────

#[derive(Deserialize)]
struct ReportQuery {
    #[serde(default)]
    q: String,
}

async fn report_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<ReportQuery>,
) -> Response {
    if session_from_jar(&jar).is_none() {
        return Redirect::to("/login").into_response();
    }

    let now = Utc::now();
    let since = now - chrono::Duration::days(report::LOOKBACK_DAYS);
    let result = async {
        let members = state.store.active_members().await?;
        let logs = state.store.authorized_accesses_since(since).await?;
        Ok::<_, AppError>(report::build_report(&members, &logs, now, &params.q))
    }
    .await;

    match result {
        Ok(report) => Html(render_report(&report, &params.q)).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── Rendering ────────────────────────────────────────────────

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

fn format_date_es(at: DateTime<Utc>) -> String {
    format!(
        "{:02} {} {}",
        at.day(),
        MONTHS_ES[at.month0() as usize],
        at.year()
    )
}

/// Minimal HTML escaping for text and attribute positions.
fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const PAGE_CSS: &str = r#"
:root { color-scheme: dark; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, -apple-system, sans-serif; background: #0f172a; color: #e2e8f0; }
nav { display: flex; gap: 24px; align-items: center; padding: 16px 32px; border-bottom: 1px solid #1e293b; }
nav .brand { font-weight: 800; font-size: 18px; color: #fff; margin-right: 16px; }
nav .brand b { color: #3b82f6; }
nav a { color: #94a3b8; text-decoration: none; font-weight: 600; font-size: 14px; }
nav a.active { color: #3b82f6; }
nav a.right { margin-left: auto; }
main { max-width: 1100px; margin: 0 auto; padding: 32px 24px; }
h1 { font-size: 36px; font-weight: 900; letter-spacing: -0.5px; margin: 4px 0; color: #fff; }
h1 span { color: #3b82f6; }
.kicker { color: #3b82f6; font-size: 11px; font-weight: 800; text-transform: uppercase; letter-spacing: 2px; }
.tagline { color: #94a3b8; font-style: italic; margin-top: 4px; }
.pill { display: inline-block; padding: 6px 14px; border: 1px solid #1e293b; border-radius: 999px; background: #0b1120; color: #94a3b8; font-size: 11px; font-weight: 700; text-transform: uppercase; letter-spacing: 1px; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; margin-top: 24px; }
.card { background: #111c33; border: 1px solid #1e293b; border-radius: 24px; padding: 28px; }
.qr-box { background: #fff; border-radius: 20px; padding: 20px; width: fit-content; margin: 0 auto; position: relative; }
.qr-box img { display: block; width: 320px; height: 320px; border-radius: 12px; }
.qr-empty { width: 320px; height: 320px; display: flex; align-items: center; justify-content: center; color: #64748b; }
.status { position: absolute; left: 50%; bottom: -12px; transform: translateX(-50%); background: #10b981; color: #fff; padding: 3px 14px; border-radius: 999px; font-size: 10px; font-weight: 900; text-transform: uppercase; letter-spacing: 1px; }
.label { color: #94a3b8; font-size: 11px; font-weight: 700; text-transform: uppercase; letter-spacing: 2px; margin: 24px 0 4px; text-align: center; }
.countdown { font-size: 40px; font-weight: 900; text-align: center; font-variant-numeric: tabular-nums; color: #fff; }
.actions { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; margin-top: 24px; }
.btn { display: block; width: 100%; text-align: center; padding: 14px; border-radius: 16px; border: 1px solid #1e293b; background: #0b1120; color: #e2e8f0; font-weight: 700; font-size: 14px; text-decoration: none; cursor: pointer; }
.btn.dark { background: #e2e8f0; color: #0f172a; border-color: #e2e8f0; }
.btn.guest { margin-top: 12px; background: rgba(16, 185, 129, 0.08); border-color: rgba(16, 185, 129, 0.4); color: #34d399; }
.btn.ghost { margin-top: 12px; background: rgba(59, 130, 246, 0.08); border-color: rgba(59, 130, 246, 0.3); color: #60a5fa; font-size: 12px; text-transform: uppercase; letter-spacing: 1px; }
.banner { background: rgba(245, 158, 11, 0.1); border: 1px solid rgba(245, 158, 11, 0.4); color: #fbbf24; border-radius: 14px; padding: 12px 16px; font-size: 13px; margin-bottom: 16px; }
.steps { margin: 0; padding: 0; list-style: none; }
.steps li { padding: 12px 0; border-bottom: 1px solid #1e293b; }
.steps li:last-child { border-bottom: none; }
.steps b { color: #fff; display: block; margin-bottom: 4px; }
.steps p { margin: 0; color: #94a3b8; font-size: 14px; line-height: 1.5; }
.note { margin-top: 20px; background: rgba(245, 158, 11, 0.06); border: 1px solid rgba(245, 158, 11, 0.25); border-radius: 16px; padding: 16px; }
.note b { color: #fbbf24; font-size: 13px; }
.note p { margin: 6px 0 0; color: #b7a27a; font-size: 12px; line-height: 1.5; }
.stats { display: grid; grid-template-columns: repeat(3, 1fr); gap: 20px; margin: 24px 0; }
.stat { background: #111c33; border: 1px solid #1e293b; border-radius: 20px; padding: 20px; }
.stat .name { color: #94a3b8; font-size: 11px; font-weight: 800; text-transform: uppercase; letter-spacing: 1.5px; }
.stat .value { font-size: 36px; font-weight: 900; color: #fff; margin-top: 6px; }
.stat .hint { font-size: 10px; font-weight: 700; margin-top: 4px; }
.hint.red { color: #ef4444; } .hint.blue { color: #3b82f6; } .hint.green { color: #10b981; }
.search input { width: 320px; padding: 12px 16px; border-radius: 14px; border: 1px solid #1e293b; background: #0b1120; color: #fff; font-size: 14px; }
table { width: 100%; border-collapse: collapse; background: #111c33; border-radius: 20px; overflow: hidden; }
th { text-align: left; padding: 14px 20px; font-size: 11px; font-weight: 900; text-transform: uppercase; letter-spacing: 1.5px; color: #94a3b8; background: rgba(255, 255, 255, 0.03); }
td { padding: 18px 20px; border-top: 1px solid #1e293b; vertical-align: top; }
td .name { font-weight: 800; color: #fff; text-transform: uppercase; }
td .email { color: #64748b; font-size: 12px; }
td .date { font-weight: 700; color: #fff; font-size: 14px; }
td .ago { color: #ef4444; font-size: 10px; font-weight: 900; text-transform: uppercase; letter-spacing: 1px; margin-top: 2px; }
td .never { color: #ef4444; font-size: 11px; font-weight: 900; text-transform: uppercase; letter-spacing: 1px; }
td.right { text-align: right; }
.contact { display: inline-block; padding: 10px 18px; border-radius: 12px; border: 1px solid rgba(59, 130, 246, 0.3); background: rgba(59, 130, 246, 0.08); color: #60a5fa; font-size: 11px; font-weight: 800; text-transform: uppercase; letter-spacing: 1px; text-decoration: none; }
.empty { text-align: center; padding: 48px 20px; background: #111c33; border-radius: 20px; }
.empty h3 { color: #fff; margin: 0 0 6px; }
.empty p { color: #64748b; margin: 0; }
header.row { display: flex; justify-content: space-between; align-items: flex-end; gap: 16px; flex-wrap: wrap; }
"#;

const QR_SCRIPT: &str = r#"<script>
async function refresh() {
  try {
    const res = await fetch('/api/v1/access/current');
    if (!res.ok) return;
    const data = await res.json();
    document.getElementById('countdown').textContent = data.time_left;
    const img = document.getElementById('qr-img');
    if (img && img.dataset.token !== data.token) {
      img.src = data.qr_url;
      img.dataset.token = data.token;
      img.style.display = 'block';
      const empty = document.querySelector('.qr-empty');
      if (empty) empty.style.display = 'none';
    }
  } catch (_) {
    // backend hiccup: keep showing the last code
  }
}
setInterval(refresh, 1000);

async function rotateNow() {
  await fetch('/api/v1/access/rotate', { method: 'POST' });
  refresh();
}

async function registerGuest() {
  if (!confirm('¿Registrar acceso de invitado manual?')) return;
  const res = await fetch('/api/v1/access/guest', { method: 'POST' });
  alert(res.ok ? 'Acceso de invitado registrado correctamente' : 'Error al registrar');
}
</script>"#;

fn page_shell(title: &str, active: &str, body: &str, script: &str) -> String {
    let nav_class = |path: &str| if path == active { " class=\"active\"" } else { "" };
    format!(
        r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Beleza Dojo</title>
<style>{css}</style>
</head>
<body>
<nav>
  <span class="brand">Beleza <b>Dojo</b></span>
  <a href="/qr"{qr_active}>Código QR</a>
  <a href="/reportes"{rep_active}>Reportes</a>
  <a class="right" href="/auth/signout">Salir</a>
</nav>
<main>
{body}
</main>
{script}
</body>
</html>"#,
        title = title,
        css = PAGE_CSS,
        qr_active = nav_class("/qr"),
        rep_active = nav_class("/reportes"),
        body = body,
        script = script,
    )
}

fn render_login() -> String {
    format!(
        r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Iniciar sesión · Beleza Dojo</title>
<style>{css}
.login-wrap {{ min-height: 100vh; display: flex; align-items: center; justify-content: center; padding: 24px; }}
.login-card {{ width: 100%; max-width: 420px; background: #111c33; border: 1px solid #1e293b; border-radius: 28px; padding: 40px; text-align: center; }}
.login-card h2 {{ color: #fff; margin: 0 0 6px; }}
.login-card .sub {{ color: #94a3b8; font-size: 14px; margin-bottom: 28px; }}
.google {{ display: block; width: 100%; padding: 15px; border-radius: 16px; background: #fff; color: #0f172a; font-weight: 700; font-size: 15px; text-decoration: none; }}
.support {{ margin-top: 28px; font-size: 12px; color: #64748b; }}
.support a {{ color: #60a5fa; text-decoration: none; }}
"#,
        css = PAGE_CSS
    ) + r##"</style>
</head>
<body>
<div class="login-wrap">
  <div>
    <div style="text-align:center; margin-bottom: 32px;">
      <span class="pill">Portal de Miembros</span>
      <h1 style="font-size: 48px;">Beleza <span>Dojo</span></h1>
      <p class="tagline">Gestiona tu entrenamiento, revisa tus clases y accede al dojo con tu credencial digital.</p>
    </div>
    <div class="login-card">
      <h2>Bienvenido de nuevo</h2>
      <div class="sub">Inicia sesión con tu cuenta verificada</div>
      <a class="google" href="/auth/signin">Continuar con Google</a>
      <div class="support">¿Problemas para ingresar? <a href="#">Contacta soporte</a></div>
    </div>
  </div>
</div>
</body>
</html>"##
}

fn render_qr(
    state: &AppState,
    token: Option<&ActiveToken>,
    stale: bool,
    now: DateTime<Utc>,
) -> String {
    let qr_box = match token {
        Some(token) => {
            let access = qr::access_url(&state.config.public_url, &token.value);
            format!(
                r#"<img id="qr-img" src="{src}" alt="QR de Acceso" data-token="{tok}">"#,
                src = esc(&qr::image_url(&access)),
                tok = esc(&token.value),
            )
        }
        None => {
            r#"<img id="qr-img" src="" alt="QR de Acceso" data-token="" style="display:none">
<div class="qr-empty">Generando código...</div>"#
                .to_string()
        }
    };

    let banner = if stale {
        r#"<div class="banner">No se pudo renovar el código. Se muestra el último token emitido; se reintenta automáticamente.</div>"#
    } else {
        ""
    };

    let countdown = rotation::format_time_left(token.map(|t| t.expires_at), now);

    let body = format!(
        r#"<header class="row">
  <div>
    <span class="kicker">Control de Acceso</span>
    <h1>Código <span>QR</span></h1>
    <p class="tagline">Punto de acceso seguro para miembros del dojo.</p>
  </div>
  <span class="pill">Auto-Renovación Activa (30s)</span>
</header>
{banner}
<div class="grid">
  <div class="card">
    <div class="qr-box">
      {qr_box}
      <span class="status">Activo</span>
    </div>
    <p class="label">Tiempo Restante</p>
    <div id="countdown" class="countdown">{countdown}</div>
    <div class="actions">
      <a class="btn dark" href="/qr/download">Descargar</a>
      <a class="btn" href="/qr/print" target="_blank">Imprimir</a>
    </div>
    <button class="btn guest" onclick="registerGuest()">Registrar Acceso Invitado</button>
    <button class="btn ghost" onclick="rotateNow()">Generar Nuevo Token al Instante</button>
  </div>
  <div class="card">
    <h3 style="color:#fff; margin-top:0;">Instrucciones de Instalación</h3>
    <ol class="steps">
      <li><b>Imprime en Alta Calidad</b><p>Descarga el código en formato PNG y utiliza una impresora láser para mayor nitidez. Tamaño recomendado: A4 o A5.</p></li>
      <li><b>Colocación Estratégica</b><p>Ubica el código en un soporte vertical a 1.5m de altura en la entrada del gimnasio, evitando reflejos directos.</p></li>
      <li><b>Validación de Miembros</b><p>Los alumnos deberán escanear este código con su cámara. El sistema validará su estado de pago automáticamente.</p></li>
    </ol>
    <div class="note">
      <b>Seguridad del Token</b>
      <p>Este código QR contiene un token que expira automáticamente. Si sospechas que el código ha sido compartido digitalmente, usa el botón de regenerar para invalidar el anterior inmediatamente.</p>
    </div>
  </div>
</div>"#
    );

    page_shell("Código QR", "/qr", &body, QR_SCRIPT)
}

fn render_print(state: &AppState, token: &ActiveToken) -> String {
    let access = qr::access_url(&state.config.public_url, &token.value);
    let image = qr::image_url(&access);
    let valid_until = token.expires_at.format("%d/%m/%Y %H:%M:%S UTC");

    format!(
        r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>QR de Acceso - Beleza Dojo</title>
<style>
body {{
  display: flex; justify-content: center; align-items: center;
  min-height: 100vh; margin: 0;
  font-family: system-ui, -apple-system, sans-serif;
  background: #0f172a;
  color: white;
}}
.container {{
  text-align: center; padding: 60px;
  background: white; color: #0f172a;
  border-radius: 32px;
  box-shadow: 0 20px 50px rgba(0,0,0,0.5);
}}
h1 {{ margin: 0 0 10px; font-size: 32px; letter-spacing: -1px; }}
p {{ color: #64748b; margin: 0 0 30px; }}
img {{
  width: 300px; height: 300px;
  border: 2px solid #e2e8f0;
  border-radius: 20px;
  margin-bottom: 30px;
}}
.brand {{ color: #3b82f6; font-size: 24px; font-weight: 800; margin-bottom: 8px; }}
.meta {{ font-size: 14px; color: #94a3b8; }}
</style>
</head>
<body>
<div class="container">
  <h1>ACCESO GIMNASIO</h1>
  <p>Escanea el código para validar tu ingreso</p>
  <img src="{image}" alt="QR de Acceso" />
  <div class="brand">Beleza Dojo</div>
  <div class="meta">Válido hasta: {valid_until}</div>
</div>
<script>setTimeout(() => window.print(), 500)</script>
</body>
</html>"#,
        image = esc(&image),
        valid_until = valid_until,
    )
}

fn render_report(report: &AbsenceReport, search: &str) -> String {
    let table = if report.absent.is_empty() {
        r#"<div class="empty">
  <h3>¡Sin ausencias críticas!</h3>
  <p>Todos tus alumnos activos han asistido en la última semana.</p>
</div>"#
            .to_string()
    } else {
        let mut rows = String::new();
        for entry in &report.absent {
            rows.push_str(&render_report_row(entry));
        }
        format!(
            r#"<table>
<thead><tr><th>Alumno</th><th>Última Asistencia</th><th style="text-align:right">Acciones</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#
        )
    };

    let body = format!(
        r#"<header class="row">
  <div>
    <span class="kicker">Análisis de Retención</span>
    <h1>Alumnos <span>Ausentes</span></h1>
    <p class="tagline">Miembros activos que no han asistido en la última semana.</p>
  </div>
  <form class="search" method="get" action="/reportes">
    <input type="text" name="q" value="{q}" placeholder="Buscar por nombre o email...">
  </form>
</header>
<div class="stats">
  <div class="stat">
    <div class="name">Total Ausentes (+7 días)</div>
    <div class="value">{absent}</div>
    <div class="hint red">Requieren seguimiento inmediato</div>
  </div>
  <div class="stat">
    <div class="name">Ratio de Ausencia</div>
    <div class="value">{pct}%</div>
    <div class="hint blue">Sobre el total de miembros activos</div>
  </div>
  <div class="stat">
    <div class="name">Periodo de Análisis</div>
    <div class="value">7+</div>
    <div class="hint green">Días sin registros de acceso</div>
  </div>
</div>
{table}"#,
        q = esc(search),
        absent = report.absent.len(),
        pct = report.absent_pct,
        table = table,
    );

    page_shell("Reportes", "/reportes", &body, "")
}

fn render_report_row(entry: &AbsentMember) -> String {
    let last_seen = match (entry.last_access, entry.days_absent) {
        (Some(at), Some(days)) => format!(
            r#"<div class="date">{date}</div><div class="ago">Hace {days} días</div>"#,
            date = format_date_es(at),
        ),
        _ => r#"<div class="never">Sin registros recientes</div>"#.to_string(),
    };

    let message = format!(
        "Hola {}, te extrañamos en Beleza Dojo! Notamos que hace unos días no vienes a entrenar. ¿Todo bien? 🥋",
        entry.member.first_name,
    );
    let contact = format!("https://wa.me/?text={}", urlencoding::encode(&message));

    format!(
        r#"<tr>
  <td><div class="name">{name}</div><div class="email">{email}</div></td>
  <td>{last_seen}</td>
  <td class="right"><a class="contact" href="{contact}" target="_blank" rel="noopener">Contactar</a></td>
</tr>
"#,
        name = esc(&entry.member.full_name()),
        email = esc(&entry.member.email),
        last_seen = last_seen,
        contact = esc(&contact),
    )
}
