//!
//! permitdesk HTTP shell
//! ---------------------
//! Axum server that fronts the dashboard. The browser asks it what to render for a
//! path and which navigation entries to draw; the answers come from the route guard
//! and the navigation filter evaluated against the one session held by the process.
//!
//! Responsibilities:
//! - Login/logout endpoints that set and clear the session role.
//! - Per-surface navigation with the active entry for the current location.
//! - A fallback that runs every other GET path through the guard, rendering the
//!   view or redirecting to the not-found page.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::SessionStore;
use crate::navigation::{self, NavTable, Surface};
use crate::routes::{RouteDecision, RouteTable};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionStore>,
    pub routes: RouteTable,
    pub nav: NavTable,
}

impl AppState {
    pub fn new(session: SessionStore) -> Self {
        Self { session: Arc::new(session), routes: RouteTable::default(), nav: NavTable::default() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .route("/nav/{surface}", get(get_nav))
        .fallback(shell)
        .with_state(state)
}

/// Serve on an already bound listener. Used by `run_with_config` and by tests.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    state.routes.validate().context("route table")?;
    state.nav.validate().context("navigation table")?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn run_with_config(cfg: Config) -> anyhow::Result<()> {
    let session = cfg.open_session();
    info!(
        target: "startup",
        "permitdesk starting: http_port={}, state_dir={:?}, persist={}, backend={}, role={:?}",
        cfg.http_port, cfg.state_dir, cfg.persist, session.backend_kind(), session.role()
    );
    if session.is_degraded() {
        tracing::warn!(target: "startup", "session storage unavailable; sessions will not survive a restart");
    }
    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {}", addr))?;
    info!("Starting server on {}", addr);
    serve(listener, AppState::new(session)).await
}

/// Convenience entry point using defaults and environment overrides.
pub async fn run() -> anyhow::Result<()> { run_with_config(Config::from_env_and_args(&[])).await }

#[derive(Debug, Deserialize)]
struct LoginPayload { role: String }

#[derive(Debug, Deserialize)]
struct NavQuery { path: Option<String> }

async fn get_session(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "role": state.session.role(),
        "backend": state.session.backend_kind(),
        "degraded": state.session.is_degraded(),
    }))
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> AppResult<Json<serde_json::Value>> {
    let role = state.session.set_role_str(&payload.role)?;
    info!(target: "session", "login role={}", role);
    Ok(Json(json!({"status":"ok","role": role})))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.session.clear_role();
    info!(target: "session", "logout");
    Json(json!({"status":"ok"}))
}

async fn get_nav(
    State(state): State<AppState>,
    Path(surface): Path<String>,
    Query(q): Query<NavQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let Some(surface) = Surface::parse(&surface) else {
        return Err(AppError::not_found("unknown_surface".to_string(), format!("no navigation surface '{}'", surface)));
    };
    let items = state.nav.filter(state.session.role(), surface);
    let active = q.path.as_deref().and_then(|p| navigation::active_item(&items, p));
    Ok(Json(json!({"surface": surface, "items": items, "active": active})))
}

async fn shell(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, Json(json!({"status":"error","code":"method_not_allowed"}))).into_response();
    }
    let path = uri.path();
    match state.routes.guard(state.session.role(), path) {
        RouteDecision::Render(view) => {
            Json(json!({"status":"ok","path": path,"view": view,"title": view.title()})).into_response()
        }
        RouteDecision::Redirect(to) => Redirect::to(to).into_response(),
    }
}
