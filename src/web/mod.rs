//! # Módulo Web — Interface HTTP da Base de Conhecimento
//!
//! Camada web construída com **Axum** + **HTMX** + **Maud** + **SSE**.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX + EventSource)  /  clientes JSON          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── GET  /              → página principal             │
//! │  ├── GET  /kb            → JSON: fatos + regras         │
//! │  ├── GET  /kb/fragment   → HTMX fragment                │
//! │  ├── POST /kb/reset      → HTMX fragment                │
//! │  ├── POST /assert        → JSON                         │
//! │  ├── POST /retract       → JSON                         │
//! │  ├── POST /ask           → JSON                         │
//! │  ├── POST /ui/assert     → HTMX fragment                │
//! │  ├── POST /ui/retract    → HTMX fragment                │
//! │  ├── POST /ui/ask        → HTMX fragment                │
//! │  └── GET  /events        → SSE stream (alterações)      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Static Assets (tower_http::ServeDir → /assets/)         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Enum de eventos SSE |
//! | [`handlers`] | Handlers Axum para cada rota |
//! | [`templates`] | Templates Maud (HTML server-side) |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// A API JSON aceita requisições de qualquer origem (`CorsLayer::permissive`).
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Páginas HTML ──────────────────────────────────────
        .route("/", get(handlers::index))
        // ── API JSON ──────────────────────────────────────────
        .route("/kb", get(handlers::kb_snapshot))
        .route("/assert", post(handlers::assert_item))
        .route("/retract", post(handlers::retract_item))
        .route("/ask", post(handlers::ask))
        .route("/events", get(handlers::sse_events))
        // ── HTMX fragments ───────────────────────────────────
        .route("/kb/fragment", get(handlers::kb_fragment))
        .route("/kb/reset", post(handlers::reset_knowledge))
        .route("/ui/assert", post(handlers::ui_assert))
        .route("/ui/retract", post(handlers::ui_retract))
        .route("/ui/ask", post(handlers::ui_ask))
        // ── Arquivos estáticos ────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
