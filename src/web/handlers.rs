//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Há duas famílias:
//!
//! - **API JSON** — corpo `{ "text": "fact: (isa cube block)" }`, resposta JSON
//! - **HTMX** — mesmo campo `text` vindo de formulário, resposta em fragmento HTML
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `index` | GET | HTML completo | Página principal (Maud) |
//! | `kb_fragment` | GET | HTMX fragment | Listagem de fatos e regras |
//! | `kb_snapshot` | GET | JSON | Estado completo da KB |
//! | `assert_item` | POST | JSON | Afirma fato/regra |
//! | `retract_item` | POST | JSON | Retrai fato/regra |
//! | `ask` | POST | JSON | Consulta com variáveis |
//! | `ui_assert` / `ui_retract` / `ui_ask` | POST | HTMX fragment | Formulário da página |
//! | `reset_knowledge` | POST | HTMX fragment | Esvazia a KB |
//! | `sse_events` | GET | SSE stream | Alterações da KB |
//!
//! ## Erros
//!
//! Texto malformado vira [`ApiError`] → `400 Bad Request` com
//! `{ "error": "..." }`. Nos handlers HTMX o erro é renderizado como
//! fragmento (status 200), já que o HTMX não faz swap de respostas 4xx.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;

use super::state::AppState;
use super::templates;
use crate::core::{Answer, Change, FactId, ItemId, KnowledgeBase, RuleId};
use crate::error::ReadError;
use crate::web::events::KbEvent;

/// Corpo das requisições de assert/retract/ask (JSON ou formulário).
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Resposta de assert/retract.
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    /// Item afirmado. Ausente em retrações.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemId>,
    pub facts: usize,
    pub rules: usize,
    /// Tudo o que mudou na KB por causa desta requisição.
    pub changes: Vec<Change>,
}

/// Resposta de `/ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// `false` quando a consulta tinha forma de regra.
    pub valid: bool,
    pub results: Vec<AskMatch>,
}

/// Uma substituição que satisfaz a consulta.
#[derive(Debug, Serialize)]
pub struct AskMatch {
    /// `?x → a`, ordenado pelo nome da variável.
    pub bindings: BTreeMap<String, String>,
    /// Substituição em forma textual: `?x : a, ?y : b`.
    pub text: String,
    /// Fato da KB que casou com a consulta.
    pub fact: String,
    pub fact_id: FactId,
}

impl AskResponse {
    fn from_answer(answer: &Answer, kb: &KnowledgeBase) -> Self {
        let results = answer
            .bindings()
            .map(|list| {
                list.iter()
                    .map(|(bindings, fact_id)| AskMatch {
                        bindings: bindings
                            .iter()
                            .map(|b| (format!("?{}", b.variable), b.value.to_string()))
                            .collect(),
                        text: bindings.to_string(),
                        fact: kb
                            .fact(*fact_id)
                            .map(|f| f.statement.to_string())
                            .unwrap_or_default(),
                        fact_id: *fact_id,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            valid: answer.is_valid(),
            results,
        }
    }
}

/// Estado completo da KB, para `GET /kb`.
#[derive(Debug, Serialize)]
pub struct KbSnapshot {
    pub facts: Vec<FactView>,
    pub rules: Vec<RuleView>,
}

#[derive(Debug, Serialize)]
pub struct FactView {
    pub id: FactId,
    pub statement: String,
    pub asserted: bool,
    /// Justificativas: `fato + regra`, uma por entrada.
    pub supported_by: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RuleView {
    pub id: RuleId,
    pub text: String,
    pub asserted: bool,
    pub supported_by: Vec<String>,
}

/// Erro de requisição: texto que o [`Reader`](crate::reader::Reader) não aceita.
#[derive(Debug)]
pub struct ApiError(ReadError);

impl From<ReadError> for ApiError {
    fn from(error: ReadError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Requisição rejeitada");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Converte Maud Markup em resposta Html<String> do Axum.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

// ─── Operações compartilhadas entre API JSON e HTMX ──────────────

fn apply_assert(state: &AppState, text: &str) -> Result<MutationResponse, ReadError> {
    let item = state.reader.parse_item(text)?;
    let response = {
        let mut kb = state.kb.write();
        let id = kb.assert(item);
        MutationResponse {
            item: Some(id),
            facts: kb.fact_count(),
            rules: kb.rule_count(),
            changes: kb.drain_changes(),
        }
    };
    tracing::info!(item = ?response.item, changes = response.changes.len(), "Item afirmado");
    state.publish(&response.changes);
    Ok(response)
}

fn apply_retract(state: &AppState, text: &str) -> Result<MutationResponse, ReadError> {
    let item = state.reader.parse_item(text)?;
    let response = {
        let mut kb = state.kb.write();
        kb.retract(&item);
        MutationResponse {
            item: None,
            facts: kb.fact_count(),
            rules: kb.rule_count(),
            changes: kb.drain_changes(),
        }
    };
    tracing::info!(%item, changes = response.changes.len(), "Retração processada");
    state.publish(&response.changes);
    Ok(response)
}

fn run_query(state: &AppState, text: &str) -> Result<AskResponse, ReadError> {
    let query = state.reader.parse_query(text)?;
    let response = {
        let kb = state.kb.read();
        let answer = kb.ask(&query);
        AskResponse::from_answer(&answer, &kb)
    };
    if !response.valid {
        tracing::warn!(%query, "Consulta inválida: não tem forma de fato");
    }
    let _ = state.events_tx.send(KbEvent::Asked {
        query: text.trim().to_string(),
        valid: response.valid,
        matches: response.results.len(),
    });
    Ok(response)
}

/// Fragmento HTMX + cabeçalho `HX-Trigger: kb-changed`, que faz a
/// listagem da KB se recarregar.
fn changed_fragment(markup: maud::Markup) -> Response {
    ([("HX-Trigger", "kb-changed")], markup_to_html(markup)).into_response()
}

// ─── Páginas e fragmentos ────────────────────────────────────────

/// GET `/` — Página principal.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let kb = state.kb.read();
    markup_to_html(templates::full_page(&kb))
}

/// GET `/kb/fragment` — Listagem de fatos e regras.
///
/// Recarregada pelo HTMX quando chega o evento `kb-changed`.
pub async fn kb_fragment(State(state): State<AppState>) -> Html<String> {
    let kb = state.kb.read();
    markup_to_html(templates::kb_content(&kb))
}

/// GET `/kb` — Snapshot JSON da KB, em ordem de inserção.
pub async fn kb_snapshot(State(state): State<AppState>) -> Json<KbSnapshot> {
    let kb = state.kb.read();
    let facts = kb
        .facts()
        .map(|f| FactView {
            id: f.id,
            statement: f.statement.to_string(),
            asserted: f.asserted,
            supported_by: kb.describe_support(ItemId::Fact(f.id)),
        })
        .collect();
    let rules = kb
        .rules()
        .map(|r| RuleView {
            id: r.id,
            text: r.text(),
            asserted: r.asserted,
            supported_by: kb.describe_support(ItemId::Rule(r.id)),
        })
        .collect();
    Json(KbSnapshot { facts, rules })
}

// ─── API JSON ────────────────────────────────────────────────────

/// POST `/assert` — `{ "text": "fact: ..." }` ou `{ "text": "rule: ..." }`.
pub async fn assert_item(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    Ok(Json(apply_assert(&state, &req.text)?))
}

/// POST `/retract` — retrai um fato/regra afirmado e tudo que dependia dele.
///
/// Retrair algo ausente ou apenas derivado não é erro: a resposta vem
/// com `changes` vazio.
pub async fn retract_item(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<MutationResponse>, ApiError> {
    Ok(Json(apply_retract(&state, &req.text)?))
}

/// POST `/ask` — `{ "text": "(isa ?x block)" }`.
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    Ok(Json(run_query(&state, &req.text)?))
}

// ─── HTMX ────────────────────────────────────────────────────────

/// POST `/ui/assert` — formulário da página.
pub async fn ui_assert(State(state): State<AppState>, Form(req): Form<TextRequest>) -> Response {
    match apply_assert(&state, &req.text) {
        Ok(response) => changed_fragment(templates::mutation_feedback("Afirmado", &response.changes)),
        Err(e) => markup_to_html(templates::error_feedback(&e.to_string())).into_response(),
    }
}

/// POST `/ui/retract`
pub async fn ui_retract(State(state): State<AppState>, Form(req): Form<TextRequest>) -> Response {
    match apply_retract(&state, &req.text) {
        Ok(response) => changed_fragment(templates::mutation_feedback("Retraído", &response.changes)),
        Err(e) => markup_to_html(templates::error_feedback(&e.to_string())).into_response(),
    }
}

/// POST `/ui/ask`
pub async fn ui_ask(State(state): State<AppState>, Form(req): Form<TextRequest>) -> Html<String> {
    match run_query(&state, &req.text) {
        Ok(response) => markup_to_html(templates::ask_results(req.text.trim(), &response)),
        Err(e) => markup_to_html(templates::error_feedback(&e.to_string())),
    }
}

/// POST `/kb/reset` — Esvazia a KB.
///
/// Assinantes SSE recebem um único [`KbEvent::Reset`], não um
/// `ItemRemoved` por item.
pub async fn reset_knowledge(State(state): State<AppState>) -> Response {
    let (facts, rules) = {
        let mut kb = state.kb.write();
        let counts = (kb.fact_count(), kb.rule_count());
        kb.clear();
        counts
    };
    tracing::info!(facts, rules, "KB resetada pelo usuário");
    let _ = state.events_tx.send(KbEvent::Reset { facts, rules });
    changed_fragment(templates::reset_feedback())
}

// ─── SSE ─────────────────────────────────────────────────────────

/// GET `/events` — Stream SSE de alterações da KB.
///
/// Cria um subscriber no canal broadcast e converte cada [`KbEvent`]
/// em um `SseEvent` com JSON serializado. Keep-alive a cada 15s.
///
/// Se o subscriber ficar para trás (buffer cheio), mensagens
/// são silenciosamente descartadas.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None, // atrasadas
        }
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::web::create_router;

    fn app() -> (AppState, Router) {
        let state = AppState::new(KnowledgeBase::new(), 64);
        (state.clone(), create_router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn post_json(app: &Router, uri: &str, text: &str) -> (StatusCode, Value) {
        let body = serde_json::json!({ "text": text }).to_string();
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let (status, bytes) = send(app, request).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn assert_fact_and_rule_derives_new_fact() {
        let (_, app) = app();
        let (status, _) = post_json(&app, "/assert", "fact: (isa cube block)").await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = post_json(&app, "/assert", "rule: ((isa ?x block)) -> (heavy ?x)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["facts"], 2);
        assert_eq!(body["rules"], 1);
        assert_eq!(body["item"]["kind"], "Rule");

        let (_, bytes) = get(&app, "/kb").await;
        let snapshot: Value = serde_json::from_slice(&bytes).unwrap();
        let derived = &snapshot["facts"][1];
        assert_eq!(derived["statement"], "(heavy cube)");
        assert_eq!(derived["asserted"], false);
        assert_eq!(derived["supported_by"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_text_is_bad_request() {
        let (_, app) = app();
        let (status, body) = post_json(&app, "/assert", "fact: isa cube block").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("statement"));

        let (status, _) = post_json(&app, "/ask", "(?p a)").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn ask_returns_bindings_per_matching_fact() {
        let (_, app) = app();
        post_json(&app, "/assert", "fact: (isa cube block)").await;
        post_json(&app, "/assert", "fact: (isa pyramid block)").await;
        post_json(&app, "/assert", "fact: (isa table furniture)").await;

        let (status, body) = post_json(&app, "/ask", "(isa ?x block)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["bindings"]["?x"], "cube");
        assert_eq!(results[1]["text"], "?x : pyramid");
    }

    #[tokio::test]
    async fn ask_with_rule_is_invalid() {
        let (_, app) = app();
        let (status, body) = post_json(&app, "/ask", "rule: ((a ?x)) -> (b ?x)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
        assert!(body["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retract_cascades_through_derived_facts() {
        let (_, app) = app();
        post_json(&app, "/assert", "fact: (isa cube block)").await;
        post_json(&app, "/assert", "rule: ((isa ?x block)) -> (heavy ?x)").await;

        let (status, body) = post_json(&app, "/retract", "fact: (isa cube block)").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["facts"], 0);
        assert!(body.get("item").is_none());
        let removed = body["changes"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["kind"] == "Removed")
            .count();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn mutations_are_broadcast() {
        let (state, app) = app();
        let mut rx = state.events_tx.subscribe();
        post_json(&app, "/assert", "fact: (isa cube block)").await;

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, KbEvent::ItemAdded { ref text, .. } if text == "fact: (isa cube block)"));
    }

    #[tokio::test]
    async fn index_renders_kb() {
        let (state, app) = app();
        state
            .kb
            .write()
            .assert(state.reader.parse_item("fact: (on pyramid table)").unwrap());

        let (status, bytes) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("(on pyramid table)"));

        let (_, bytes) = get(&app, "/kb/fragment").await;
        assert!(String::from_utf8(bytes).unwrap().contains("(on pyramid table)"));
    }

    #[tokio::test]
    async fn ui_assert_triggers_refresh_and_reports_errors() {
        let (_, app) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/ui/assert")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("text=fact%3A+%28isa+cube+block%29"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Trigger"], "kb-changed");

        let request = Request::builder()
            .method("POST")
            .uri("/ui/assert")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("text=bogus"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("HX-Trigger").is_none());
    }

    #[tokio::test]
    async fn reset_empties_kb_and_notifies_subscribers() {
        let (state, app) = app();
        post_json(&app, "/assert", "fact: (isa cube block)").await;
        post_json(&app, "/assert", "rule: ((isa ?x block)) -> (heavy ?x)").await;
        let mut rx = state.events_tx.subscribe();
        let request = Request::builder()
            .method("POST")
            .uri("/kb/reset")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.kb.read().fact_count(), 0);

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, KbEvent::Reset { facts: 2, rules: 1 }));
    }
}
