//! # Templates Maud — HTML Server-Side Rendering
//!
//! Templates HTML compilados junto com o código via o macro
//! [`maud`](https://maud.lambda.xyz/). O frontend segue o padrão
//! **Hypermedia-Driven**: o servidor devolve fragmentos HTML e o HTMX os
//! injeta no DOM.
//!
//! ## Templates Disponíveis
//!
//! | Função | Tipo | Descrição |
//! |--------|------|-----------|
//! | [`full_page()`] | Página completa | Console + listagem + feed SSE |
//! | [`kb_content()`] | Fragment HTMX | Fatos e regras com justificativas |
//! | [`mutation_feedback()`] | Fragment HTMX | Resultado de assert/retract |
//! | [`ask_results()`] | Fragment HTMX | Substituições de uma consulta |
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────── nav-bar ──────────────────────┐
//! │ ⇒ Encadeamento                     ● eventos │
//! ├────────────────────────┬──────────────────────┤
//! │ [fact: (...)_________] │ Fatos                │
//! │ [Assert][Retract][Ask] │  (isa cube block) ●  │
//! │                        │  (heavy cube)     ○  │
//! │  #feedback             │ Regras               │
//! │                        │  rule: (...) -> ...  │
//! │  #event-log (SSE)      │                      │
//! └────────────────────────┴──────────────────────┘
//! ```
//!
//! A listagem (`#kb-content`) é recarregada quando a resposta de uma
//! mutação traz `HX-Trigger: kb-changed`.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::core::{Change, ChangeKind, ItemId, KnowledgeBase};
use crate::web::handlers::AskResponse;

/// Página principal: console de comandos, listagem da KB e feed de eventos.
pub fn full_page(kb: &KnowledgeBase) -> Markup {
    html! {
        (DOCTYPE)
        html lang="pt-BR" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Encadeamento — Base de Conhecimento" }
                link rel="stylesheet" href="/assets/style.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                div class="app-shell" {
                    nav class="nav-bar" {
                        a href="/" class="nav-brand" {
                            span class="nav-brand-icon" { "⇒" }
                            span class="nav-brand-text" { "Encadeamento" }
                        }
                        div class="nav-status" {
                            span class="nav-status-dot" id="status-dot" {}
                            span id="status-text" { "conectando..." }
                        }
                    }

                    div class="app-container" {
                        div class="console-panel" {
                            form id="command-form" hx-target="#feedback" hx-swap="innerHTML" {
                                input type="text" name="text"
                                    placeholder="fact: (isa cube block)  |  rule: ((isa ?x block)) -> (heavy ?x)  |  (isa ?x block)"
                                    autocomplete="off"
                                    autofocus;
                                div class="command-buttons" {
                                    button type="button" hx-post="/ui/assert" { "Assert" }
                                    button type="button" hx-post="/ui/retract" { "Retract" }
                                    button type="button" hx-post="/ui/ask" { "Ask" }
                                    button type="button" class="danger"
                                        hx-post="/kb/reset"
                                        hx-confirm="Remover todos os fatos e regras?" {
                                        "Reset"
                                    }
                                }
                            }

                            div id="feedback" class="feedback" {
                                div class="feedback-hint" {
                                    p { "Fatos: " code { "fact: (predicado termo ...)" } }
                                    p { "Regras: " code { "rule: ((a ?x) (b ?x)) -> (c ?x)" } }
                                    p { "Consultas: " code { "(predicado ?var ...)" } }
                                }
                            }

                            div class="event-log-section" {
                                h3 { "Eventos" }
                                ul id="event-log" class="event-log" {}
                            }
                        }

                        div id="kb-content" class="kb-panel"
                            hx-get="/kb/fragment"
                            hx-trigger="kb-changed from:body" {
                            (kb_content(kb))
                        }
                    }
                }

                (PreEscaped(r#"<script>
(function() {
  var dot = document.getElementById('status-dot');
  var status = document.getElementById('status-text');
  var log = document.getElementById('event-log');
  var es = new EventSource('/events');
  es.onopen = function() { dot.className = 'nav-status-dot ready'; status.textContent = 'ao vivo'; };
  es.onerror = function() { dot.className = 'nav-status-dot'; status.textContent = 'reconectando...'; };
  es.onmessage = function(e) {
    try {
      var ev = JSON.parse(e.data);
      var li = document.createElement('li');
      li.className = 'event ' + ev.type;
      if (ev.type === 'Asked') {
        li.textContent = 'Asked ' + ev.query + ' → ' + ev.matches;
      } else if (ev.type === 'Reset') {
        li.textContent = 'Reset ' + ev.facts + ' fatos, ' + ev.rules + ' regras';
        htmx.trigger(document.body, 'kb-changed');
      } else {
        li.textContent = ev.type + ' ' + ev.text;
      }
      log.insertBefore(li, log.firstChild);
      while (log.children.length > 100) log.removeChild(log.lastChild);
    } catch(err) {}
  };
})();
</script>"#))
            }
        }
    }
}

/// Listagem de fatos e regras, com suas justificativas.
///
/// Itens afirmados levam o marcador `●`; itens só derivados, `○`.
pub fn kb_content(kb: &KnowledgeBase) -> Markup {
    html! {
        div class="kb-stats" {
            div class="stat" {
                span class="stat-value" { (kb.fact_count()) }
                span class="stat-label" { "Fatos" }
            }
            div class="stat" {
                span class="stat-value" { (kb.rule_count()) }
                span class="stat-label" { "Regras" }
            }
        }

        @if kb.fact_count() > 0 {
            div class="kb-section" {
                h3 { "Fatos" }
                @for fact in kb.facts() {
                    (item_card(
                        &fact.statement.to_string(),
                        fact.asserted,
                        &kb.describe_support(ItemId::Fact(fact.id)),
                    ))
                }
            }
        }

        @if kb.rule_count() > 0 {
            div class="kb-section" {
                h3 { "Regras" }
                @for rule in kb.rules() {
                    (item_card(
                        &rule.text(),
                        rule.asserted,
                        &kb.describe_support(ItemId::Rule(rule.id)),
                    ))
                }
            }
        }

        @if kb.fact_count() == 0 && kb.rule_count() == 0 {
            div class="kb-empty" {
                p { "Nenhum fato ou regra ainda." }
                p class="hint" { "Afirme um fato para começar." }
            }
        }
    }
}

fn item_card(text: &str, asserted: bool, supports: &[String]) -> Markup {
    html! {
        div class=(if asserted { "item-card asserted" } else { "item-card derived" }) {
            div class="item-header" {
                span class="item-marker" title=(if asserted { "afirmado" } else { "derivado" }) {
                    @if asserted { "●" } @else { "○" }
                }
                code class="item-text" { (text) }
            }
            @if !supports.is_empty() {
                ul class="item-supports" {
                    @for support in supports {
                        li { "⇐ " code { (support) } }
                    }
                }
            }
        }
    }
}

/// Resultado de um assert/retract: o que mudou na KB.
pub fn mutation_feedback(action: &str, changes: &[Change]) -> Markup {
    html! {
        div class="feedback-result" {
            div class="feedback-title" { (action) }
            @if changes.is_empty() {
                p class="hint" { "Nada mudou." }
            } @else {
                ul class="change-list" {
                    @for change in changes {
                        li class=(change_class(&change.kind)) {
                            span class="change-kind" { (change_label(&change.kind)) }
                            " "
                            code { (change.text) }
                        }
                    }
                }
            }
        }
    }
}

/// Substituições encontradas por uma consulta.
pub fn ask_results(query: &str, response: &AskResponse) -> Markup {
    html! {
        div class="feedback-result" {
            div class="feedback-title" { "Ask " code { (query) } }
            @if !response.valid {
                p class="error" { "Consulta inválida: apenas fatos podem ser consultados." }
            } @else if response.results.is_empty() {
                p class="hint" { "Nenhum fato casa com a consulta." }
            } @else {
                ul class="binding-list" {
                    @for result in &response.results {
                        li {
                            @if result.text.is_empty() {
                                span class="binding" { "sim" }
                            } @else {
                                span class="binding" { (result.text) }
                            }
                            " ⇐ "
                            code { (result.fact) }
                        }
                    }
                }
            }
        }
    }
}

/// Texto que o reader não aceitou.
pub fn error_feedback(message: &str) -> Markup {
    html! {
        div class="feedback-result" {
            p class="error" { (message) }
        }
    }
}

pub fn reset_feedback() -> Markup {
    html! {
        div class="feedback-result" {
            p { "Base de conhecimento esvaziada." }
        }
    }
}

fn change_label(kind: &ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "+",
        ChangeKind::Removed => "−",
        ChangeKind::SupportMerged => "+⇐",
        ChangeKind::SupportRemoved => "−⇐",
        ChangeKind::Reasserted => "●",
        ChangeKind::Unasserted => "○",
    }
}

fn change_class(kind: &ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added | ChangeKind::SupportMerged | ChangeKind::Reasserted => "change added",
        ChangeKind::Removed | ChangeKind::SupportRemoved | ChangeKind::Unasserted => "change removed",
    }
}
