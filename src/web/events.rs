//! # Eventos SSE de Alteração da KB
//!
//! Define o enum [`KbEvent`] — tudo o que a camada web transmite em tempo
//! real via Server-Sent Events (`GET /events`).
//!
//! ## Origem dos Eventos
//!
//! ```text
//! KnowledgeBase::assert / retract
//!   └── diário interno (Vec<Change>)
//!         └── AppState::publish() → broadcast → SSE
//! ```
//!
//! Uma única chamada a `assert` pode produzir dezenas de eventos (cada
//! fato ou regra derivado vira um `ItemAdded`); uma retração pode produzir
//! uma cascata de `ItemRemoved`.
//!
//! ## Serialização
//!
//! `#[serde(tag = "type")]` produz JSON com discriminador:
//!
//! ```json
//! { "type": "ItemAdded", "item": { "kind": "Fact", "id": "uuid" }, "text": "fact: (heavy cube)" }
//! ```

use serde::Serialize;

use crate::core::{Change, ChangeKind, ItemId};

/// Evento transmitido ao frontend.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum KbEvent {
    /// Fato ou regra inserido (afirmado ou derivado).
    ItemAdded { item: ItemId, text: String },

    /// Fato ou regra removido (retração direta ou cascata).
    ItemRemoved { item: ItemId, text: String },

    /// Item existente ganhou mais uma justificativa.
    SupportMerged { item: ItemId, text: String },

    /// Item perdeu uma justificativa, mas pode continuar presente.
    SupportRemoved { item: ItemId, text: String },

    /// Item existente foi afirmado diretamente.
    Reasserted { item: ItemId, text: String },

    /// A afirmação direta do item foi revogada.
    Unasserted { item: ItemId, text: String },

    /// A KB foi esvaziada de uma vez.
    Reset {
        /// Fatos removidos.
        facts: usize,
        /// Regras removidas.
        rules: usize,
    },

    /// Uma consulta foi respondida.
    Asked {
        /// Consulta como recebida.
        query: String,
        /// `false` quando a consulta não tinha forma de fato.
        valid: bool,
        /// Número de substituições encontradas.
        matches: usize,
    },
}

impl From<Change> for KbEvent {
    fn from(change: Change) -> Self {
        let Change { kind, item, text } = change;
        match kind {
            ChangeKind::Added => KbEvent::ItemAdded { item, text },
            ChangeKind::Removed => KbEvent::ItemRemoved { item, text },
            ChangeKind::SupportMerged => KbEvent::SupportMerged { item, text },
            ChangeKind::SupportRemoved => KbEvent::SupportRemoved { item, text },
            ChangeKind::Reasserted => KbEvent::Reasserted { item, text },
            ChangeKind::Unasserted => KbEvent::Unasserted { item, text },
        }
    }
}
