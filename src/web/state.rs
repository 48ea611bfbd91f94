//! # Estado da Aplicação Web
//!
//! [`AppState`] é clonado para cada handler Axum. Tudo que ele carrega é
//! compartilhado via `Arc`:
//!
//! ```text
//! AppState
//!  ├── kb: Arc<RwLock<KnowledgeBase>>   ← único escritor por vez
//!  ├── reader: Arc<Reader>              ← regexes compiladas uma vez
//!  └── events_tx: Arc<broadcast::Sender<KbEvent>>
//! ```
//!
//! `assert` e `retract` reentram na KB recursivamente (agenda, cascata) e
//! por isso rodam inteiros sob o write lock; `ask` usa o read lock.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::core::{Change, KnowledgeBase};
use crate::reader::Reader;
use crate::web::events::KbEvent;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Base de conhecimento, protegida por `RwLock`.
    pub kb: Arc<RwLock<KnowledgeBase>>,
    /// Leitor de fatos/regras textuais.
    pub reader: Arc<Reader>,
    /// Canal broadcast para eventos SSE.
    pub events_tx: Arc<broadcast::Sender<KbEvent>>,
}

impl AppState {
    /// Cria o estado a partir de uma KB já populada.
    pub fn new(kb: KnowledgeBase, event_capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(event_capacity.max(1));
        Self {
            kb: Arc::new(RwLock::new(kb)),
            reader: Arc::new(Reader::new()),
            events_tx: Arc::new(events_tx),
        }
    }

    /// Transmite alterações da KB para os assinantes SSE.
    ///
    /// Sem assinantes, `send` falha e os eventos são descartados.
    pub fn publish(&self, changes: &[Change]) {
        for change in changes {
            let _ = self.events_tx.send(KbEvent::from(change.clone()));
        }
    }
}
