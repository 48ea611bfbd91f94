//! # Módulo Inference — Motor de Encadeamento Para Frente
//!
//! O motor de inferência é um **procedimento sem estado** invocado pela
//! [`KnowledgeBase`](crate::core::KnowledgeBase) sempre que um fato ou uma
//! regra novos entram. Cada invocação tenta um único par `(fato, regra)` e
//! produz no máximo um item derivado:
//!
//! | Antecedentes da regra | Resultado do disparo |
//! |-----------------------|----------------------|
//! | 2 ou mais | Regra especializada com os antecedentes restantes |
//! | exatamente 1 | Fato novo (o consequente instanciado) |
//!
//! A propagação recursiva é dirigida pela KB: todo item derivado volta
//! por `add`, que enfileira novos pares na agenda.
//!
//! Veja [`InferenceEngine`] para detalhes.

/// Sub-módulo com o passo de disparo.
pub mod chaining;

/// Re-export do motor para acesso via `crate::inference::InferenceEngine`.
pub use chaining::InferenceEngine;
