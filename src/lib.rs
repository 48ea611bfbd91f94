//! # Encadeamento — Base de Conhecimento com Encadeamento Para Frente
//!
//! Motor de inferência por encadeamento para frente com manutenção de
//! verdade: fatos e regras afirmados geram, por unificação, novos fatos e
//! regras especializadas; cada item derivado guarda suas justificativas, e
//! retrair um item afirmado remove em cascata tudo que deixou de ter
//! sustentação.
//!
//! ## Camadas
//!
//! | Módulo | Papel |
//! |--------|-------|
//! | [`core`] | Termos, statements, unificação, fatos, regras, [`KnowledgeBase`](core::KnowledgeBase) |
//! | [`inference`] | Passo de disparo `(fato, regra)` |
//! | [`reader`] | Formato textual `fact: ...` / `rule: ... -> ...` |
//! | [`config`] | Configuração (arquivo JSON + ambiente) |
//! | [`error`] | Erros de leitura e configuração |
//! | [`web`] | Servidor Axum: API JSON, páginas HTMX, SSE |

pub mod config;
pub mod core;
pub mod error;
pub mod inference;
pub mod reader;
pub mod web;
