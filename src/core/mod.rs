//! # Módulo Core — Entidades e Base de Conhecimento
//!
//! Este módulo agrupa os tipos que o resto do sistema manipula:
//!
//! - [`Term`] / [`Statement`] — a sintaxe das afirmações (`(isa ?x block)`)
//! - [`Bindings`], [`match_statements`], [`instantiate`] — o serviço de unificação
//! - [`Fact`] — afirmação com justificativas (`asserted`, `supported_by`)
//! - [`Rule`] — implicação com antecedentes (`lhs`) e consequente (`rhs`)
//! - [`Item`] / [`ItemId`] — soma etiquetada `Fact | Rule`
//! - [`KnowledgeBase`] — contêiner central, único ponto de mutação
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use encadeamento::core::{Fact, KnowledgeBase, Rule, Statement, Term};
//!
//! let mut kb = KnowledgeBase::new();
//! let rule = Rule::new(
//!     vec![Statement::new("isa", vec![Term::var("x"), Term::constant("block")])],
//!     Statement::new("heavy", vec![Term::var("x")]),
//! )
//! .unwrap();
//! kb.assert(rule.into());
//! kb.assert(Fact::new(Statement::new("isa", vec![Term::constant("cube"), Term::constant("block")])).into());
//!
//! let heavy = Statement::new("heavy", vec![Term::constant("cube")]);
//! assert!(kb.find_fact(&heavy).is_some());
//! ```

/// Sub-módulo com [`Term`] e [`Statement`].
pub mod term;

/// Sub-módulo com o serviço de unificação.
pub mod bindings;

/// Sub-módulo com [`Fact`] e o par de suporte [`Support`].
pub mod fact;

/// Sub-módulo com [`Rule`].
pub mod rule;

/// Sub-módulo com [`Item`] e [`ItemId`].
pub mod item;

/// Sub-módulo com a implementação de [`KnowledgeBase`].
pub mod knowledge_base;

pub use bindings::{instantiate, match_statements, Binding, Bindings, ListOfBindings};
pub use fact::{Fact, FactId, Support};
pub use item::{Item, ItemId};
pub use knowledge_base::{Answer, Change, ChangeKind, KnowledgeBase};
pub use rule::{Rule, RuleId};
pub use term::{Statement, Term};
