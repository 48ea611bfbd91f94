//! # Term e Statement — A Sintaxe das Afirmações
//!
//! Um [`Statement`] é a forma estruturada de uma afirmação lógica:
//! um **predicado** seguido de uma lista ordenada de [`Term`]s.
//!
//! ```text
//! (isa ?x block)
//!  │    │   └── Term::Constant("block")
//!  │    └────── Term::Variable("x")
//!  └─────────── predicado "isa"
//! ```
//!
//! ## Igualdade Estrutural
//!
//! Dois statements são iguais quando têm o mesmo predicado e os mesmos
//! termos, na mesma ordem. Essa igualdade (derivada via `PartialEq`/`Hash`)
//! é a **identidade** usada pela [`KnowledgeBase`](super::KnowledgeBase)
//! para deduplicar fatos e regras — nunca igualdade por ponteiro.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use encadeamento::core::{Statement, Term};
//!
//! let s = Statement::new("isa", vec![Term::var("x"), Term::constant("block")]);
//! assert_eq!(s.to_string(), "(isa ?x block)");
//! assert!(!s.is_ground());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Termo de um statement: uma variável (`?x`) ou uma constante (`cube`).
///
/// O nome da variável é armazenado **sem** o prefixo `?`; o prefixo
/// aparece apenas na forma textual (ver [`fmt::Display`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Variável lógica: pode ser ligada a qualquer termo pela unificação.
    Variable(String),
    /// Constante: só unifica com ela mesma (ou com uma variável).
    Constant(String),
}

impl Term {
    /// Atalho para criar uma [`Term::Variable`].
    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable(name.into())
    }

    /// Atalho para criar uma [`Term::Constant`].
    pub fn constant(value: impl Into<String>) -> Self {
        Term::Constant(value.into())
    }

    /// `true` se o termo é uma variável.
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "?{}", name),
            Term::Constant(value) => write!(f, "{}", value),
        }
    }
}

/// Afirmação estruturada: predicado + lista ordenada de termos.
///
/// É o conteúdo de um [`Fact`](super::Fact) e cada um dos antecedentes
/// e o consequente de uma [`Rule`](super::Rule).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Símbolo do predicado (ex: `"isa"`, `"motherof"`).
    pub predicate: String,
    /// Argumentos do predicado, em ordem.
    pub terms: Vec<Term>,
}

impl Statement {
    /// Cria um statement a partir do predicado e dos termos.
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Número de argumentos do predicado.
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// `true` se nenhum termo é variável.
    pub fn is_ground(&self) -> bool {
        !self.terms.iter().any(Term::is_variable)
    }
}

/// Formato textual: `(predicado termo1 termo2 ...)`.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.predicate)?;
        for term in &self.terms {
            write!(f, " {}", term)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_question_mark_for_variables() {
        let s = Statement::new("isa", vec![Term::var("x"), Term::constant("block")]);
        assert_eq!(s.to_string(), "(isa ?x block)");
    }

    #[test]
    fn equality_is_structural() {
        let a = Statement::new("on", vec![Term::constant("a"), Term::constant("b")]);
        let b = Statement::new("on", vec![Term::constant("a"), Term::constant("b")]);
        let c = Statement::new("on", vec![Term::constant("b"), Term::constant("a")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ground_detection() {
        assert!(Statement::new("p", vec![Term::constant("a")]).is_ground());
        assert!(!Statement::new("p", vec![Term::var("x")]).is_ground());
        // Predicado sem argumentos é trivialmente ground
        assert!(Statement::new("raining", vec![]).is_ground());
    }
}
