//! # Unificação — Bindings, Match e Instanciação
//!
//! Serviço de unificação consumido pela [`KnowledgeBase`](super::KnowledgeBase)
//! (em `ask`) e pelo [`InferenceEngine`](crate::inference::InferenceEngine)
//! (em `fire`). Duas operações:
//!
//! - [`match_statements`] — encontra uma substituição que torna dois
//!   statements sintaticamente iguais, ou `None` se não existe
//! - [`instantiate`] — aplica uma substituição a um statement
//!
//! ## Falha Não é Erro
//!
//! A falha de unificação é um resultado **normal** — o motor de inferência
//! simplesmente não dispara. Por isso o retorno é `Option`, não `Result`.
//!
//! ## Exemplo
//!
//! ```rust
//! use encadeamento::core::{instantiate, match_statements, Statement, Term};
//!
//! let pattern = Statement::new("isa", vec![Term::var("x"), Term::constant("block")]);
//! let fact = Statement::new("isa", vec![Term::constant("cube"), Term::constant("block")]);
//!
//! let bindings = match_statements(&fact, &pattern).unwrap();
//! assert_eq!(bindings.bound_to("x"), Some(&Term::constant("cube")));
//!
//! let consequent = Statement::new("heavy", vec![Term::var("x")]);
//! assert_eq!(instantiate(&consequent, &bindings).to_string(), "(heavy cube)");
//! ```

use std::fmt;

use serde::Serialize;

use super::fact::FactId;
use super::term::{Statement, Term};

/// Uma ligação `variável → termo`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Binding {
    /// Nome da variável (sem o `?`).
    pub variable: String,
    /// Termo ao qual a variável está ligada.
    pub value: Term,
}

/// Substituição: lista ordenada de [`Binding`]s.
///
/// A ordem é a ordem em que as variáveis foram ligadas durante o match,
/// o que mantém a exibição estável (`?x : a, ?y : b`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Bindings {
    bindings: Vec<Binding>,
}

impl Bindings {
    /// Substituição vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna o termo ligado a `variable`, se houver.
    pub fn bound_to(&self, variable: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|b| b.variable == variable)
            .map(|b| &b.value)
    }

    /// Liga `variable` a `value` se ainda não ligada; se já ligada,
    /// verifica consistência.
    ///
    /// Retorna `false` quando a variável já está ligada a outro termo.
    pub fn test_and_bind(&mut self, variable: &str, value: &Term) -> bool {
        match self.bound_to(variable) {
            Some(existing) => existing == value,
            None => {
                self.bindings.push(Binding {
                    variable: variable.to_string(),
                    value: value.clone(),
                });
                true
            }
        }
    }

    /// Itera sobre as ligações em ordem.
    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Formato: `?x : cube, ?y : table`.
impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .bindings
            .iter()
            .map(|b| format!("?{} : {}", b.variable, b.value))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Resultado de um `ask`: cada substituição encontrada junto com o fato
/// da KB que a produziu.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListOfBindings {
    entries: Vec<(Bindings, FactId)>,
}

impl ListOfBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra uma substituição bem-sucedida e o fato correspondente.
    pub fn add_bindings(&mut self, bindings: Bindings, fact: FactId) {
        self.entries.push((bindings, fact));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Bindings, FactId)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unifica dois statements.
///
/// ## Algoritmo
///
/// ```text
/// predicados diferentes ou aridades diferentes → None
/// para cada par (t1, t2), da esquerda para a direita:
///   t1 == t2              → segue
///   t1 é variável         → test_and_bind(t1, t2)
///   t2 é variável         → test_and_bind(t2, t1)
///   constantes distintas  → None
/// ```
///
/// As ligações acumuladas valem para o statement inteiro: `(p ?x ?x)`
/// não unifica com `(p a b)`.
pub fn match_statements(a: &Statement, b: &Statement) -> Option<Bindings> {
    if a.predicate != b.predicate || a.arity() != b.arity() {
        return None;
    }
    let mut bindings = Bindings::new();
    for (t1, t2) in a.terms.iter().zip(&b.terms) {
        if t1 == t2 {
            continue;
        }
        let consistent = match (t1, t2) {
            (Term::Variable(name), other) => bindings.test_and_bind(name, other),
            (other, Term::Variable(name)) => bindings.test_and_bind(name, other),
            _ => false,
        };
        if !consistent {
            return None;
        }
    }
    Some(bindings)
}

/// Aplica a substituição: cada variável ligada é trocada pelo seu termo.
/// Variáveis sem ligação permanecem.
pub fn instantiate(statement: &Statement, bindings: &Bindings) -> Statement {
    let terms = statement
        .terms
        .iter()
        .map(|term| match term {
            Term::Variable(name) => bindings
                .bound_to(name)
                .cloned()
                .unwrap_or_else(|| term.clone()),
            Term::Constant(_) => term.clone(),
        })
        .collect();
    Statement::new(statement.predicate.clone(), terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(predicate: &str, terms: &[&str]) -> Statement {
        let terms = terms
            .iter()
            .map(|t| match t.strip_prefix('?') {
                Some(name) => Term::var(name),
                None => Term::constant(*t),
            })
            .collect();
        Statement::new(predicate, terms)
    }

    #[test]
    fn match_binds_variables_on_either_side() {
        let b = match_statements(&st("on", &["a", "?y"]), &st("on", &["?x", "b"])).unwrap();
        assert_eq!(b.bound_to("x"), Some(&Term::constant("a")));
        assert_eq!(b.bound_to("y"), Some(&Term::constant("b")));
    }

    #[test]
    fn match_fails_on_different_predicate_or_arity() {
        assert!(match_statements(&st("on", &["a"]), &st("in", &["a"])).is_none());
        assert!(match_statements(&st("on", &["a"]), &st("on", &["a", "b"])).is_none());
    }

    #[test]
    fn match_fails_on_distinct_constants() {
        assert!(match_statements(&st("color", &["a", "red"]), &st("color", &["a", "blue"])).is_none());
    }

    #[test]
    fn repeated_variable_must_bind_consistently() {
        assert!(match_statements(&st("same", &["?x", "?x"]), &st("same", &["a", "b"])).is_none());
        let b = match_statements(&st("same", &["?x", "?x"]), &st("same", &["a", "a"])).unwrap();
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn identical_ground_statements_match_with_empty_bindings() {
        let b = match_statements(&st("p", &["a"]), &st("p", &["a"])).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn instantiate_keeps_unbound_variables() {
        let mut b = Bindings::new();
        assert!(b.test_and_bind("x", &Term::constant("cube")));
        let out = instantiate(&st("near", &["?x", "?y"]), &b);
        assert_eq!(out.to_string(), "(near cube ?y)");
    }

    #[test]
    fn bindings_display() {
        let mut b = Bindings::new();
        b.test_and_bind("x", &Term::constant("a"));
        b.test_and_bind("y", &Term::constant("b"));
        assert_eq!(b.to_string(), "?x : a, ?y : b");
    }
}
