//! # Rule — Implicação com Antecedentes e Consequente
//!
//! Uma [`Rule`] tem uma lista ordenada e **não vazia** de antecedentes
//! (`lhs`) e um consequente (`rhs`):
//!
//! ```text
//! rule: ((motherof ?m ?c) (motherof ?g ?m)) -> (grandmotherof ?g ?c)
//!        └──────────── lhs ───────────────┘     └────── rhs ───────┘
//! ```
//!
//! Só o **primeiro** antecedente é comparado com um fato novo. Quando ele
//! casa e há mais antecedentes, nasce uma regra especializada com os
//! antecedentes restantes (ver [`InferenceEngine`](crate::inference::InferenceEngine)).
//!
//! A contabilidade de suporte é idêntica à de [`Fact`](super::Fact).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fact::{FactId, Support};
use super::term::Statement;

/// Alias de tipo para o identificador de uma [Rule].
pub type RuleId = Uuid;

/// Regra da base de conhecimento.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rule {
    /// Identificador (UUID v4).
    pub id: RuleId,

    /// Antecedentes, em ordem. Nunca vazio.
    pub lhs: Vec<Statement>,

    /// Consequente.
    pub rhs: Statement,

    /// `true` se um chamador externo afirmou esta regra.
    pub asserted: bool,

    /// Derivações que justificam a regra.
    pub supported_by: Vec<Support>,

    /// Fatos derivados com a ajuda desta regra.
    pub supports_facts: Vec<FactId>,

    /// Regras derivadas (especializadas) a partir desta regra.
    pub supports_rules: Vec<RuleId>,

    /// Momento em que a regra foi criada.
    pub created_at: DateTime<Utc>,
}

impl Rule {
    /// Cria uma regra afirmada diretamente.
    ///
    /// Retorna `None` se `lhs` estiver vazio: uma regra sem antecedentes
    /// não tem como disparar.
    pub fn new(lhs: Vec<Statement>, rhs: Statement) -> Option<Self> {
        if lhs.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            lhs,
            rhs,
            asserted: true,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
            created_at: Utc::now(),
        })
    }

    /// Cria uma regra especializada pelo motor de inferência.
    ///
    /// O chamador garante `lhs` não vazio (são os antecedentes restantes
    /// de uma regra com dois ou mais).
    pub(crate) fn derived(lhs: Vec<Statement>, rhs: Statement, support: Support) -> Self {
        debug_assert!(!lhs.is_empty(), "regra derivada sem antecedentes");
        Self {
            id: Uuid::new_v4(),
            lhs,
            rhs,
            asserted: false,
            supported_by: vec![support],
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Chave de identidade estrutural (lhs + rhs).
    pub fn shape(&self) -> (Vec<Statement>, Statement) {
        (self.lhs.clone(), self.rhs.clone())
    }

    /// Forma textual sem marcadores: `rule: ((a ?x) (b ?x)) -> (c ?x)`.
    pub fn text(&self) -> String {
        let lhs: Vec<String> = self.lhs.iter().map(|s| s.to_string()).collect();
        format!("rule: ({}) -> {}", lhs.join(" "), self.rhs)
    }

    /// `true` se ainda há alguma razão para a regra estar na KB.
    pub fn is_justified(&self) -> bool {
        self.asserted || !self.supported_by.is_empty()
    }
}

/// Formato: `rule: ((a ?x) (b ?x)) -> (c ?x)`.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())?;
        if self.asserted {
            write!(f, " [asserted]")?;
        }
        if !self.supported_by.is_empty() {
            write!(f, " [supports: {}]", self.supported_by.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Term;

    #[test]
    fn empty_lhs_is_rejected() {
        let rhs = Statement::new("q", vec![Term::var("x")]);
        assert!(Rule::new(vec![], rhs).is_none());
    }

    #[test]
    fn display_lists_antecedents() {
        let rule = Rule::new(
            vec![
                Statement::new("a", vec![Term::var("x")]),
                Statement::new("b", vec![Term::var("x")]),
            ],
            Statement::new("c", vec![Term::var("x")]),
        )
        .unwrap();
        assert_eq!(rule.to_string(), "rule: ((a ?x) (b ?x)) -> (c ?x) [asserted]");
    }
}
