//! Soma etiquetada `Fact | Rule` usada nas operações públicas da KB.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::fact::{Fact, FactId};
use super::rule::{Rule, RuleId};

/// Um fato ou uma regra, como entregue a `assert` / `retract` / `ask`.
#[derive(Clone, Debug)]
pub enum Item {
    Fact(Fact),
    Rule(Rule),
}

impl From<Fact> for Item {
    fn from(fact: Fact) -> Self {
        Item::Fact(fact)
    }
}

impl From<Rule> for Item {
    fn from(rule: Rule) -> Self {
        Item::Rule(rule)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Fact(fact) => write!(f, "fact: {}", fact.statement),
            Item::Rule(rule) => f.write_str(&rule.text()),
        }
    }
}

/// Identificador de um item já integrado à KB.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum ItemId {
    Fact(FactId),
    Rule(RuleId),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Fact(id) => write!(f, "fact:{}", id),
            ItemId::Rule(id) => write!(f, "rule:{}", id),
        }
    }
}
