//! # Fact — Afirmação com Justificativas
//!
//! Um [`Fact`] envolve um único [`Statement`] e carrega a contabilidade
//! de **manutenção de verdade** (truth maintenance):
//!
//! | Campo | Significado |
//! |-------|-------------|
//! | `asserted` | O chamador afirmou este fato diretamente |
//! | `supported_by` | Pares `(fato, regra)` — cada um é uma derivação que o justifica |
//! | `supports_facts` | Fatos que este fato ajudou a derivar (referência fraca, por id) |
//! | `supports_rules` | Regras que este fato ajudou a derivar (referência fraca, por id) |
//!
//! ## Ciclo de Vida
//!
//! ```text
//! Fact::new(stmt)                    → asserted = true,  supported_by = []
//! Fact::derived(stmt, (fato, regra)) → asserted = false, supported_by = [(fato, regra)]
//! ```
//!
//! Um fato permanece na KB **enquanto** `asserted == true` **ou**
//! `supported_by` não estiver vazio.
//!
//! As back-references são apenas ids: quem **possui** os fatos é a
//! [`KnowledgeBase`](super::KnowledgeBase). Elas existem para que a
//! retração em cascata saiba rapidamente "o que este fato justifica".

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::rule::RuleId;
use super::term::Statement;

/// Alias de tipo para o identificador de um [Fact].
///
/// Atribuído pela KB quando o fato é inserido. Fatos ainda não
/// integrados carregam um id provisório que é descartado se o fato
/// já existir na KB.
pub type FactId = Uuid;

/// Uma justificativa derivada: o fato que disparou e a regra que disparou.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Support {
    pub fact: FactId,
    pub rule: RuleId,
}

impl Support {
    pub fn new(fact: FactId, rule: RuleId) -> Self {
        Self { fact, rule }
    }
}

/// Fato da base de conhecimento.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Fact {
    /// Identificador (UUID v4).
    pub id: FactId,

    /// A afirmação em si. Define a identidade do fato na KB.
    pub statement: Statement,

    /// `true` se um chamador externo afirmou este fato,
    /// independente de qualquer derivação.
    pub asserted: bool,

    /// Derivações que justificam o fato. Cada par aparece no máximo uma vez.
    pub supported_by: Vec<Support>,

    /// Fatos derivados com a ajuda deste fato.
    pub supports_facts: Vec<FactId>,

    /// Regras derivadas com a ajuda deste fato.
    pub supports_rules: Vec<RuleId>,

    /// Momento em que o fato foi criado.
    pub created_at: DateTime<Utc>,
}

impl Fact {
    /// Cria um fato afirmado diretamente (sem suporte).
    pub fn new(statement: Statement) -> Self {
        Self {
            id: Uuid::new_v4(),
            statement,
            asserted: true,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Cria um fato derivado pelo motor de inferência, com uma única
    /// justificativa inicial.
    pub(crate) fn derived(statement: Statement, support: Support) -> Self {
        Self {
            asserted: false,
            supported_by: vec![support],
            ..Self::new(statement)
        }
    }

    /// `true` se ainda há alguma razão para o fato estar na KB.
    pub fn is_justified(&self) -> bool {
        self.asserted || !self.supported_by.is_empty()
    }
}

/// Formato: `fact: (isa cube block)`, com `[asserted]` e número de
/// suportes quando relevante.
impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fact: {}", self.statement)?;
        if self.asserted {
            write!(f, " [asserted]")?;
        }
        if !self.supported_by.is_empty() {
            write!(f, " [supports: {}]", self.supported_by.len())?;
        }
        Ok(())
    }
}
