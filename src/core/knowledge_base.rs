//! # KnowledgeBase — Contêiner Central de Fatos e Regras
//!
//! A [`KnowledgeBase`] é o **único ponto de mutação** do sistema: todo
//! fato ou regra entra por [`assert()`](KnowledgeBase::assert) e sai por
//! [`retract()`](KnowledgeBase::retract). Consultas passam por
//! [`ask()`](KnowledgeBase::ask), que não altera nada.
//!
//! ## Armazenamento
//!
//! - **Fatos**: `HashMap<FactId, Fact>` + `Vec<FactId>` (ordem de inserção)
//! - **Regras**: `HashMap<RuleId, Rule>` + `Vec<RuleId>` (ordem de inserção)
//! - **Índices de identidade**: `Statement → FactId` e `(lhs, rhs) → RuleId`
//!
//! Os índices garantem que nunca existam dois fatos com o mesmo statement
//! nem duas regras com o mesmo `(lhs, rhs)`.
//!
//! ## Encadeamento Para Frente
//!
//! ```text
//! assert(item)
//!   └── add(item)
//!         ├── novo?  → insere, enfileira (fato, regra) para cada contraparte
//!         └── igual? → mescla suportes  ou  marca asserted = true
//!   └── agenda: enquanto houver pares pendentes
//!         └── InferenceEngine::fire(fato, regra) → add(derivado) → ...
//! ```
//!
//! A agenda (fila FIFO) substitui a recursão `add → fire → add`: o
//! `assert` só retorna quando tudo que é derivável foi derivado.
//!
//! ## Manutenção de Verdade
//!
//! Um item permanece na KB **se e somente se** `asserted == true` ou
//! `supported_by` não está vazio. Retirar um item remove, de cada
//! dependente, os pares `(fato, regra)` que o citam; dependentes que
//! ficam sem justificativa caem em cascata.
//!
//! ```text
//! retract(p(a))          p(a) ──┬── (p(a), r1) ──► q(a) ── (q(a), r2) ──► s(a)
//!   p(a) removido               │
//!   q(a) sem suporte → removido │
//!   s(a) sem suporte → removido ┘
//! ```
//!
//! ## Concorrência
//!
//! Nenhuma. Todas as operações são síncronas e rodam até o fim. No
//! servidor, a KB fica atrás de `Arc<RwLock<KnowledgeBase>>` — um único
//! escritor por vez.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::Serialize;

use super::bindings::{match_statements, ListOfBindings};
use super::fact::{Fact, FactId, Support};
use super::item::{Item, ItemId};
use super::rule::{Rule, RuleId};
use super::term::Statement;
use crate::inference::InferenceEngine;

/// Chave de identidade estrutural de uma regra.
type RuleShape = (Vec<Statement>, Statement);

/// Resultado de um [`ask()`](KnowledgeBase::ask).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", content = "results")]
pub enum Answer {
    /// A consulta não tem forma de fato (ex: é uma regra).
    Invalid,
    /// Substituições encontradas (possivelmente nenhuma).
    Bindings(ListOfBindings),
}

impl Answer {
    pub fn is_valid(&self) -> bool {
        matches!(self, Answer::Bindings(_))
    }

    /// Lista de substituições, ou `None` se a consulta era inválida.
    pub fn bindings(&self) -> Option<&ListOfBindings> {
        match self {
            Answer::Invalid => None,
            Answer::Bindings(list) => Some(list),
        }
    }
}

/// Tipo de alteração registrada no diário da KB.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    /// Item novo inserido.
    Added,
    /// Item removido (retração direta ou cascata).
    Removed,
    /// Item já existente ganhou uma nova justificativa derivada.
    SupportMerged,
    /// Item perdeu uma justificativa porque um de seus suportes caiu.
    SupportRemoved,
    /// Item já existente foi afirmado diretamente.
    Reasserted,
    /// A afirmação direta do item foi revogada (ele pode continuar suportado).
    Unasserted,
}

/// Registro de uma alteração, consumido pela camada web (SSE).
#[derive(Clone, Debug, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub item: ItemId,
    /// Forma textual do item no momento da alteração.
    pub text: String,
}

/// Base de conhecimento in-memory com encadeamento para frente e
/// manutenção de verdade.
#[derive(Default)]
pub struct KnowledgeBase {
    facts: HashMap<FactId, Fact>,
    rules: HashMap<RuleId, Rule>,
    fact_order: Vec<FactId>,
    rule_order: Vec<RuleId>,
    fact_index: HashMap<Statement, FactId>,
    rule_index: HashMap<RuleShape, RuleId>,
    /// Pares (fato, regra) ainda não tentados pelo motor de inferência.
    agenda: VecDeque<(FactId, RuleId)>,
    /// Diário de alterações desde o último `drain_changes()`.
    changes: Vec<Change>,
}

impl KnowledgeBase {
    /// Cria uma KnowledgeBase vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove todos os fatos e regras.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.rules.clear();
        self.fact_order.clear();
        self.rule_order.clear();
        self.fact_index.clear();
        self.rule_index.clear();
        self.agenda.clear();
        self.changes.clear();
    }

    // ─── Entrada ─────────────────────────────────────────────────────

    /// Afirma um fato ou regra e deriva tudo o que for possível.
    ///
    /// Só retorna depois que a agenda de inferência esvaziou: nenhum
    /// chamador observa a KB "no meio" do encadeamento.
    ///
    /// Retorna o id do item armazenado (o já existente, se era duplicado).
    ///
    /// Cada alteração entra no diário; quem não usa o diário deve
    /// chamar [`drain_changes()`](KnowledgeBase::drain_changes) de tempos
    /// em tempos, ou ele cresce sem limite.
    pub fn assert(&mut self, item: Item) -> ItemId {
        tracing::info!(item = %item, "KB: assert");
        let id = self.add(item);
        self.run_agenda();
        debug_assert!(self.support_graph_consistent());
        id
    }

    /// Integra um item sem esvaziar a agenda.
    ///
    /// É o caminho usado pelo [`InferenceEngine`] para submeter itens
    /// derivados: o disparo dos pares resultantes fica a cargo do laço
    /// em [`assert()`](KnowledgeBase::assert).
    pub(crate) fn add(&mut self, item: Item) -> ItemId {
        match item {
            Item::Fact(fact) => ItemId::Fact(self.add_fact(fact)),
            Item::Rule(rule) => ItemId::Rule(self.add_rule(rule)),
        }
    }

    fn add_fact(&mut self, mut fact: Fact) -> FactId {
        self.retain_live(&mut fact.supported_by);
        if let Some(&existing) = self.fact_index.get(&fact.statement) {
            if fact.supported_by.is_empty() {
                // Reafirmação externa de algo já conhecido
                if let Some(stored) = self.facts.get_mut(&existing) {
                    if !stored.asserted {
                        stored.asserted = true;
                        self.record(ChangeKind::Reasserted, ItemId::Fact(existing));
                    }
                }
            } else {
                // Rederivação: acumula as justificativas no fato existente
                for support in fact.supported_by {
                    self.attach_support(ItemId::Fact(existing), support);
                }
            }
            tracing::debug!(fact = %fact.statement, "KB: fato já existente, mesclado");
            return existing;
        }

        if fact.supported_by.is_empty() {
            fact.asserted = true;
        }
        fact.supports_facts.clear();
        fact.supports_rules.clear();
        let id = fact.id;
        let supports = fact.supported_by.clone();
        tracing::debug!(id = %id, fact = %fact.statement, asserted = fact.asserted, "KB: fato armazenado");
        self.fact_index.insert(fact.statement.clone(), id);
        self.fact_order.push(id);
        self.facts.insert(id, fact);
        for support in supports {
            self.link_back(ItemId::Fact(id), support);
        }
        self.record(ChangeKind::Added, ItemId::Fact(id));

        // Fato novo: cada regra existente ganha a chance de disparar
        for &rule_id in &self.rule_order {
            self.agenda.push_back((id, rule_id));
        }
        id
    }

    fn add_rule(&mut self, mut rule: Rule) -> RuleId {
        self.retain_live(&mut rule.supported_by);
        let shape = rule.shape();
        if let Some(&existing) = self.rule_index.get(&shape) {
            if rule.supported_by.is_empty() {
                if let Some(stored) = self.rules.get_mut(&existing) {
                    if !stored.asserted {
                        stored.asserted = true;
                        self.record(ChangeKind::Reasserted, ItemId::Rule(existing));
                    }
                }
            } else {
                for support in rule.supported_by {
                    self.attach_support(ItemId::Rule(existing), support);
                }
            }
            tracing::debug!(id = %existing, "KB: regra já existente, mesclada");
            return existing;
        }

        if rule.supported_by.is_empty() {
            rule.asserted = true;
        }
        rule.supports_facts.clear();
        rule.supports_rules.clear();
        let id = rule.id;
        let supports = rule.supported_by.clone();
        tracing::debug!(id = %id, antecedents = rule.lhs.len(), asserted = rule.asserted, "KB: regra armazenada");
        self.rule_index.insert(shape, id);
        self.rule_order.push(id);
        self.rules.insert(id, rule);
        for support in supports {
            self.link_back(ItemId::Rule(id), support);
        }
        self.record(ChangeKind::Added, ItemId::Rule(id));

        // Regra nova: cada fato existente ganha a chance de dispará-la
        for &fact_id in &self.fact_order {
            self.agenda.push_back((fact_id, id));
        }
        id
    }

    /// Esvazia a agenda, disparando cada par pendente.
    fn run_agenda(&mut self) {
        let mut attempts = 0usize;
        while let Some((fact_id, rule_id)) = self.agenda.pop_front() {
            InferenceEngine::fire(fact_id, rule_id, self);
            attempts += 1;
        }
        tracing::debug!(
            attempts,
            facts = self.fact_count(),
            rules = self.rule_count(),
            "KB: agenda esvaziada"
        );
    }

    // ─── Consulta ────────────────────────────────────────────────────

    /// Consulta a KB com um fato (possivelmente com variáveis).
    ///
    /// Unifica o statement da consulta contra o de cada fato, em ordem de
    /// inserção. Uma consulta com forma de regra é reportada como
    /// [`Answer::Invalid`]; não é erro, o processamento continua.
    pub fn ask(&self, query: &Item) -> Answer {
        let Item::Fact(query) = query else {
            tracing::warn!(query = %query, "KB: ask inválido, consulta não é um fato");
            return Answer::Invalid;
        };
        tracing::info!(query = %query.statement, "KB: ask");
        let mut results = ListOfBindings::new();
        for fact in self.facts() {
            if let Some(bindings) = match_statements(&query.statement, &fact.statement) {
                results.add_bindings(bindings, fact.id);
            }
        }
        tracing::debug!(matches = results.len(), "KB: ask concluído");
        Answer::Bindings(results)
    }

    // ─── Retração ────────────────────────────────────────────────────

    /// Revoga a afirmação direta de um item e, se nada mais o justifica,
    /// remove-o em cascata.
    ///
    /// - Item ausente → nada acontece
    /// - Item ainda suportado por alguma derivação → só perde `asserted`
    /// - Item sem suporte → removido, junto com tudo que dependia só dele
    ///
    /// Fatos e regras seguem o mesmo caminho: limpa `asserted`, depois
    /// verifica o suporte. As remoções entram no diário, como em `assert`.
    pub fn retract(&mut self, item: &Item) {
        tracing::info!(item = %item, "KB: retract");
        let target = match item {
            Item::Fact(fact) => self.fact_index.get(&fact.statement).map(|&id| ItemId::Fact(id)),
            Item::Rule(rule) => self.rule_index.get(&rule.shape()).map(|&id| ItemId::Rule(id)),
        };
        let Some(target) = target else {
            tracing::debug!(item = %item, "KB: retract de item ausente ignorado");
            return;
        };

        let still_supported = match target {
            ItemId::Fact(id) => match self.facts.get_mut(&id) {
                Some(fact) => {
                    let was_asserted = std::mem::replace(&mut fact.asserted, false);
                    let supported = !fact.supported_by.is_empty();
                    if was_asserted {
                        self.record(ChangeKind::Unasserted, target);
                    }
                    supported
                }
                None => return,
            },
            ItemId::Rule(id) => match self.rules.get_mut(&id) {
                Some(rule) => {
                    let was_asserted = std::mem::replace(&mut rule.asserted, false);
                    let supported = !rule.supported_by.is_empty();
                    if was_asserted {
                        self.record(ChangeKind::Unasserted, target);
                    }
                    supported
                }
                None => return,
            },
        };

        if still_supported {
            tracing::debug!(item = %item, "KB: item mantido, ainda suportado");
        } else {
            self.cascade(target);
        }
        debug_assert!(self.support_graph_consistent());
    }

    /// Remove `root` e propaga a remoção para os dependentes que ficarem
    /// sem justificativa.
    ///
    /// Iterativo (pilha explícita). O item sai do arena **antes** de seus
    /// dependentes serem visitados, então ciclos de suporte terminam.
    fn cascade(&mut self, root: ItemId) {
        let mut doomed = vec![root];
        let mut removed = 0usize;
        while let Some(target) = doomed.pop() {
            let Some((dependent_facts, dependent_rules)) = self.detach(target) else {
                continue;
            };
            removed += 1;
            let dependents = dependent_facts
                .into_iter()
                .map(ItemId::Fact)
                .chain(dependent_rules.into_iter().map(ItemId::Rule));
            for dependent in dependents {
                if self.strip_support(dependent, target) {
                    doomed.push(dependent);
                }
            }
        }
        tracing::debug!(root = %root, removed, "KB: cascata concluída");
    }

    /// Tira o item das coleções e índices. Retorna suas back-references.
    fn detach(&mut self, target: ItemId) -> Option<(Vec<FactId>, Vec<RuleId>)> {
        let (supported_by, supports) = match target {
            ItemId::Fact(id) => {
                let fact = self.facts.remove(&id)?;
                self.fact_index.remove(&fact.statement);
                self.fact_order.retain(|f| *f != id);
                tracing::debug!(fact = %fact.statement, "KB: fato removido");
                self.changes.push(Change {
                    kind: ChangeKind::Removed,
                    item: target,
                    text: format!("fact: {}", fact.statement),
                });
                (fact.supported_by, (fact.supports_facts, fact.supports_rules))
            }
            ItemId::Rule(id) => {
                let rule = self.rules.remove(&id)?;
                self.rule_index.remove(&rule.shape());
                self.rule_order.retain(|r| *r != id);
                let text = rule.text();
                tracing::debug!(rule = %text, "KB: regra removida");
                self.changes.push(Change {
                    kind: ChangeKind::Removed,
                    item: target,
                    text,
                });
                (rule.supported_by, (rule.supports_facts, rule.supports_rules))
            }
        };
        // Normalmente vazio: só itens sem suporte chegam aqui
        for support in supported_by {
            self.unlink_back(ItemId::Fact(support.fact), target);
            self.unlink_back(ItemId::Rule(support.rule), target);
        }
        Some(supports)
    }

    /// Remove de `dependent` todo par de suporte que cita `dead`.
    ///
    /// A back-reference do outro membro do par também é desfeita, a menos
    /// que `dependent` ainda tenha outro par com ele. Retorna `true` se o
    /// dependente ficou sem justificativa nenhuma (nem `asserted`).
    fn strip_support(&mut self, dependent: ItemId, dead: ItemId) -> bool {
        let cites_dead = |s: &Support| match dead {
            ItemId::Fact(id) => s.fact == id,
            ItemId::Rule(id) => s.rule == id,
        };
        let Some(list) = self.support_list_mut(dependent) else {
            return false;
        };
        let (stripped, kept): (Vec<Support>, Vec<Support>) = list.drain(..).partition(cites_dead);
        list.extend(kept.iter().copied());
        if stripped.is_empty() {
            return false;
        }

        for support in &stripped {
            let partner = match dead {
                ItemId::Fact(_) => ItemId::Rule(support.rule),
                ItemId::Rule(_) => ItemId::Fact(support.fact),
            };
            let partner_still_cited = kept.iter().any(|k| match partner {
                ItemId::Fact(id) => k.fact == id,
                ItemId::Rule(id) => k.rule == id,
            });
            if !partner_still_cited {
                self.unlink_back(partner, dependent);
            }
        }
        self.record(ChangeKind::SupportRemoved, dependent);
        tracing::debug!(dependent = %dependent, stripped = stripped.len(), remaining = kept.len(), "KB: suporte removido");

        !self.is_justified(dependent)
    }

    // ─── Contabilidade de suporte ────────────────────────────────────

    /// Acrescenta um par de suporte a um item existente (sem duplicar) e
    /// espelha a back-reference.
    fn attach_support(&mut self, target: ItemId, support: Support) {
        if !self.is_live(&support) {
            return;
        }
        let Some(list) = self.support_list_mut(target) else {
            return;
        };
        if list.contains(&support) {
            return;
        }
        list.push(support);
        self.link_back(target, support);
        self.record(ChangeKind::SupportMerged, target);
    }

    /// Descarta pares que citam um fato ou uma regra fora da KB.
    ///
    /// Sem pares restantes, o item entra como afirmado.
    fn retain_live(&self, supports: &mut Vec<Support>) {
        let before = supports.len();
        supports.retain(|s| self.is_live(s));
        if supports.len() < before {
            tracing::warn!(
                dropped = before - supports.len(),
                "KB: suportes citando itens ausentes descartados"
            );
        }
    }

    fn is_live(&self, support: &Support) -> bool {
        self.facts.contains_key(&support.fact) && self.rules.contains_key(&support.rule)
    }

    /// Registra `dependent` nas back-references do fato e da regra do par.
    fn link_back(&mut self, dependent: ItemId, support: Support) {
        if let Some(fact) = self.facts.get_mut(&support.fact) {
            push_dependent(&mut fact.supports_facts, &mut fact.supports_rules, dependent);
        }
        if let Some(rule) = self.rules.get_mut(&support.rule) {
            push_dependent(&mut rule.supports_facts, &mut rule.supports_rules, dependent);
        }
    }

    /// Desfaz a back-reference `owner → dependent`.
    fn unlink_back(&mut self, owner: ItemId, dependent: ItemId) {
        let lists = match owner {
            ItemId::Fact(id) => self
                .facts
                .get_mut(&id)
                .map(|f| (&mut f.supports_facts, &mut f.supports_rules)),
            ItemId::Rule(id) => self
                .rules
                .get_mut(&id)
                .map(|r| (&mut r.supports_facts, &mut r.supports_rules)),
        };
        if let Some((facts, rules)) = lists {
            match dependent {
                ItemId::Fact(id) => facts.retain(|f| *f != id),
                ItemId::Rule(id) => rules.retain(|r| *r != id),
            }
        }
    }

    fn support_list_mut(&mut self, id: ItemId) -> Option<&mut Vec<Support>> {
        match id {
            ItemId::Fact(id) => self.facts.get_mut(&id).map(|f| &mut f.supported_by),
            ItemId::Rule(id) => self.rules.get_mut(&id).map(|r| &mut r.supported_by),
        }
    }

    fn is_justified(&self, id: ItemId) -> bool {
        match id {
            ItemId::Fact(id) => self.facts.get(&id).is_some_and(Fact::is_justified),
            ItemId::Rule(id) => self.rules.get(&id).is_some_and(Rule::is_justified),
        }
    }

    /// Verifica as invariantes do grafo de suporte:
    ///
    /// - todo item presente está justificado
    /// - todo par `(f, r)` em `supported_by` cita itens vivos
    /// - o item aparece nas back-references de `f` e de `r`
    ///
    /// Usado em `debug_assert!` e nos testes.
    pub fn support_graph_consistent(&self) -> bool {
        let mirrored = |support: &Support, dependent: ItemId| {
            let (Some(fact), Some(rule)) = (self.facts.get(&support.fact), self.rules.get(&support.rule)) else {
                return false;
            };
            match dependent {
                ItemId::Fact(id) => fact.supports_facts.contains(&id) && rule.supports_facts.contains(&id),
                ItemId::Rule(id) => fact.supports_rules.contains(&id) && rule.supports_rules.contains(&id),
            }
        };
        self.facts.values().all(|f| {
            f.is_justified() && f.supported_by.iter().all(|s| mirrored(s, ItemId::Fact(f.id)))
        }) && self.rules.values().all(|r| {
            r.is_justified() && r.supported_by.iter().all(|s| mirrored(s, ItemId::Rule(r.id)))
        })
    }

    // ─── Leitura ─────────────────────────────────────────────────────

    /// Fatos em ordem de inserção.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.fact_order.iter().filter_map(|id| self.facts.get(id))
    }

    /// Regras em ordem de inserção.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rule_order.iter().filter_map(|id| self.rules.get(id))
    }

    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(&id)
    }

    /// Busca o fato armazenado com este statement (igualdade estrutural).
    pub fn find_fact(&self, statement: &Statement) -> Option<&Fact> {
        self.fact_index
            .get(statement)
            .and_then(|id| self.facts.get(id))
    }

    /// Busca a regra armazenada com estes antecedentes e consequente.
    pub fn find_rule(&self, lhs: &[Statement], rhs: &Statement) -> Option<&Rule> {
        self.rule_index
            .get(&(lhs.to_vec(), rhs.clone()))
            .and_then(|id| self.rules.get(id))
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Descreve as justificativas de um item, uma por linha.
    ///
    /// # Exemplo de Saída
    ///
    /// ```text
    /// (motherof ada bing) + rule: ((motherof ?x ?y)) -> (parentof ?x ?y)
    /// ```
    pub fn describe_support(&self, id: ItemId) -> Vec<String> {
        let supports = match id {
            ItemId::Fact(id) => self.facts.get(&id).map(|f| f.supported_by.as_slice()),
            ItemId::Rule(id) => self.rules.get(&id).map(|r| r.supported_by.as_slice()),
        };
        supports
            .unwrap_or_default()
            .iter()
            .map(|s| {
                let fact = self
                    .facts
                    .get(&s.fact)
                    .map(|f| f.statement.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let rule = self
                    .rules
                    .get(&s.rule)
                    .map(Rule::text)
                    .unwrap_or_else(|| "?".to_string());
                format!("{} + {}", fact, rule)
            })
            .collect()
    }

    /// Entrega (e esvazia) o diário de alterações.
    ///
    /// O diário só é esvaziado aqui e em [`clear()`](KnowledgeBase::clear).
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, kind: ChangeKind, item: ItemId) {
        if let Some(text) = self.label(item) {
            self.changes.push(Change { kind, item, text });
        }
    }

    /// Forma textual curta de um item vivo (`fact: ...` / `rule: ...`).
    fn label(&self, id: ItemId) -> Option<String> {
        match id {
            ItemId::Fact(id) => self.facts.get(&id).map(|f| format!("fact: {}", f.statement)),
            ItemId::Rule(id) => self.rules.get(&id).map(Rule::text),
        }
    }
}

/// Acrescenta `dependent` à lista de back-references adequada, sem duplicar.
fn push_dependent(facts: &mut Vec<FactId>, rules: &mut Vec<RuleId>, dependent: ItemId) {
    match dependent {
        ItemId::Fact(id) if !facts.contains(&id) => facts.push(id),
        ItemId::Rule(id) if !rules.contains(&id) => rules.push(id),
        _ => {}
    }
}

/// Lista fatos e depois regras, um por linha.
impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Knowledge Base:")?;
        for fact in self.facts() {
            writeln!(f, "{}", fact)?;
        }
        for rule in self.rules() {
            writeln!(f, "{}", rule)?;
        }
        Ok(())
    }
}
