//! # Encadeamento Para Frente — Um Passo de Disparo
//!
//! O [`InferenceEngine`] executa **um único passo** de inferência para um
//! par `(fato, regra)`:
//!
//! ### Especialização parcial: regra com 2+ antecedentes
//!
//! ```text
//! Fato:   (motherof ada bing)
//! Regra:  ((motherof ?x ?y) (motherof ?y ?z)) -> (grandmotherof ?x ?z)
//! ─────────────────────────────────────────────
//! Nova regra: ((motherof bing ?z)) -> (grandmotherof ada ?z)
//! ```
//!
//! ### Disparo completo: regra com 1 antecedente
//!
//! ```text
//! Fato:   (motherof bing chen)
//! Regra:  ((motherof bing ?z)) -> (grandmotherof ada ?z)
//! ─────────────────────────────────────────────
//! Novo fato: (grandmotherof ada chen)
//! ```
//!
//! Em ambos os casos o item derivado nasce com `asserted = false` e com o
//! par `(fato, regra)` como única justificativa, e é submetido à
//! [`KnowledgeBase`], que cuida das back-references e de enfileirar novos
//! disparos. O motor em si não recursa.

use crate::core::{
    instantiate, match_statements, Fact, FactId, Item, KnowledgeBase, Rule, RuleId, Support,
};

/// Motor de inferência, sem estado.
///
/// ## Uso
///
/// Chamado pela agenda da KB; não há motivo para chamá-lo diretamente
/// fora de testes:
///
/// ```rust,ignore
/// InferenceEngine::fire(fact_id, rule_id, &mut kb);
/// ```
pub struct InferenceEngine;

impl InferenceEngine {
    /// Tenta disparar `rule` com `fact`.
    ///
    /// Só o **primeiro** antecedente da regra é casado com o fato. Se a
    /// unificação falha, nada acontece. Ids que não estão mais na KB
    /// também são ignorados.
    pub fn fire(fact_id: FactId, rule_id: RuleId, kb: &mut KnowledgeBase) {
        let (Some(fact), Some(rule)) = (kb.fact(fact_id), kb.rule(rule_id)) else {
            return;
        };
        let Some(derived) = Self::derive(fact, rule) else {
            return;
        };
        tracing::debug!(
            fact = %fact.statement,
            rule = %rule.rhs,
            derived = %derived,
            "Inferência: regra disparada"
        );
        kb.add(derived);
    }

    /// Calcula o item derivado de `(fact, rule)` sem tocar na KB.
    ///
    /// Uma regra sem antecedentes nunca dispara.
    fn derive(fact: &Fact, rule: &Rule) -> Option<Item> {
        let (first, rest) = rule.lhs.split_first()?;
        let bindings = match_statements(&fact.statement, first)?;
        let support = Support::new(fact.id, rule.id);
        let rhs = instantiate(&rule.rhs, &bindings);

        let item = if !rest.is_empty() {
            let lhs = rest
                .iter()
                .map(|antecedent| instantiate(antecedent, &bindings))
                .collect();
            Item::Rule(Rule::derived(lhs, rhs, support))
        } else {
            Item::Fact(Fact::derived(rhs, support))
        };
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ItemId, Statement};
    use crate::reader::Reader;

    fn stmt(text: &str) -> Statement {
        Reader::new().parse_statement(text).unwrap()
    }

    /// KB com uma regra e um fato, sem nenhum disparo ainda.
    fn pair(rule: &str, fact: &str) -> (KnowledgeBase, FactId, RuleId) {
        let reader = Reader::new();
        let mut kb = KnowledgeBase::new();
        let ItemId::Rule(rule_id) = kb.add(reader.parse_item(rule).unwrap()) else {
            unreachable!()
        };
        let ItemId::Fact(fact_id) = kb.add(reader.parse_item(fact).unwrap()) else {
            unreachable!()
        };
        (kb, fact_id, rule_id)
    }

    #[test]
    fn three_antecedent_rule_specializes_into_two_antecedent_rule() {
        let (mut kb, fact_id, rule_id) = pair(
            "rule: ((a ?x) (b ?x ?y) (c ?y)) -> (d ?x ?y)",
            "fact: (a k)",
        );
        InferenceEngine::fire(fact_id, rule_id, &mut kb);

        assert_eq!(kb.fact_count(), 1, "nenhum fato novo");
        let derived = kb
            .find_rule(&[stmt("(b k ?y)"), stmt("(c ?y)")], &stmt("(d k ?y)"))
            .expect("regra especializada");
        assert!(!derived.asserted);
        assert_eq!(derived.supported_by, vec![Support::new(fact_id, rule_id)]);

        // Back-references espelhadas no fato e na regra originais
        assert!(kb.fact(fact_id).unwrap().supports_rules.contains(&derived.id));
        assert!(kb.rule(rule_id).unwrap().supports_rules.contains(&derived.id));
    }

    #[test]
    fn single_antecedent_rule_produces_fact() {
        let (mut kb, fact_id, rule_id) = pair("rule: ((isa ?x block)) -> (heavy ?x)", "fact: (isa cube block)");
        InferenceEngine::fire(fact_id, rule_id, &mut kb);

        let heavy = kb.find_fact(&stmt("(heavy cube)")).expect("fato derivado");
        assert!(!heavy.asserted);
        assert_eq!(heavy.supported_by, vec![Support::new(fact_id, rule_id)]);
        assert!(kb.fact(fact_id).unwrap().supports_facts.contains(&heavy.id));
        assert!(kb.rule(rule_id).unwrap().supports_facts.contains(&heavy.id));
    }

    #[test]
    fn failed_match_has_no_side_effects() {
        let (mut kb, fact_id, rule_id) = pair("rule: ((isa ?x block)) -> (heavy ?x)", "fact: (color cube red)");
        InferenceEngine::fire(fact_id, rule_id, &mut kb);
        assert_eq!(kb.fact_count(), 1);
        assert_eq!(kb.rule_count(), 1);
        assert!(kb.fact(fact_id).unwrap().supports_facts.is_empty());
    }

    #[test]
    fn only_first_antecedent_is_matched() {
        let (mut kb, fact_id, rule_id) = pair("rule: ((a ?x) (b ?x)) -> (c ?x)", "fact: (b k)");
        InferenceEngine::fire(fact_id, rule_id, &mut kb);
        assert_eq!(kb.rule_count(), 1);
    }

    #[test]
    fn rule_without_antecedents_never_fires() {
        let (mut kb, fact_id, _) = pair("rule: ((b ?x)) -> (d ?x)", "fact: (a k)");
        let mut empty = Rule::new(vec![stmt("(a ?x)")], stmt("(c k)")).unwrap();
        empty.lhs.clear();
        let empty_id = empty.id;

        // O assert já tenta o par (a k) × regra vazia pela agenda
        kb.assert(Item::Rule(empty));
        InferenceEngine::fire(fact_id, empty_id, &mut kb);

        assert_eq!(kb.fact_count(), 1);
        assert!(kb.find_fact(&stmt("(c k)")).is_none());
        assert!(kb.rule(empty_id).is_some());
        assert!(kb.support_graph_consistent());
    }

    #[test]
    fn stale_ids_are_ignored() {
        let (mut kb, _, rule_id) = pair("rule: ((a ?x)) -> (c ?x)", "fact: (a k)");
        InferenceEngine::fire(uuid::Uuid::new_v4(), rule_id, &mut kb);
        assert_eq!(kb.fact_count(), 1);
    }
}
