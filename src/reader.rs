//! # Reader — Fatos e Regras em Forma Textual
//!
//! Converte texto em [`Statement`]s, [`Fact`]s e [`Rule`]s. O formato é
//! orientado a linhas:
//!
//! ```text
//! # comentário
//! fact: (isa cube block)
//! rule: ((isa ?x block) (size ?x small)) -> (pickable ?x)
//! ```
//!
//! | Elemento | Forma |
//! |----------|-------|
//! | Statement | `(predicado termo1 termo2 ...)` |
//! | Variável | termo iniciado por `?` (ex: `?x`) |
//! | Constante | qualquer outro termo |
//! | Comentário | linha iniciada por `#` ou `;` |
//!
//! O [`Reader`] compila suas expressões regulares uma vez, em
//! [`Reader::new()`], e pode ser reutilizado.

use std::path::Path;

use regex::Regex;

use crate::core::{Fact, Item, Rule, Statement, Term};
use crate::error::ReadError;

/// Leitor de statements/fatos/regras.
pub struct Reader {
    /// `(predicado termos...)`: grupo 1: predicado, grupo 2: resto.
    statement_re: Regex,
    /// Qualquer parêntese simples (sem aninhamento) dentro do lhs de uma regra.
    antecedent_re: Regex,
    /// `fact:` / `rule:` no início da linha.
    prefix_re: Regex,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    pub fn new() -> Self {
        Self {
            statement_re: Regex::new(r"^\(\s*([^\s()?]+)((?:\s+[^\s()]+)*)\s*\)$").unwrap(),
            antecedent_re: Regex::new(r"\([^()]*\)").unwrap(),
            prefix_re: Regex::new(r"^(fact|rule)\s*:\s*(.*)$").unwrap(),
        }
    }

    /// Lê um statement: `(isa ?x block)`.
    pub fn parse_statement(&self, text: &str) -> Result<Statement, ReadError> {
        let text = text.trim();
        let caps = self
            .statement_re
            .captures(text)
            .ok_or_else(|| ReadError::MalformedStatement(text.to_string()))?;
        let predicate = caps[1].to_string();
        let mut terms = Vec::new();
        for token in caps[2].split_whitespace() {
            let term = match token.strip_prefix('?') {
                Some("") => return Err(ReadError::MalformedStatement(text.to_string())),
                Some(name) => Term::var(name),
                None => Term::constant(token),
            };
            terms.push(term);
        }
        Ok(Statement::new(predicate, terms))
    }

    /// Lê uma linha `fact: ...` ou `rule: ...`.
    pub fn parse_item(&self, text: &str) -> Result<Item, ReadError> {
        let text = text.trim();
        let caps = self
            .prefix_re
            .captures(text)
            .ok_or_else(|| ReadError::UnknownPrefix(text.to_string()))?;
        let body = caps[2].trim();
        match &caps[1] {
            "fact" => Ok(Item::Fact(Fact::new(self.parse_statement(body)?))),
            _ => self.parse_rule(body).map(Item::Rule),
        }
    }

    /// Lê uma consulta para `ask`.
    ///
    /// Aceita tanto `fact: (p ?x)` quanto só `(p ?x)`. Uma consulta na forma
    /// `rule: ...` é lida normalmente; cabe à KB reportá-la como inválida.
    pub fn parse_query(&self, text: &str) -> Result<Item, ReadError> {
        let text = text.trim();
        if self.prefix_re.is_match(text) {
            self.parse_item(text)
        } else {
            Ok(Item::Fact(Fact::new(self.parse_statement(text)?)))
        }
    }

    /// `((a ?x) (b ?x)) -> (c ?x)`
    fn parse_rule(&self, body: &str) -> Result<Rule, ReadError> {
        let malformed = || ReadError::MalformedRule(body.to_string());
        let (lhs, rhs) = body.split_once("->").ok_or_else(malformed)?;
        let lhs = lhs.trim();
        let inner = lhs
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut antecedents = Vec::new();
        for m in self.antecedent_re.find_iter(inner) {
            antecedents.push(self.parse_statement(m.as_str())?);
        }
        // Nada além de statements e espaços entre os parênteses externos
        if !self.antecedent_re.replace_all(inner, "").trim().is_empty() {
            return Err(malformed());
        }

        let rhs = self.parse_statement(rhs)?;
        Rule::new(antecedents, rhs).ok_or_else(|| ReadError::EmptyAntecedents(body.to_string()))
    }

    /// Lê várias linhas, ignorando vazias e comentários.
    pub fn read_str(&self, text: &str) -> Result<Vec<Item>, ReadError> {
        let mut items = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let item = self.parse_item(line).map_err(|e| ReadError::Line {
                line: index + 1,
                source: Box::new(e),
            })?;
            items.push(item);
        }
        Ok(items)
    }

    /// Lê um arquivo inteiro com [`read_str()`](Reader::read_str).
    pub fn read_file(&self, path: &Path) -> Result<Vec<Item>, ReadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let items = self.read_str(&text)?;
        tracing::debug!(path = %path.display(), items = items.len(), "Reader: arquivo lido");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_with_variables_and_constants() {
        let s = Reader::new().parse_statement("(isa ?x block)").unwrap();
        assert_eq!(s.predicate, "isa");
        assert_eq!(s.terms, vec![Term::var("x"), Term::constant("block")]);
    }

    #[test]
    fn statement_tolerates_extra_whitespace() {
        let s = Reader::new().parse_statement("  ( on   a  b )  ").unwrap();
        assert_eq!(s.to_string(), "(on a b)");
    }

    #[test]
    fn malformed_statements_are_rejected() {
        let reader = Reader::new();
        for text in ["isa a b", "(isa a (b))", "()", "(?p a)", "(p ?)"] {
            assert!(
                matches!(reader.parse_statement(text), Err(ReadError::MalformedStatement(_))),
                "aceitou {:?}",
                text
            );
        }
    }

    #[test]
    fn rule_with_two_antecedents() {
        let item = Reader::new()
            .parse_item("rule: ((motherof ?x ?y) (motherof ?y ?z)) -> (grandmotherof ?x ?z)")
            .unwrap();
        let Item::Rule(rule) = item else { panic!("esperava regra") };
        assert_eq!(rule.lhs.len(), 2);
        assert_eq!(rule.rhs.to_string(), "(grandmotherof ?x ?z)");
        assert!(rule.asserted);
    }

    #[test]
    fn rule_without_antecedents_is_rejected() {
        let err = Reader::new().parse_item("rule: () -> (p a)").unwrap_err();
        assert!(matches!(err, ReadError::EmptyAntecedents(_)));
    }

    #[test]
    fn rule_with_garbage_between_antecedents_is_rejected() {
        let err = Reader::new().parse_item("rule: ((p ?x) junk) -> (q ?x)").unwrap_err();
        assert!(matches!(err, ReadError::MalformedRule(_)));
    }

    #[test]
    fn query_accepts_bare_statement() {
        let item = Reader::new().parse_query("(p ?x)").unwrap();
        assert!(matches!(item, Item::Fact(_)));
    }

    #[test]
    fn read_str_skips_comments_and_reports_line() {
        let text = "# blocos\nfact: (isa cube block)\n\n; regra\nrule: ((isa ?x block)) -> (heavy ?x)\nbogus\n";
        let err = Reader::new().read_str(text).unwrap_err();
        assert!(matches!(err, ReadError::Line { line: 6, .. }));

        let items = Reader::new().read_str(&text.replace("bogus\n", "")).unwrap();
        assert_eq!(items.len(), 2);
    }
}
