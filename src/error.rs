//! Tipos de erro da biblioteca.
//!
//! O núcleo (KB + motor) não falha: casamento sem sucesso, consulta
//! inválida e retração redundante são resultados normais. Os erros aqui
//! vêm das bordas — leitura de texto e configuração.

use std::path::PathBuf;

use thiserror::Error;

/// Falha ao ler statements, fatos ou regras em forma textual.
#[derive(Debug, Error)]
pub enum ReadError {
    /// O texto não tem a forma `(predicado termo ...)`.
    #[error("statement malformado: `{0}`")]
    MalformedStatement(String),

    /// O texto não tem a forma `((a ...) (b ...)) -> (c ...)`.
    #[error("regra malformada: `{0}`")]
    MalformedRule(String),

    /// Regra com lista de antecedentes vazia.
    #[error("regra sem antecedentes: `{0}`")]
    EmptyAntecedents(String),

    /// Linha sem `fact:` nem `rule:`.
    #[error("prefixo desconhecido (esperado `fact:` ou `rule:`): `{0}`")]
    UnknownPrefix(String),

    /// Erro em uma linha específica de um arquivo/texto com várias linhas.
    #[error("linha {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<ReadError>,
    },

    #[error("falha ao ler {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Falha ao carregar a configuração.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("falha ao ler {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuração inválida em {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
