//! # Configuração da Aplicação
//!
//! A configuração vem de três camadas, nesta ordem de precedência:
//!
//! 1. Variáveis de ambiente (`KB_BIND_ADDR`, `KB_SEED_FILE`, `KB_LOG`)
//! 2. Arquivo JSON (`data/config.json`, ou o caminho em `KB_CONFIG`)
//! 3. Valores padrão de [`AppConfig::default()`]
//!
//! O arquivo é opcional — se não existir, os padrões valem.
//!
//! ```json
//! {
//!   "bind_addr": "127.0.0.1:8080",
//!   "seed_file": "data/blocks.kb",
//!   "log_filter": "encadeamento=debug",
//!   "event_capacity": 512
//! }
//! ```
//!
//! `RUST_LOG`, se definida, continua tendo prioridade sobre `log_filter`
//! (ver `main.rs`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Caminho padrão do arquivo de configuração.
const CONFIG_PATH: &str = "data/config.json";

/// Configuração da aplicação.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endereço do servidor HTTP.
    pub bind_addr: String,
    /// Arquivo de fatos/regras afirmados na inicialização.
    /// Ignorado se não existir.
    pub seed_file: Option<PathBuf>,
    /// Filtro do `tracing_subscriber::EnvFilter` quando `RUST_LOG` não está definida.
    pub log_filter: String,
    /// Capacidade do canal broadcast de eventos SSE.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            seed_file: Some(PathBuf::from("data/kb.txt")),
            log_filter: "info".to_string(),
            event_capacity: 256,
        }
    }
}

impl AppConfig {
    /// Carrega arquivo + variáveis de ambiente.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("KB_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::from_file(Path::new(&path))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Lê o JSON em `path`; arquivo ausente resulta nos padrões.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Aplica sobrescritas vindas de `lookup` (normalmente `std::env::var`).
    ///
    /// `KB_SEED_FILE` vazio desliga a carga inicial.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("KB_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(seed) = lookup("KB_SEED_FILE") {
            self.seed_file = (!seed.is_empty()).then(|| PathBuf::from(seed));
        }
        if let Some(filter) = lookup("KB_LOG") {
            self.log_filter = filter;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::from_file(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{ "bind_addr": "127.0.0.1:9000" }"#).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            "KB_BIND_ADDR" => Some("127.0.0.1:1234".to_string()),
            "KB_SEED_FILE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.bind_addr, "127.0.0.1:1234");
        assert_eq!(config.seed_file, None);
        assert_eq!(config.log_filter, "info");
    }
}
