//! # Encadeamento — Servidor
//!
//! **Ponto de entrada** do servidor da base de conhecimento.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Carrega configuração (data/config.json + ambiente)
//!   ├── Configura tracing/logging
//!   ├── Afirma o arquivo inicial de fatos/regras (ou começa vazia)
//!   ├── Monta AppState (KB + canal broadcast SSE) e Router
//!   └── Inicia servidor TCP
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Logs detalhados do motor de inferência
//! RUST_LOG=encadeamento=debug cargo run
//!
//! # Outro arquivo inicial, outra porta
//! KB_SEED_FILE=data/familia.txt KB_BIND_ADDR=127.0.0.1:8080 cargo run
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use encadeamento::config::AppConfig;
use encadeamento::core::KnowledgeBase;
use encadeamento::reader::Reader;
use encadeamento::web::{self, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("falha ao carregar configuração")?;

    // RUST_LOG tem prioridade sobre o filtro da configuração.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("⇒ Encadeamento — Starting...");

    let kb = load_seed(&config);
    let state = AppState::new(kb, config.event_capacity);
    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("falha ao escutar em {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "🚀 Server running");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Afirma o conteúdo do arquivo inicial em uma KB nova.
///
/// Se o arquivo não existir ou tiver erro de leitura, inicia com KB vazia.
fn load_seed(config: &AppConfig) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    let Some(path) = &config.seed_file else {
        return kb;
    };
    if !path.exists() {
        tracing::info!(path = %path.display(), "Arquivo inicial ausente, iniciando vazia");
        return kb;
    }

    match Reader::new().read_file(path) {
        Ok(items) => {
            for item in items {
                kb.assert(item);
            }
            kb.drain_changes();
            tracing::info!(
                facts = kb.fact_count(),
                rules = kb.rule_count(),
                "KB carregada do arquivo inicial"
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Falha ao ler arquivo inicial, iniciando vazia");
        }
    }
    kb
}
