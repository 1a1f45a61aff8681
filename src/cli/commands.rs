//! Implementação dos comandos CLI do Tabula.

use crate::mcp::McpServer;
use crate::types::config::{Config, BACKEND_URL_ENV};
use crate::TabulaResult;

/// Inicia o servidor sobre stdin/stdout.
pub async fn serve(config: &Config) -> TabulaResult<()> {
    tracing::debug!(
        base_url = %config.backend.base_url,
        timeout_secs = ?config.backend.timeout_secs,
        "Configuration loaded"
    );

    let server = McpServer::new(config)?;
    server.run().await
}

/// Mostra a configuração efetiva.
pub fn config_cmd(config: &Config) -> TabulaResult<()> {
    println!("# Effective configuration ({} overrides backend.base_url)", BACKEND_URL_ENV);
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Mostra a versão.
pub fn version() {
    println!("tabula {}", env!("CARGO_PKG_VERSION"));
}
