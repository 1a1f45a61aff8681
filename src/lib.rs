//! # Tabula
//!
//! Adaptador MCP para análise de dados em CSV.
//!
//! O Tabula fala JSON-RPC por stdin/stdout e traduz a ferramenta
//! `analyze_data` em chamadas HTTP a um serviço de análise externo.
//!
//! ## Módulos
//!
//! - [`cli`] - Interface de linha de comando
//! - [`mcp`] - Transporte, protocolo e dispatch das requests
//! - [`backend`] - Cliente HTTP do serviço de análise
//! - [`types`] - Tipos compartilhados (argumentos, configuração, erros)

pub mod backend;
#[cfg(feature = "cli")]
pub mod cli;
pub mod mcp;
pub mod types;

pub use types::config::Config;
pub use types::errors::{TabulaError, TabulaResult};
