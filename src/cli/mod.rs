//! Interface de linha de comando do Tabula.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tabula - adaptador MCP para análise de dados em CSV.
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração (padrão: tabula.toml, se existir).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar (padrão: serve).
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicia o servidor JSON-RPC via stdio.
    Serve,

    /// Mostra a configuração efetiva (arquivo + ambiente).
    Config,

    /// Mostra versão.
    Version,
}
