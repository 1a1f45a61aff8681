//! Tipos de erro do Tabula.

use thiserror::Error;

use crate::mcp::ErrorCode;

/// Tipo de resultado padrão do Tabula.
pub type TabulaResult<T> = Result<T, TabulaError>;

/// Erros possíveis no Tabula.
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// Falha de transporte HTTP (conexão recusada, timeout, corpo ilegível).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// O backend respondeu com status de erro.
    #[error("{detail}")]
    Backend { status: u16, detail: String },

    #[error("{0}")]
    InvalidParams(String),

    #[error("{0}")]
    MethodNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl TabulaError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Cria um erro de parâmetros inválidos.
    pub fn invalid_params<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Código JSON-RPC correspondente a este erro.
    ///
    /// Apenas `InvalidParams` e `MethodNotFound` têm códigos próprios;
    /// qualquer outra falha vira `internal_error`.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidParams(_) => ErrorCode::InvalidParams,
            Self::MethodNotFound(_) => ErrorCode::MethodNotFound,
            _ => ErrorCode::InternalError,
        }
    }

    /// Mensagem a ser exposta ao cliente.
    pub fn client_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}
