//! Tipos do protocolo JSON-RPC falado pelo Tabula.
//!
//! Uma request por linha na entrada, uma response por linha na saída.
//! Os códigos de erro são strings (`method_not_found`, `invalid_params`,
//! `internal_error`), não os inteiros do JSON-RPC clássico.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TabulaError;

// ═══════════════════════════════════════════════════════════════════════════
// Métodos e códigos de erro
// ═══════════════════════════════════════════════════════════════════════════

/// Método que lista as ferramentas.
pub const LIST_TOOLS: &str = "list_tools";

/// Método que executa uma ferramenta.
pub const CALL_TOOL: &str = "call_tool";

/// Código de erro de uma response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Método ou ferramenta desconhecida.
    MethodNotFound,
    /// Parâmetros ausentes ou inválidos.
    InvalidParams,
    /// Falha de arquivo, JSON ou comunicação com o backend.
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MethodNotFound => write!(f, "method_not_found"),
            ErrorCode::InvalidParams => write!(f, "invalid_params"),
            ErrorCode::InternalError => write!(f, "internal_error"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tipos básicos JSON-RPC
// ═══════════════════════════════════════════════════════════════════════════

/// ID de uma request JSON-RPC (pode ser número ou string).
///
/// Qualquer outro valor (fração, objeto) fica em `Other` e é devolvido
/// como veio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
    Other(Value),
}

impl From<Value> for JsonRpcId {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => JsonRpcId::String(s),
            Value::Number(n) => match n.as_i64() {
                Some(n) => JsonRpcId::Number(n),
                None => JsonRpcId::Other(Value::Number(n)),
            },
            other => JsonRpcId::Other(other),
        }
    }
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

/// Request JSON-RPC 2.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Versão do protocolo (sempre "2.0").
    #[serde(default = "default_version")]
    pub jsonrpc: String,

    /// ID da request, devolvido sem alteração na response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Nome do método a ser chamado.
    #[serde(default)]
    pub method: String,

    /// Parâmetros do método (opcional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

fn default_version() -> String {
    "2.0".to_string()
}

impl JsonRpcRequest {
    /// Cria uma nova request.
    pub fn new(method: impl Into<String>, id: Option<JsonRpcId>) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            method: method.into(),
            params: None,
        }
    }

    /// Adiciona parâmetros à request.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Monta a request a partir de qualquer JSON válido, sem rejeitar tipos.
    ///
    /// Um `method` que não é string vira o seu texto JSON (e portanto um
    /// método desconhecido); se a linha não for um objeto, o método fica vazio.
    pub fn from_value(value: Value) -> Self {
        let mut object = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let jsonrpc = match object.remove("jsonrpc") {
            Some(Value::String(version)) => version,
            _ => default_version(),
        };
        let id = object
            .remove("id")
            .filter(|v| !v.is_null())
            .map(JsonRpcId::from);
        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let params = object.remove("params").filter(|v| !v.is_null());

        Self {
            jsonrpc,
            id,
            method,
            params,
        }
    }
}

/// Response JSON-RPC 2.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Versão do protocolo (sempre "2.0").
    pub jsonrpc: String,

    /// ID da request original.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,

    /// Resultado em caso de sucesso.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Erro em caso de falha.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Cria uma response de sucesso.
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Cria uma response de erro.
    pub fn error(id: Option<JsonRpcId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Verifica se a response é um erro.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Erro JSON-RPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    /// Código do erro.
    pub code: ErrorCode,

    /// Mensagem de erro.
    pub message: String,
}

impl JsonRpcError {
    /// Cria um novo erro.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Método não encontrado.
    pub fn method_not_found(method: &str) -> Self {
        Self::new(ErrorCode::MethodNotFound, format!("Unknown method: {}", method))
    }

    /// Parâmetros inválidos.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    /// Erro interno.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<&TabulaError> for JsonRpcError {
    fn from(err: &TabulaError) -> Self {
        Self::new(err.code(), err.client_message())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tipos de ferramentas
// ═══════════════════════════════════════════════════════════════════════════

/// Descrição de uma ferramenta.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescription {
    /// Nome da ferramenta.
    pub name: String,

    /// Descrição da ferramenta.
    pub description: String,

    /// Schema de entrada (JSON Schema).
    pub input_schema: Value,
}

impl ToolDescription {
    /// Cria uma nova descrição de ferramenta.
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Resultado da listagem de ferramentas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Lista de ferramentas disponíveis.
    pub tools: Vec<ToolDescription>,
}

/// Parâmetros para chamada de ferramenta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Nome da ferramenta.
    #[serde(default)]
    pub name: String,

    /// Argumentos da ferramenta.
    #[serde(default)]
    pub arguments: Value,
}

/// Conteúdo retornado por uma ferramenta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Conteúdo de texto.
    Text { text: String },
}

impl ToolContent {
    /// Cria conteúdo de texto.
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }
}

/// Resultado de chamada de ferramenta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Conteúdo retornado.
    pub content: Vec<ToolContent>,
}

impl ToolResult {
    /// Cria um resultado com texto.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
        }
    }

    /// Cria um resultado com o JSON formatado (pretty-printed).
    pub fn json(value: &Value) -> crate::TabulaResult<Self> {
        Ok(Self::text(serde_json::to_string_pretty(value)?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Testes
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_rpc_id_string() {
        let id: JsonRpcId = "test-id".into();
        assert_eq!(id, JsonRpcId::String("test-id".to_string()));
    }

    #[test]
    fn test_request_deserialize() {
        let json = r#"{"jsonrpc":"2.0","id":"1","method":"list_tools","params":{}}"#;
        let request: JsonRpcRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.jsonrpc, "2.0");
        assert_eq!(request.method, LIST_TOOLS);
        assert_eq!(request.id, Some(JsonRpcId::String("1".to_string())));
    }

    #[test]
    fn test_from_value_keeps_odd_id_and_method() {
        let request = JsonRpcRequest::from_value(json!({"jsonrpc": "2.0", "id": "7", "method": 42}));
        assert_eq!(request.id, Some(JsonRpcId::String("7".into())));
        assert_eq!(request.method, "42");

        let request = JsonRpcRequest::from_value(json!({"id": 1.5, "method": "list_tools"}));
        assert_eq!(request.id, Some(JsonRpcId::Other(json!(1.5))));
        assert_eq!(request.method, LIST_TOOLS);

        let response = JsonRpcResponse::success(request.id, json!({}));
        assert_eq!(serde_json::to_value(&response).unwrap()["id"], json!(1.5));
    }

    #[test]
    fn test_from_value_non_object() {
        let request = JsonRpcRequest::from_value(json!([1, 2, 3]));
        assert!(request.id.is_none());
        assert_eq!(request.method, "");
        assert!(request.params.is_none());
    }

    #[test]
    fn test_request_without_method() {
        let request: JsonRpcRequest = serde_json::from_str(r#"{"id":"9"}"#).unwrap();
        assert_eq!(request.method, "");
        assert_eq!(request.jsonrpc, "2.0");
    }

    #[test]
    fn test_error_response_wire_format() {
        let response = JsonRpcResponse::error(
            Some("2".into()),
            JsonRpcError::from(&TabulaError::MethodNotFound("Unknown tool: x".into())),
        );

        let line = serde_json::to_string(&response).unwrap();
        assert_eq!(
            line,
            r#"{"jsonrpc":"2.0","id":"2","error":{"code":"method_not_found","message":"Unknown tool: x"}}"#
        );
    }

    #[test]
    fn test_success_response_has_no_error() {
        let response = JsonRpcResponse::success(Some(7.into()), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], 7);
        assert!(value.get("error").is_none());
        assert!(!response.is_error());
    }

    #[test]
    fn test_error_code_strings() {
        assert_eq!(
            serde_json::to_value(ErrorCode::InvalidParams).unwrap(),
            json!("invalid_params")
        );
        assert_eq!(ErrorCode::InternalError.to_string(), "internal_error");
    }

    #[test]
    fn test_error_from_tabula_error() {
        let err = TabulaError::invalid_params("bad");
        let rpc = JsonRpcError::from(&err);
        assert_eq!(rpc, JsonRpcError::invalid_params("bad"));
    }

    #[test]
    fn test_tool_result_json_is_pretty() {
        let result = ToolResult::json(&json!({"a": 1})).unwrap();
        let ToolContent::Text { text } = &result.content[0];
        assert_eq!(text, "{\n  \"a\": 1\n}");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
    }
}
