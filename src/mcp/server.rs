//! Servidor JSON-RPC do Tabula.
//!
//! Lê requests linha a linha e despacha cada uma para o [`ToolHandler`].
//! No modo concorrente cada linha vira uma tarefa própria e as responses
//! saem na ordem em que terminam; a correlação é feita pelo `id`.

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinSet;

use crate::types::config::{Config, DispatchMode};
use crate::TabulaResult;

use super::protocol::{
    CallToolParams, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ListToolsResult,
    CALL_TOOL, LIST_TOOLS,
};
use super::tools::ToolHandler;
use super::transport::{self, LineReader, LineWriter};

/// Servidor do Tabula.
pub struct McpServer {
    tools: Arc<ToolHandler>,
    dispatch: DispatchMode,
}

impl McpServer {
    /// Cria o servidor com o backend HTTP da configuração.
    pub fn new(config: &Config) -> TabulaResult<Self> {
        let tools = ToolHandler::from_config(&config.backend)?;
        Ok(Self::with_handler(tools, config.server.dispatch))
    }

    /// Cria o servidor sobre um handler já montado.
    pub fn with_handler(tools: ToolHandler, dispatch: DispatchMode) -> Self {
        Self {
            tools: Arc::new(tools),
            dispatch,
        }
    }

    /// Inicia o servidor sobre stdin/stdout.
    ///
    /// Retorna quando stdin chega ao fim e todas as requests pendentes
    /// foram respondidas.
    pub async fn run(&self) -> TabulaResult<()> {
        tracing::info!(dispatch = ?self.dispatch, "Tabula server starting...");

        let (reader, writer) = transport::stdio();
        self.serve(reader, writer).await?;

        tracing::info!("Tabula server stopped");
        Ok(())
    }

    /// Loop principal sobre um par leitor/escritor qualquer.
    pub async fn serve<R, W>(&self, mut reader: LineReader<R>, writer: LineWriter<W>) -> TabulaResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut in_flight = JoinSet::new();

        while let Some(request) = reader.next_request().await? {
            match self.dispatch {
                DispatchMode::Concurrent => {
                    let tools = Arc::clone(&self.tools);
                    let writer = writer.clone();
                    in_flight.spawn(async move {
                        let response = dispatch_guarded(tools, request).await;
                        send(&writer, &response).await;
                    });

                    while let Some(joined) = in_flight.try_join_next() {
                        log_join(joined);
                    }
                }
                DispatchMode::Sequential => {
                    let response = dispatch_guarded(Arc::clone(&self.tools), request).await;
                    send(&writer, &response).await;
                }
            }
        }

        tracing::info!(pending = in_flight.len(), "Input closed");

        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }

        Ok(())
    }

    /// Processa uma requisição JSON-RPC.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        handle_request(&self.tools, request).await
    }
}

/// Executa o dispatch numa tarefa separada para que um panic vire
/// `internal_error` em vez de derrubar o servidor.
async fn dispatch_guarded(tools: Arc<ToolHandler>, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();

    match tokio::spawn(async move { handle_request(&tools, request).await }).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Request handler failed");
            JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string()))
        }
    }
}

async fn send<W: AsyncWrite + Unpin>(writer: &LineWriter<W>, response: &JsonRpcResponse) {
    if let Err(e) = writer.write_response(response).await {
        tracing::error!(error = %e, "Failed to write response");
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Dispatch task failed");
    }
}

async fn handle_request(tools: &ToolHandler, request: JsonRpcRequest) -> JsonRpcResponse {
    tracing::debug!(method = %request.method, "Handling request");

    match request.method.as_str() {
        LIST_TOOLS => handle_list_tools(request),
        CALL_TOOL => handle_call_tool(tools, request).await,
        _ => JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method)),
    }
}

fn handle_list_tools(request: JsonRpcRequest) -> JsonRpcResponse {
    let result = ListToolsResult {
        tools: ToolHandler::list_tools(),
    };

    result_response(request.id, &result)
}

async fn handle_call_tool(tools: &ToolHandler, request: JsonRpcRequest) -> JsonRpcResponse {
    let params: CallToolParams = match request.params {
        Some(p) => match serde_json::from_value(p) {
            Ok(params) => params,
            Err(e) => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
        },
        None => {
            return JsonRpcResponse::error(request.id, JsonRpcError::invalid_params("Missing params"));
        }
    };

    tracing::info!(tool = %params.name, "Calling tool");

    let result = match tools.handle_tool_call(&params.name, params.arguments).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(tool = %params.name, code = %e.code(), error = %e, "Tool call failed");
            return JsonRpcResponse::error(request.id, JsonRpcError::from(&e));
        }
    };

    result_response(request.id, &result)
}

/// Serializa o resultado; uma falha vira `internal_error`, nunca sucesso.
fn result_response<T: Serialize>(id: Option<JsonRpcId>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize result");
            JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::AnalyticsBackend;
    use crate::mcp::protocol::ErrorCode;
    use crate::types::args::PlotRequest;
    use crate::TabulaError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    /// Backend que falha em tudo; os testes daqui não chegam ao HTTP.
    struct OfflineBackend;

    #[async_trait]
    impl AnalyticsBackend for OfflineBackend {
        async fn read_csv(&self, _: &str, _: Vec<u8>) -> TabulaResult<Value> {
            Err(TabulaError::other("offline"))
        }
        async fn describe(&self, _: &Value) -> TabulaResult<Value> {
            Err(TabulaError::other("offline"))
        }
        async fn plot(&self, _: &Value, _: &PlotRequest) -> TabulaResult<Value> {
            Err(TabulaError::other("offline"))
        }
        async fn analyze(&self, _: &Value, _: Option<&[String]>) -> TabulaResult<Value> {
            Err(TabulaError::other("offline"))
        }
    }

    fn server() -> McpServer {
        McpServer::with_handler(
            ToolHandler::new(Arc::new(OfflineBackend)),
            DispatchMode::Concurrent,
        )
    }

    #[test]
    fn test_unserializable_result_is_internal_error() {
        // Chaves que não são string não viram objeto JSON
        let mut result = BTreeMap::new();
        result.insert(vec![1u8, 2], "x");

        let response = result_response(Some(JsonRpcId::String("9".into())), &result);
        assert!(response.result.is_none());
        assert_eq!(response.id, Some(JsonRpcId::String("9".into())));
        assert_eq!(response.error.unwrap().code, ErrorCode::InternalError);
    }

    #[test]
    fn test_result_response_success() {
        let response = result_response(None, &json!({"content": []}));
        assert!(!response.is_error());
        assert_eq!(response.result, Some(json!({"content": []})));
    }

    fn create_test_request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(JsonRpcId::String("1".to_string())),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_handle_list_tools() {
        let response = server()
            .handle_request(create_test_request("list_tools", Some(json!({}))))
            .await;

        assert!(!response.is_error());
        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "analyze_data");
        assert!(tools[0]["inputSchema"].is_object());
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let response = server()
            .handle_request(create_test_request("tools/list", None))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::MethodNotFound);
        assert_eq!(error.message, "Unknown method: tools/list");
    }

    #[tokio::test]
    async fn test_handle_unknown_tool() {
        let response = server()
            .handle_request(create_test_request(
                "call_tool",
                Some(json!({"name": "x", "arguments": {}})),
            ))
            .await;

        assert_eq!(response.id, Some(JsonRpcId::String("1".to_string())));
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::MethodNotFound);
        assert_eq!(error.message, "Unknown tool: x");
    }

    #[tokio::test]
    async fn test_handle_call_tool_missing_params() {
        let response = server()
            .handle_request(create_test_request("call_tool", None))
            .await;

        assert_eq!(response.error.unwrap().code, ErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let response = server()
            .handle_request(create_test_request(
                "call_tool",
                Some(json!({
                    "name": "analyze_data",
                    "arguments": {
                        "file_path": file.path().to_str().unwrap(),
                        "analysis_type": "describe"
                    }
                })),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert_eq!(error.message, "offline");
    }

    #[tokio::test]
    async fn test_serve_sequential_keeps_order() {
        let server = McpServer::with_handler(
            ToolHandler::new(Arc::new(OfflineBackend)),
            DispatchMode::Sequential,
        );

        let input: &[u8] = concat!(
            r#"{"jsonrpc":"2.0","id":"1","method":"list_tools","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"2","method":"nope"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"3","method":"list_tools"}"#,
            "\n"
        )
        .as_bytes();

        let writer = LineWriter::new(Vec::new());
        server
            .serve(LineReader::new(input), writer.clone())
            .await
            .unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let ids: Vec<String> = output
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
