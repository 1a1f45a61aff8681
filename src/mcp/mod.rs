//! Adaptador de protocolo do Tabula.
//!
//! Recebe requests JSON-RPC por stdin, uma por linha, e responde por stdout.
//! A única ferramenta exposta é `analyze_data`, que envia um CSV local ao
//! serviço de análise e devolve o resultado como texto.
//!
//! ## Métodos
//!
//! - `list_tools` - Descreve a ferramenta `analyze_data`
//! - `call_tool` - Executa `analyze_data` (`describe`, `plot` ou `analyze`)
//!
//! ## Exemplo de Uso
//!
//! ```ignore
//! use tabula::mcp::McpServer;
//! use tabula::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::resolve(None).unwrap();
//!     let server = McpServer::new(&config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

mod framing;
mod protocol;
mod server;
mod tools;
mod transport;

pub use framing::LineBuffer;
pub use protocol::{
    CallToolParams, ErrorCode, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ToolContent, ToolDescription, ToolResult, CALL_TOOL, LIST_TOOLS,
};
pub use server::McpServer;
pub use tools::{ToolHandler, ANALYZE_DATA, PLOT_PREFIX};
pub use transport::{stdio, LineReader, LineWriter};
