//! Transporte newline-delimited JSON.
//!
//! A entrada é lida em chunks de bytes e remontada em linhas por um
//! [`LineBuffer`]; cada linha é uma request JSON-RPC. A saída recebe uma
//! response por linha.
//!
//! ## Formato de Mensagens
//!
//! ```text
//! {"jsonrpc":"2.0","id":"1","method":"list_tools","params":{}}\n
//! {"jsonrpc":"2.0","id":"1","result":{"tools":[...]}}\n
//! ```
//!
//! Linhas vazias são ignoradas. Linhas que não são JSON válido são
//! registradas no log (stderr) e descartadas, sem response. JSON válido
//! com campos de tipo inesperado ainda vira request e recebe response.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, Stdin, Stdout};
use tokio::sync::Mutex;

use crate::TabulaResult;

use super::framing::LineBuffer;
use super::protocol::{JsonRpcRequest, JsonRpcResponse};

const READ_CHUNK: usize = 8 * 1024;

/// Leitor de requests sobre um stream de bytes.
pub struct LineReader<R> {
    reader: R,
    buffer: LineBuffer,
    ready: VecDeque<Vec<u8>>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Cria um leitor sobre `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: LineBuffer::new(),
            ready: VecDeque::new(),
            eof: false,
        }
    }

    /// Lê a próxima request válida.
    ///
    /// Retorna `Ok(None)` no fim do stream. Linhas malformadas são
    /// descartadas e a leitura continua.
    pub async fn next_request(&mut self) -> TabulaResult<Option<JsonRpcRequest>> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                if let Some(request) = parse_line(&line) {
                    return Ok(Some(request));
                }
                continue;
            }

            if self.eof {
                return Ok(None);
            }

            self.fill().await?;
        }
    }

    async fn fill(&mut self) -> TabulaResult<()> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.reader.read(&mut chunk).await?;

        if n == 0 {
            self.eof = true;
            if let Some(rest) = self.buffer.finish() {
                self.ready.push_back(rest);
            }
            return Ok(());
        }

        self.ready.extend(self.buffer.push(&chunk[..n]));
        Ok(())
    }
}

/// Decodifica uma linha. `None` para linhas vazias ou malformadas.
fn parse_line(line: &[u8]) -> Option<JsonRpcRequest> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            tracing::error!(error = %e, "Dropping input line that is not valid UTF-8");
            return None;
        }
    };

    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            let request = JsonRpcRequest::from_value(value);
            tracing::debug!(method = %request.method, id = ?request.id, "Received request");
            Some(request)
        }
        Err(e) => {
            tracing::error!(error = %e, line = %text, "Failed to parse request");
            None
        }
    }
}

/// Escritor de responses, compartilhável entre tarefas.
///
/// Cada response é escrita e descarregada sob o mesmo lock, então linhas
/// de tarefas concorrentes nunca se intercalam.
pub struct LineWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for LineWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Cria um escritor sobre `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Escreve uma response como JSON compacto seguido de `\n`.
    pub async fn write_response(&self, response: &JsonRpcResponse) -> TabulaResult<()> {
        let mut line = serde_json::to_vec(response)?;
        line.push(b'\n');

        let mut writer = self.inner.lock().await;
        writer.write_all(&line).await?;
        // Flush é crítico para o cliente receber a response imediatamente
        writer.flush().await?;
        drop(writer);

        tracing::debug!(id = ?response.id, is_error = response.is_error(), "Sent response");
        Ok(())
    }

    /// Devolve o escritor interno se este for o último handle.
    pub fn into_inner(self) -> Option<W> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }
}

/// Leitor e escritor ligados a stdin/stdout.
pub fn stdio() -> (LineReader<Stdin>, LineWriter<Stdout>) {
    (
        LineReader::new(tokio::io::stdin()),
        LineWriter::new(tokio::io::stdout()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{JsonRpcError, JsonRpcId};
    use serde_json::json;

    #[tokio::test]
    async fn test_read_single_request() {
        let input: &[u8] = b"{\"jsonrpc\":\"2.0\",\"id\":\"1\",\"method\":\"list_tools\",\"params\":{}}\n";
        let mut reader = LineReader::new(input);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.method, "list_tools");
        assert_eq!(request.id, Some(JsonRpcId::String("1".into())));

        assert!(reader.next_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_request_split_across_chunks() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":\"a")
            .read(b"bc\",\"method\":\"list_")
            .read(b"tools\"}\n")
            .build();
        let mut reader = LineReader::new(mock);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.id, Some(JsonRpcId::String("abc".into())));
        assert_eq!(request.method, "list_tools");
        assert!(reader.next_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_and_blank_lines_are_skipped() {
        let input: &[u8] = b"not json\n\n   \n{\"id\":\"2\",\"method\":\"call_tool\"}\n";
        let mut reader = LineReader::new(input);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.method, "call_tool");
        assert!(reader.next_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrongly_typed_fields_still_yield_request() {
        let input: &[u8] = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":\"7\",\"method\":42}\n",
            "{\"id\":1.5,\"method\":\"list_tools\"}\n",
            "[1,2]\n"
        )
        .as_bytes();
        let mut reader = LineReader::new(input);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.id, Some(JsonRpcId::String("7".into())));
        assert_eq!(request.method, "42");

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.id, Some(JsonRpcId::Other(json!(1.5))));
        assert_eq!(request.method, "list_tools");

        let request = reader.next_request().await.unwrap().unwrap();
        assert!(request.id.is_none());
        assert!(reader.next_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_skipped() {
        let input: &[u8] = b"\xff\xfe\n{\"id\":1,\"method\":\"list_tools\"}\n";
        let mut reader = LineReader::new(input);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.id, Some(JsonRpcId::Number(1)));
    }

    #[tokio::test]
    async fn test_trailing_fragment_at_eof() {
        let input: &[u8] = b"{\"id\":\"last\",\"method\":\"list_tools\"}";
        let mut reader = LineReader::new(input);

        let request = reader.next_request().await.unwrap().unwrap();
        assert_eq!(request.id, Some(JsonRpcId::String("last".into())));
        assert!(reader.next_request().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_response_is_one_line() {
        let writer = LineWriter::new(Vec::new());

        writer
            .write_response(&JsonRpcResponse::success(Some("1".into()), json!({"status": "ok"})))
            .await
            .unwrap();
        writer
            .write_response(&JsonRpcResponse::error(
                Some("2".into()),
                JsonRpcError::invalid_params("bad"),
            ))
            .await
            .unwrap();

        let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "1");
        assert_eq!(first["result"]["status"], "ok");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["error"]["code"], "invalid_params");
    }

    #[tokio::test]
    async fn test_into_inner_with_live_clone() {
        let writer = LineWriter::new(Vec::<u8>::new());
        let clone = writer.clone();
        assert!(writer.into_inner().is_none());
        assert!(clone.into_inner().is_some());
    }
}
