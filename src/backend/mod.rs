//! Cliente do serviço de análise de dados.
//!
//! O backend é um serviço HTTP externo que faz o trabalho pesado (parse do
//! CSV, estatísticas, gráficos). O Tabula só encaminha as chamadas.
//!
//! ## Endpoints
//!
//! - `POST /read_csv` - upload multipart do arquivo, devolve `{data: <tabela>}`
//! - `POST /describe` - estatísticas descritivas da tabela
//! - `POST /plot?kind=&x=&y=&title=` - gráfico em base64 (`{plot: ...}`)
//! - `POST /analyze?columns=` - análise completa

mod http;

pub use http::{error_detail, HttpBackend};

use async_trait::async_trait;
use serde_json::Value;

use crate::types::args::PlotRequest;
use crate::TabulaResult;

/// Nome de arquivo usado no upload multipart.
pub const CSV_FILE_NAME: &str = "data.csv";

/// Content-type do upload.
pub const CSV_MIME: &str = "text/csv";

/// Operações oferecidas pelo serviço de análise.
///
/// A tabela devolvida por [`read_csv`](Self::read_csv) é opaca: o Tabula
/// apenas a repassa para as chamadas seguintes.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// Envia o conteúdo do CSV e devolve a tabela parseada.
    async fn read_csv(&self, file_name: &str, content: Vec<u8>) -> TabulaResult<Value>;

    /// Estatísticas descritivas.
    async fn describe(&self, table: &Value) -> TabulaResult<Value>;

    /// Gera um gráfico. A resposta deve conter o campo `plot`.
    async fn plot(&self, table: &Value, plot: &PlotRequest) -> TabulaResult<Value>;

    /// Análise completa, opcionalmente restrita a `columns`.
    async fn analyze(&self, table: &Value, columns: Option<&[String]>) -> TabulaResult<Value>;
}
