//! Handler da ferramenta `analyze_data`.
//!
//! O pipeline é linear: lê o arquivo local, faz upload para `/read_csv` e
//! então chama um único endpoint conforme o tipo de análise.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::backend::{AnalyticsBackend, HttpBackend, CSV_FILE_NAME};
use crate::types::args::{Analysis, AnalyzeArgs, AnalyzeRequest, PlotKind};
use crate::types::config::BackendConfig;
use crate::{TabulaError, TabulaResult};

use super::protocol::{ToolDescription, ToolResult};

/// Nome da única ferramenta exposta.
pub const ANALYZE_DATA: &str = "analyze_data";

/// Prefixo do texto devolvido para gráficos.
pub const PLOT_PREFIX: &str = "Base64 encoded plot image: ";

/// Handler das ferramentas do Tabula.
#[derive(Clone)]
pub struct ToolHandler {
    backend: Arc<dyn AnalyticsBackend>,
}

impl ToolHandler {
    /// Cria um handler sobre um backend qualquer.
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self { backend }
    }

    /// Cria um handler com o cliente HTTP configurado.
    pub fn from_config(config: &BackendConfig) -> TabulaResult<Self> {
        let backend = HttpBackend::from_config(config)?;
        tracing::debug!(base_url = backend.base_url(), "Backend client ready");
        Ok(Self::new(Arc::new(backend)))
    }

    /// Lista todas as ferramentas disponíveis.
    pub fn list_tools() -> Vec<ToolDescription> {
        let plot_kinds: Vec<String> = PlotKind::ALL.iter().map(|k| k.to_string()).collect();

        vec![ToolDescription::new(
            ANALYZE_DATA,
            "Analyze a local CSV file: descriptive statistics, plots or a full analysis.",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the CSV file to analyze"
                    },
                    "analysis_type": {
                        "type": "string",
                        "enum": ["describe", "plot", "analyze"],
                        "description": "Kind of analysis to perform"
                    },
                    "plot_type": {
                        "type": "string",
                        "enum": plot_kinds,
                        "description": "Kind of plot (required when analysis_type is 'plot')"
                    },
                    "x": {
                        "type": "string",
                        "description": "Column for the x axis"
                    },
                    "y": {
                        "type": "string",
                        "description": "Column for the y axis"
                    },
                    "title": {
                        "type": "string",
                        "description": "Plot title"
                    },
                    "columns": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Columns to include in the analysis"
                    }
                },
                "required": ["file_path", "analysis_type"]
            }),
        )]
    }

    /// Executa uma chamada de ferramenta.
    pub async fn handle_tool_call(&self, name: &str, arguments: Value) -> TabulaResult<ToolResult> {
        if name != ANALYZE_DATA {
            return Err(TabulaError::MethodNotFound(format!("Unknown tool: {}", name)));
        }

        let request = AnalyzeArgs::from_value(arguments)?.validate()?;
        self.analyze_data(request).await
    }

    /// Pipeline de `analyze_data`.
    pub async fn analyze_data(&self, request: AnalyzeRequest) -> TabulaResult<ToolResult> {
        tracing::info!(
            file = %request.file_path,
            analysis = request.analysis.name(),
            "Running analysis"
        );

        let content = tokio::fs::read(&request.file_path).await.map_err(|e| {
            TabulaError::other(format!("Failed to read '{}': {}", request.file_path, e))
        })?;

        let table = self.backend.read_csv(CSV_FILE_NAME, content).await?;

        match &request.analysis {
            Analysis::Describe => {
                let stats = self.backend.describe(&table).await?;
                ToolResult::json(&stats)
            }
            Analysis::Plot(plot) => {
                let response = self.backend.plot(&table, plot).await?;
                let image = response
                    .get("plot")
                    .and_then(Value::as_str)
                    .ok_or_else(|| TabulaError::other("Backend response has no 'plot' field"))?;
                Ok(ToolResult::text(format!("{}{}", PLOT_PREFIX, image)))
            }
            Analysis::Analyze { columns } => {
                let report = self.backend.analyze(&table, columns.as_deref()).await?;
                ToolResult::json(&report)
            }
        }
    }
}
