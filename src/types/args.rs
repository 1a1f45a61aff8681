//! Argumentos da ferramenta `analyze_data`.
//!
//! [`AnalyzeArgs`] é o formato cru recebido em `params.arguments`;
//! [`AnalyzeRequest`] é a versão validada que o pipeline consome.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{TabulaError, TabulaResult};

/// Argumentos crus de `analyze_data`, como chegam do cliente.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeArgs {
    /// Caminho do arquivo CSV local.
    #[serde(default)]
    pub file_path: Option<String>,

    /// Tipo de análise (`describe`, `plot`, `analyze`).
    #[serde(default)]
    pub analysis_type: Option<String>,

    /// Tipo de gráfico, obrigatório quando `analysis_type` é `plot`.
    #[serde(default)]
    pub plot_type: Option<String>,

    /// Coluna do eixo X.
    #[serde(default)]
    pub x: Option<String>,

    /// Coluna do eixo Y.
    #[serde(default)]
    pub y: Option<String>,

    /// Título do gráfico.
    #[serde(default)]
    pub title: Option<String>,

    /// Colunas a incluir na análise.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
}

impl AnalyzeArgs {
    /// Decodifica `params.arguments`.
    ///
    /// `null` ou ausência equivalem a um objeto vazio.
    pub fn from_value(value: Value) -> TabulaResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| TabulaError::invalid_params(format!("Invalid arguments: {}", e)))
    }

    /// Valida os argumentos e produz a requisição tipada.
    pub fn validate(self) -> TabulaResult<AnalyzeRequest> {
        let analysis = match self.analysis_type.as_deref() {
            Some("describe") => Analysis::Describe,
            Some("analyze") => Analysis::Analyze {
                columns: self.columns,
            },
            Some("plot") => {
                let kind = match self.plot_type.as_deref() {
                    Some(raw) => raw.parse::<PlotKind>()?,
                    None => {
                        return Err(TabulaError::invalid_params(
                            "plot_type is required when analysis_type is 'plot'",
                        ))
                    }
                };
                Analysis::Plot(PlotRequest {
                    kind,
                    x: self.x,
                    y: self.y,
                    title: self.title,
                })
            }
            Some(other) => {
                return Err(TabulaError::invalid_params(format!(
                    "Invalid analysis_type: {}",
                    other
                )))
            }
            None => {
                return Err(TabulaError::invalid_params(
                    "Missing required argument: analysis_type",
                ))
            }
        };

        let file_path = self
            .file_path
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| TabulaError::invalid_params("Missing required argument: file_path"))?;

        Ok(AnalyzeRequest {
            file_path,
            analysis,
        })
    }
}

/// Requisição de análise validada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    /// Arquivo a ser enviado ao backend.
    pub file_path: String,

    /// Análise a executar após o upload.
    pub analysis: Analysis,
}

/// Tipo de análise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    /// Estatísticas descritivas.
    Describe,
    /// Geração de gráfico.
    Plot(PlotRequest),
    /// Análise completa (descrição, correlação, tipos).
    Analyze {
        columns: Option<Vec<String>>,
    },
}

impl Analysis {
    /// Nome do tipo de análise, como aparece no protocolo.
    pub fn name(&self) -> &'static str {
        match self {
            Analysis::Describe => "describe",
            Analysis::Plot(_) => "plot",
            Analysis::Analyze { .. } => "analyze",
        }
    }
}

/// Parâmetros de um gráfico.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotRequest {
    pub kind: PlotKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub title: Option<String>,
}

impl PlotRequest {
    /// Query string enviada para `/plot`. Campos ausentes são omitidos.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("kind", self.kind.to_string())];
        if let Some(x) = &self.x {
            pairs.push(("x", x.clone()));
        }
        if let Some(y) = &self.y {
            pairs.push(("y", y.clone()));
        }
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        pairs
    }
}

/// Tipos de gráfico suportados pelo backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlotKind {
    Line,
    Scatter,
    Histogram,
    Heatmap,
}

impl PlotKind {
    pub const ALL: [PlotKind; 4] = [
        PlotKind::Line,
        PlotKind::Scatter,
        PlotKind::Histogram,
        PlotKind::Heatmap,
    ];
}

impl std::fmt::Display for PlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotKind::Line => write!(f, "line"),
            PlotKind::Scatter => write!(f, "scatter"),
            PlotKind::Histogram => write!(f, "histogram"),
            PlotKind::Heatmap => write!(f, "heatmap"),
        }
    }
}

impl std::str::FromStr for PlotKind {
    type Err = TabulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(PlotKind::Line),
            "scatter" => Ok(PlotKind::Scatter),
            "histogram" => Ok(PlotKind::Histogram),
            "heatmap" => Ok(PlotKind::Heatmap),
            other => Err(TabulaError::invalid_params(format!(
                "Invalid plot_type: {}",
                other
            ))),
        }
    }
}
