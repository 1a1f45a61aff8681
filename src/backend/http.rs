//! Implementação HTTP do backend, via reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::types::args::PlotRequest;
use crate::types::config::{normalize_base_url, BackendConfig};
use crate::{TabulaError, TabulaResult};

use super::{AnalyticsBackend, CSV_MIME};

/// Cliente HTTP do serviço de análise.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Cria um cliente sem timeout.
    pub fn new(base_url: impl AsRef<str>) -> TabulaResult<Self> {
        Self::build(base_url.as_ref(), None)
    }

    /// Cria um cliente a partir da configuração.
    pub fn from_config(config: &BackendConfig) -> TabulaResult<Self> {
        Self::build(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> TabulaResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base_url(base_url),
        })
    }

    /// URL base em uso.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, endpoint: &'static str, request: RequestBuilder) -> TabulaResult<Value> {
        tracing::debug!(endpoint, "Calling backend");

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(status, &body);
        tracing::warn!(endpoint, status = status.as_u16(), %detail, "Backend returned an error");

        Err(TabulaError::Backend {
            status: status.as_u16(),
            detail,
        })
    }
}

/// Extrai a mensagem de erro de uma resposta do backend.
///
/// Usa o campo `detail` do corpo JSON quando existir; valores que não são
/// string são renderizados como JSON compacto.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::String(_)) | Some(Value::Null) | None => {
            format!("Request failed with status code {}", status.as_u16())
        }
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl AnalyticsBackend for HttpBackend {
    async fn read_csv(&self, file_name: &str, content: Vec<u8>) -> TabulaResult<Value> {
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(CSV_MIME)?;
        let form = Form::new().part("file", part);

        let body = self
            .send("read_csv", self.client.post(self.endpoint("read_csv")).multipart(form))
            .await?;

        body.get("data")
            .cloned()
            .ok_or_else(|| TabulaError::other("Backend response from read_csv has no 'data' field"))
    }

    async fn describe(&self, table: &Value) -> TabulaResult<Value> {
        self.send("describe", self.client.post(self.endpoint("describe")).json(table))
            .await
    }

    async fn plot(&self, table: &Value, plot: &PlotRequest) -> TabulaResult<Value> {
        let request = self
            .client
            .post(self.endpoint("plot"))
            .query(&plot.query_pairs())
            .json(table);

        self.send("plot", request).await
    }

    async fn analyze(&self, table: &Value, columns: Option<&[String]>) -> TabulaResult<Value> {
        let mut request = self.client.post(self.endpoint("analyze"));
        if let Some(columns) = columns {
            let pairs: Vec<(&str, &str)> = columns.iter().map(|c| ("columns", c.as_str())).collect();
            request = request.query(&pairs);
        }

        self.send("analyze", request.json(table)).await
    }
}
