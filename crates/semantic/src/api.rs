use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::normalize::l2_normalize_in_place;
use crate::retry::execute_with_retry_async;
use crate::{EmbeddingProvider, ProviderKind, SemanticConfig, SemanticError};

/// Embedding provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    client: reqwest::Client,
    endpoint: String,
    cfg: SemanticConfig,
}

impl ApiEmbedder {
    /// Build a client for an `ollama`, `openai` or `custom` provider.
    pub fn new(cfg: SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        if cfg.provider == ProviderKind::Stub {
            return Err(SemanticError::InvalidConfig(
                "the stub provider does not use HTTP".into(),
            ));
        }
        let base = cfg.api_url.as_deref().unwrap_or_default();
        let endpoint = endpoint_for(cfg.provider, base);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            cfg,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, texts: &[&str], batch: bool) -> Result<Vec<Vec<f32>>, SemanticError> {
        let payload = build_api_payload(self.cfg.provider, texts, &self.cfg.model_name, batch);
        let response = execute_with_retry_async(&self.cfg.retry, SemanticError::is_retryable, |_| {
            send_api_request(&self.client, &self.endpoint, self.cfg.api_auth_header.as_deref(), &payload)
        })
        .await?;

        let mut vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::InvalidResponse(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        if vectors.iter().any(Vec::is_empty) {
            return Err(SemanticError::InvalidResponse("empty embedding vector".into()));
        }
        if self.cfg.normalize {
            vectors.iter_mut().for_each(|v| l2_normalize_in_place(v));
        }
        debug!(
            provider = %self.cfg.provider,
            inputs = texts.len(),
            dim = vectors[0].len(),
            "embeddings_received"
        );
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    fn model_name(&self) -> &str {
        &self.cfg.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let mut vectors = self.request(&[text], false).await?;
        vectors
            .pop()
            .ok_or_else(|| SemanticError::InvalidResponse("no embedding returned".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts, true).await
    }
}

fn endpoint_for(provider: ProviderKind, base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    match provider {
        ProviderKind::Ollama if !base.ends_with("/api/embed") => format!("{base}/api/embed"),
        ProviderKind::OpenAI if !base.ends_with("/embeddings") => format!("{base}/v1/embeddings"),
        _ => base.to_string(),
    }
}

fn build_api_payload(provider: ProviderKind, texts: &[&str], model: &str, batch: bool) -> Value {
    let first = texts.first().copied().unwrap_or_default();
    match provider {
        ProviderKind::Ollama | ProviderKind::OpenAI => {
            if batch {
                json!({ "model": model, "input": texts })
            } else {
                json!({ "model": model, "input": first })
            }
        }
        ProviderKind::Custom | ProviderKind::Stub => {
            if batch {
                json!({ "texts": texts })
            } else {
                json!({ "text": first })
            }
        }
    }
}

async fn send_api_request(
    client: &reqwest::Client,
    url: &str,
    auth_header: Option<&str>,
    payload: &Value,
) -> Result<Value, SemanticError> {
    let mut request = client.post(url).header("Content-Type", "application/json");
    if let Some(header) = auth_header {
        request = request.header("Authorization", header);
    }

    let response = request.json(payload).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SemanticError::Request(format!("HTTP error {status}: {body}")));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| SemanticError::InvalidResponse(format!("invalid JSON response: {e}")))
}

/// Accepts `{"embeddings": [[..]]}` (Ollama), `{"embedding": [..]}`,
/// `{"data": [{"embedding": [..]}]}` (OpenAI) and bare arrays.
pub(crate) fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_vector(embedding).map(|v| vec![v]);
            }
            if let Some(Value::Array(items)) = map.remove("data") {
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => vectors.push(parse_embedding_vector(embedding)?),
                            None => {
                                return Err(SemanticError::InvalidResponse(
                                    "missing `embedding` field in data item".into(),
                                ))
                            }
                        },
                        _ => {
                            return Err(SemanticError::InvalidResponse(
                                "unexpected entry inside `data` array".into(),
                            ))
                        }
                    }
                }
                return Ok(vectors);
            }
            Err(SemanticError::InvalidResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num.as_f64().map(|f| f as f32).ok_or_else(|| {
                    SemanticError::InvalidResponse("non-finite embedding value".into())
                }),
                other => Err(SemanticError::InvalidResponse(format!(
                    "embedding entries must be numbers, got {other}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::InvalidResponse(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
