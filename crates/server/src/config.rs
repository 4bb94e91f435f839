use iplrag::{
    ChatProviderKind, GenerationConfig, PipelineSettings, ProviderKind, RetrievalConfig,
    SemanticConfig,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

/// Server configuration
///
/// Field names are the lower-cased environment variables
/// (`EMBEDDING_MODEL` -> `embedding_model`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    // Required
    #[serde(default)]
    pub embedding_model: String,
    #[serde(default)]
    pub generation_model: String,
    #[serde(default)]
    pub vector_store_path: String,
    #[serde(default)]
    pub vector_store_index: String,

    // Providers
    #[serde(default = "default_provider")]
    pub embedding_provider: String,
    #[serde(default = "default_api_url")]
    pub embedding_api_url: String,
    #[serde(default = "default_provider")]
    pub generation_provider: String,
    #[serde(default = "default_api_url")]
    pub generation_api_url: String,
    /// Sent as `Authorization` to both providers
    #[serde(default)]
    pub api_auth_header: Option<String>,
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    // Generation and retrieval
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_query_variants")]
    pub query_variants: usize,
    #[serde(default)]
    pub include_original_query: bool,
    #[serde(default)]
    pub expansion_fallback: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            embedding_model: String::new(),
            generation_model: String::new(),
            vector_store_path: String::new(),
            vector_store_index: String::new(),
            embedding_provider: default_provider(),
            embedding_api_url: default_api_url(),
            generation_provider: default_provider(),
            generation_api_url: default_api_url(),
            api_auth_header: None,
            provider_timeout_secs: default_provider_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_k: default_top_k(),
            query_variants: default_query_variants(),
            include_original_query: false,
            expansion_fallback: false,
        }
    }
}

const REQUIRED: [&str; 4] = [
    "EMBEDDING_MODEL",
    "GENERATION_MODEL",
    "VECTOR_STORE_PATH",
    "VECTOR_STORE_INDEX",
];

impl ServerConfig {
    /// Load configuration from `.env`, an optional `rag-server` config file and
    /// the process environment, then validate it.
    pub fn load() -> ServerResult<Self> {
        if dotenvy::dotenv().is_err() {
            tracing::warn!("No .env file found or failed to load");
        }

        // only plain identifiers; exported shell functions and the like are skipped
        let env = std::env::vars()
            .filter(|(k, _)| k.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'));
        let builder = config::Config::builder()
            .add_source(config::File::with_name("rag-server").required(false))
            .add_source(environment(env));
        Self::from_builder(builder)
    }

    /// Build from an explicit variable map instead of the process environment.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> ServerResult<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let builder = config::Config::builder().add_source(environment(vars));
        Self::from_builder(builder)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> ServerResult<Self> {
        let mut config: ServerConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        config.trim_required();
        config.validate()?;
        Ok(config)
    }

    fn trim_required(&mut self) {
        for value in [
            &mut self.embedding_model,
            &mut self.generation_model,
            &mut self.vector_store_path,
            &mut self.vector_store_index,
        ] {
            *value = value.trim().to_string();
        }
    }

    pub fn validate(&self) -> ServerResult<()> {
        let values = [
            &self.embedding_model,
            &self.generation_model,
            &self.vector_store_path,
            &self.vector_store_index,
        ];
        if let Some((key, _)) = REQUIRED
            .iter()
            .zip(values)
            .find(|(_, v)| v.trim().is_empty())
        {
            return Err(ServerError::Config(format!(
                "Required environment variable {key} is not set or empty"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ServerError::Config("TIMEOUT_SECS must be at least 1".into()));
        }
        if self.max_body_size_kb == 0 {
            return Err(ServerError::Config(
                "MAX_BODY_SIZE_KB must be at least 1".into(),
            ));
        }
        self.pipeline_settings().map(|_| ())
    }

    /// Provider, generation and retrieval settings for the pipeline, validated.
    pub fn pipeline_settings(&self) -> ServerResult<PipelineSettings> {
        let config_err = |e: &dyn std::fmt::Display| ServerError::Config(e.to_string());

        let embedding = SemanticConfig {
            provider: self
                .embedding_provider
                .parse::<ProviderKind>()
                .map_err(|e| config_err(&e))?,
            model_name: self.embedding_model.clone(),
            api_url: Some(self.embedding_api_url.clone()),
            api_auth_header: self.api_auth_header.clone(),
            api_timeout_secs: self.provider_timeout_secs,
            ..Default::default()
        };
        embedding.validate().map_err(|e| config_err(&e))?;

        let generation = GenerationConfig {
            provider: self
                .generation_provider
                .parse::<ChatProviderKind>()
                .map_err(|e| config_err(&e))?,
            model_name: self.generation_model.clone(),
            api_url: self.generation_api_url.clone(),
            api_auth_header: self.api_auth_header.clone(),
            api_timeout_secs: self.provider_timeout_secs,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        generation.validate().map_err(|e| config_err(&e))?;

        let retrieval = RetrievalConfig {
            top_k: self.top_k,
            num_variants: self.query_variants,
            include_original: self.include_original_query,
            fallback_to_single_query: self.expansion_fallback,
        };
        retrieval.validate().map_err(|e| config_err(&e))?;

        Ok(PipelineSettings {
            embedding,
            generation,
            retrieval,
            vector_store_path: PathBuf::from(&self.vector_store_path),
            vector_store_index: self.vector_store_index.clone(),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn environment<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> config::Environment
where
    K: Into<String>,
    V: Into<String>,
{
    let map: config::Map<String, String> = vars
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    config::Environment::default()
        .source(Some(map))
        .try_parsing(true)
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_api_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_tokens() -> u32 {
    300
}

fn default_top_k() -> usize {
    4
}

fn default_query_variants() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("EMBEDDING_MODEL", "granite-embedding:30m"),
            ("GENERATION_MODEL", "gemma3:4b"),
            ("VECTOR_STORE_PATH", "./vector_store"),
            ("VECTOR_STORE_INDEX", "ipl_2022"),
        ]
    }

    #[test]
    fn test_defaults_with_required_vars() {
        let cfg = ServerConfig::from_vars(required()).unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.timeout_secs, 180);
        assert_eq!(cfg.max_body_size(), 64 * 1024);
        assert!(cfg.enable_cors);
        assert_eq!(cfg.embedding_model, "granite-embedding:30m");
        assert_eq!(cfg.top_k, 4);
        assert_eq!(cfg.query_variants, 3);
        assert!(!cfg.expansion_fallback);

        let settings = cfg.pipeline_settings().unwrap();
        assert_eq!(settings.generation.model_name, "gemma3:4b");
        assert_eq!(settings.generation.temperature, 0.5);
        assert_eq!(settings.location().index_path(), PathBuf::from("./vector_store/ipl_2022.index"));
    }

    #[test]
    fn test_missing_required_var() {
        let vars: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| *k != "GENERATION_MODEL")
            .collect();
        let err = ServerConfig::from_vars(vars).unwrap_err();
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("GENERATION_MODEL")));
    }

    #[test]
    fn test_blank_required_var() {
        let mut vars = required();
        vars[3] = ("VECTOR_STORE_INDEX", "   ");
        let err = ServerConfig::from_vars(vars).unwrap_err();
        assert!(matches!(err, ServerError::Config(ref m) if m.contains("VECTOR_STORE_INDEX")));
    }

    #[test]
    fn test_required_values_are_trimmed() {
        let mut vars = required();
        vars[0] = ("EMBEDDING_MODEL", "  granite-embedding:30m ");
        let cfg = ServerConfig::from_vars(vars).unwrap();
        assert_eq!(cfg.embedding_model, "granite-embedding:30m");
    }

    #[test]
    fn test_overrides_are_parsed() {
        let mut vars = required();
        vars.extend([
            ("PORT", "9001"),
            ("TOP_K", "2"),
            ("TEMPERATURE", "0.2"),
            ("EXPANSION_FALLBACK", "true"),
            ("GENERATION_PROVIDER", "openai"),
        ]);
        let cfg = ServerConfig::from_vars(vars).unwrap();
        assert_eq!(cfg.port, 9001);
        let settings = cfg.pipeline_settings().unwrap();
        assert_eq!(settings.retrieval.top_k, 2);
        assert!(settings.retrieval.fallback_to_single_query);
        assert_eq!(settings.generation.provider, ChatProviderKind::OpenAI);
        assert!((settings.generation.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_values_abort() {
        for (key, value) in [("TOP_K", "0"), ("TEMPERATURE", "3.5"), ("EMBEDDING_PROVIDER", "bogus")] {
            let mut vars = required();
            vars.push((key, value));
            assert!(
                matches!(ServerConfig::from_vars(vars), Err(ServerError::Config(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::from_vars(required()).unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8000);
    }
}
