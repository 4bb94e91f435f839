use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::{ChatProviderKind, Completion, GenerationConfig, GenerationError, GenerationProvider};

/// Chat model reached over HTTP.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    cfg: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
}

impl ChatClient {
    pub fn new(cfg: GenerationConfig) -> Result<Self, GenerationError> {
        cfg.validate()?;
        let endpoint = endpoint_for(cfg.provider, &cfg.api_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GenerationError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            cfg,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.cfg
    }

    fn request_body(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        let messages = [ChatMessage {
            role: "user",
            content: prompt,
        }];
        let body = match self.cfg.provider {
            ChatProviderKind::Ollama => serde_json::to_value(OllamaChatRequest {
                model: &self.cfg.model_name,
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature: self.cfg.temperature,
                    num_predict: self.cfg.max_tokens,
                },
            }),
            ChatProviderKind::OpenAI => serde_json::to_value(OpenAiChatRequest {
                model: &self.cfg.model_name,
                messages,
                temperature: self.cfg.temperature,
                max_tokens: self.cfg.max_tokens,
            }),
        };
        body.map_err(|e| GenerationError::InvalidConfig(format!("request body: {e}")))
    }
}

#[async_trait]
impl GenerationProvider for ChatClient {
    fn model_name(&self) -> &str {
        &self.cfg.model_name
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, GenerationError> {
        let body = self.request_body(prompt)?;
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(auth) = self.cfg.api_auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| {
            error!(endpoint = %self.endpoint, error = %e, "chat_request_failed");
            GenerationError::from(e)
        })?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            error!(endpoint = %self.endpoint, %status, "chat_request_rejected");
            return Err(GenerationError::Request(format!(
                "HTTP error {status}: {text}"
            )));
        }

        let completion = match self.cfg.provider {
            ChatProviderKind::Ollama => parse_ollama_reply(&text)?,
            ChatProviderKind::OpenAI => parse_openai_reply(&text)?,
        };
        debug!(
            provider = %self.cfg.provider,
            chars = completion.text.len(),
            "chat_completion_received"
        );
        Ok(completion)
    }
}

fn endpoint_for(provider: ChatProviderKind, base: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    match provider {
        ChatProviderKind::Ollama if !base.ends_with("/api/chat") => format!("{base}/api/chat"),
        ChatProviderKind::OpenAI if !base.ends_with("/chat/completions") => {
            format!("{base}/v1/chat/completions")
        }
        _ => base.to_string(),
    }
}

fn parse_ollama_reply(body: &str) -> Result<Completion, GenerationError> {
    let reply: OllamaChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    Ok(Completion {
        text: reply.message.content,
        model: reply.model.filter(|m| !m.trim().is_empty()),
    })
}

fn parse_openai_reply(body: &str) -> Result<Completion, GenerationError> {
    let reply: OpenAiChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    let choice = reply
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("no choices returned".into()))?;
    Ok(Completion {
        text: choice.message.content,
        model: reply.model.filter(|m| !m.trim().is_empty()),
    })
}
