// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! LLM client abstraction for confidence elicitation
//!
//! One call shape: a prompt in, completion text out, with a JSON object
//! embedded somewhere in the text. Extraction takes the first balanced
//! `{...}` span; deserialization is typed per prompt schema, and schema
//! failures trigger the caller's documented default rather than looser
//! parsing.

use crate::error::LlmError;
use crate::resilience::RetryPolicy;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// Trait for LLM clients used in confidence elicitation.
///
/// Calibration tests assume reproducibility, so implementations should
/// run at deterministic settings (temperature near zero, fixed seed
/// where the provider supports one).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a prompt and return the raw completion text.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

/// Extract the first balanced `{...}` span from completion text.
///
/// Handles strings and escapes so braces inside JSON string values do
/// not unbalance the scan.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and deserialize a typed response from completion text.
pub fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let json = extract_json_object(text).ok_or(LlmError::MissingJson)?;
    serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

/// Configuration for the HTTP-backed client.
#[derive(Debug, Clone)]
pub struct HttpLlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Bounded retries around the transport; fallback defaults still
    /// apply on exhaustion.
    pub max_retries: u32,
}

impl HttpLlmConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat-completions client over any OpenAI-compatible endpoint.
pub struct HttpLlmClient {
    config: HttpLlmConfig,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: HttpLlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            retry: RetryPolicy::bounded(config.max_retries),
            config,
            client,
        })
    }

    async fn complete_once(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout.as_secs())
                } else {
                    LlmError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimitExceeded);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("{status}: {body}")));
        }

        let body: serde_json::Value = response.json().await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| LlmError::InvalidResponse("no completion content".to_string()))
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.delay_for_attempt(attempt - 1);
                debug!(attempt, ?delay, "retrying LLM call");
                tokio::time::sleep(delay).await;
            }
            match self.complete_once(prompt, max_tokens, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(attempt, error = %e, "LLM call failed");
                    last_error = Some(e);
                }
            }
        }

        Err(LlmError::Exhausted {
            attempts: self.retry.max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Test double that replays canned completions in order.
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl ScriptedLlmClient {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
        }
    }

    /// A client whose every call fails, for fallback-path tests.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_error(&self, error: LlmError) {
        self.responses.lock().push_back(Err(error));
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api("script exhausted".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
