//! Gemini REST client. Every model call in the backend goes through here so
//! that retry and backoff behave the same for question generation, grading
//! and the raw pass-through endpoints.

use crate::config::Config;
use crate::error::{Error, Result};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::sync::mpsc;

const API_KEY_HEADER: &str = "x-goog-api-key";
const TRANSIENT_STATUSES: [u16; 3] = [429, 503, 504];

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the `attempt`-th retry (1-based): base, 2*base, 4*base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay * factor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: JsonValue,
    #[serde(default)]
    pub config: JsonValue,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub text: Option<String>,
    pub raw: JsonValue,
}

#[derive(Clone)]
pub struct GenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    default_model: String,
    retry: RetryPolicy,
}

impl GenAiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        default_model: String,
        retry: RetryPolicy,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
            retry,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            config.genai_api_key.clone(),
            config.genai_base_url.clone(),
            config.genai_model.clone(),
            RetryPolicy {
                max_retries: config.genai_max_retries,
                base_delay: Duration::from_millis(config.genai_base_delay_ms),
            },
            client,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn request(&self, contents: impl Into<String>, config: JsonValue) -> GenerateRequest {
        GenerateRequest {
            model: self.default_model.clone(),
            contents: JsonValue::String(contents.into()),
            config,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::NotConfigured("GenAI client not configured".to_string()))
    }

    /// Single attempt, no retry.
    pub async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, req.model
        );

        let res = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, key)
            .json(&build_body(req))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::ModelApi {
                status,
                message: upstream_message(&text),
            });
        }

        let raw: JsonValue = res.json().await?;
        Ok(GenerateResponse {
            text: response_text(&raw),
            raw,
        })
    }

    pub async fn generate_with_retry(&self, req: &GenerateRequest) -> Result<GenerateResponse> {
        let mut attempt: u32 = 0;
        loop {
            match self.generate(req).await {
                Ok(res) => return Ok(res),
                Err(err) => {
                    attempt += 1;
                    if !is_transient(&err) || attempt > self.retry.max_retries {
                        tracing::error!(
                            model = %req.model,
                            attempts = attempt,
                            error = %err,
                            "Model call failed"
                        );
                        return Err(err);
                    }
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        model = %req.model,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient model error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Opens a streaming generation. Chunks arrive on the returned channel;
    /// the channel closes when the upstream stream ends.
    pub async fn stream(&self, req: &GenerateRequest) -> Result<mpsc::Receiver<Result<String>>> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent",
            self.base_url, req.model
        );

        let res = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, key)
            .json(&build_body(req))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::ModelApi {
                status,
                message: upstream_message(&text),
            });
        }

        let (tx, rx) = mpsc::channel(32);
        let mut body = Box::pin(res.bytes_stream());
        tokio::spawn(async move {
            let mut lines = LineBuffer::default();
            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(Error::Reqwest(e))).await;
                        return;
                    }
                };
                for line in lines.push(&bytes) {
                    if let Some(text) = parse_sse_line(&line) {
                        if tx.send(Ok(text)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            if let Some(text) = lines.finish().as_deref().and_then(parse_sse_line) {
                let _ = tx.send(Ok(text)).await;
            }
        });

        Ok(rx)
    }
}

fn build_body(req: &GenerateRequest) -> JsonValue {
    let contents = match &req.contents {
        JsonValue::String(text) => serde_json::json!([
            { "role": "user", "parts": [{ "text": text }] }
        ]),
        JsonValue::Null => serde_json::json!([
            { "role": "user", "parts": [{ "text": "" }] }
        ]),
        JsonValue::Array(_) => req.contents.clone(),
        other => JsonValue::Array(vec![other.clone()]),
    };

    let mut body = serde_json::json!({ "contents": contents });
    if req.config.as_object().is_some_and(|c| !c.is_empty()) {
        body["generationConfig"] = req.config.clone();
    }
    body
}

/// Concatenated text parts of the first candidate.
pub fn response_text(raw: &JsonValue) -> Option<String> {
    let parts = raw
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Splits a byte stream into lines. Bytes are only decoded once a full line
/// is buffered, so a character split across network chunks stays intact.
#[derive(Debug, Default)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    fn finish(self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() {
        return None;
    }
    let value: JsonValue = serde_json::from_str(data).ok()?;
    response_text(&value)
}

fn upstream_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}

pub fn is_transient(err: &Error) -> bool {
    if let Error::Reqwest(e) = err {
        if e.is_timeout() || e.is_connect() {
            return true;
        }
    }
    err.upstream_status()
        .is_some_and(|s| TRANSIENT_STATUSES.contains(&s))
}

/// Pulls a JSON value out of free-form model output: the outermost `{...}`
/// span, else the outermost `[...]` span, else the whole text.
pub fn extract_json(text: &str) -> Option<JsonValue> {
    if text.is_empty() {
        return None;
    }
    let candidate = span_between(text, '{', '}')
        .or_else(|| span_between(text, '[', ']'))
        .unwrap_or(text);
    serde_json::from_str(candidate).ok()
}

fn span_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
