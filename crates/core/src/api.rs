//! Request/response payloads for the backend HTTP API.
//!
//! The payload shapes are the contract with the model-serving backend;
//! defaults are named here and applied once, at request construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default sampling temperature for generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default token budget for generation.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Default repetition penalty applied by the backend.
pub const DEFAULT_REPETITION_PENALTY: f32 = 1.1;
/// Default language filter for training-example listings.
pub const DEFAULT_LANGUAGE_FILTER: &str = "All";

pub const TEMPERATURE_MIN: f32 = 0.0;
pub const TEMPERATURE_MAX: f32 = 1.0;
pub const MAX_TOKENS_MIN: u32 = 128;
pub const MAX_TOKENS_MAX: u32 = 2048;

/// Clamp a sampling temperature into the supported range.
pub fn clamp_temperature(temperature: f32) -> f32 {
    temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX)
}

/// Clamp a token budget into the supported range.
pub fn clamp_max_tokens(max_tokens: u32) -> u32 {
    max_tokens.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX)
}

/// `POST /generate` request body.
///
/// The language field carries whatever the caller resolved; the gateway
/// does not re-resolve an `auto` that reaches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub language: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
}

impl GenerateRequest {
    /// Build a request with the documented defaults applied.
    pub fn new(prompt: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            language: language.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            repetition_penalty: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = clamp_temperature(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = clamp_max_tokens(max_tokens);
        self
    }

    pub fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }
}

/// `POST /generate` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub code: String,
    pub language: String,
}

/// Error body returned by the backend with a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Feedback polarity on a task/solution pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Positive,
    Negative,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Positive => "positive",
            FeedbackKind::Negative => "negative",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(FeedbackKind::Positive),
            "negative" => Ok(FeedbackKind::Negative),
            other => Err(format!(
                "Unknown feedback type: {other}. Valid types: positive, negative"
            )),
        }
    }
}

/// `POST /feedback` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub task: String,
    pub solution: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
}

/// `POST /feedback` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /training` request body. The backend assigns identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSubmitRequest {
    pub task: String,
    pub solution: String,
}

/// `POST /training` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSubmitResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One entry of the training-example listing. The backend exposes a
/// preview projection of the stored pair, not the full bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub filename: String,
    pub source: String,
    pub language: String,
    pub timestamp: String,
    #[serde(rename = "taskPreview")]
    pub task_preview: String,
}

/// `GET /training` response body, sorted newest-first by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub examples: Vec<TrainingExample>,
}

/// `GET /` health body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}
