use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

pub type ModelId = String;
pub type RequestId = String;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_CREDENTIAL_VAR: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Text,
    JsonObject,
}

/// One oracle turn: a role instruction plus the user-turn content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    pub request_id: RequestId,
    pub system_prompt: String,
    pub user_prompt: String,
    pub output_mode: OutputMode,
}

impl OracleRequest {
    pub fn new(
        request_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            output_mode: OutputMode::JsonObject,
        }
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialRef {
    Env { var: String },
    InlineToken { token: String },
    None,
}

impl Default for CredentialRef {
    fn default() -> Self {
        Self::Env {
            var: DEFAULT_CREDENTIAL_VAR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub auth_header: Option<String>,
}

impl ResolvedCredential {
    pub fn none() -> Self {
        Self { auth_header: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

impl ReliabilityConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    120_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> ModelId {
    DEFAULT_MODEL.to_string()
}

fn default_model_aliases() -> BTreeMap<String, ModelId> {
    BTreeMap::from([
        (
            "anthropic".to_string(),
            "anthropic/claude-4.5-sonnet".to_string(),
        ),
        (
            "gemini".to_string(),
            "google/gemini-3-flash-preview".to_string(),
        ),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credential: CredentialRef,
    #[serde(default = "default_model")]
    pub default_model: ModelId,
    #[serde(default = "default_model_aliases")]
    pub model_aliases: BTreeMap<String, ModelId>,
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub max_output_tokens: Option<u64>,
    #[serde(default)]
    pub reliability: ReliabilityConfig,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            credential: CredentialRef::default(),
            default_model: default_model(),
            model_aliases: default_model_aliases(),
            extra_headers: BTreeMap::new(),
            temperature: 0.0,
            max_output_tokens: None,
            reliability: ReliabilityConfig::default(),
        }
    }
}

impl OracleConfig {
    /// Maps a shortcut such as `gemini` to a concrete model id; unknown names pass through.
    pub fn resolve_model(&self, requested: Option<&str>) -> ModelId {
        let name = requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_model.as_str());
        self.model_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}
