use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};
use serde_json::{Value, json};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::oracle::{
    Oracle,
    credentials::resolve_credential,
    error::{OracleError, OracleErrorKind, cancelled, invalid_request},
    reliability::ReliabilityLayer,
    types::{ModelId, OracleConfig, OracleRequest, OutputMode, ResolvedCredential},
};

/// Chat-completions oracle for OpenAI-compatible endpoints (OpenRouter by default).
#[derive(Clone)]
pub struct OpenAiCompatibleOracle {
    client: Client,
    endpoint: String,
    model: ModelId,
    credential: ResolvedCredential,
    extra_headers: Vec<(String, String)>,
    temperature: f64,
    max_output_tokens: Option<u64>,
    reliability: ReliabilityLayer,
    cancel: CancellationToken,
}

impl OpenAiCompatibleOracle {
    pub fn new(
        config: &OracleConfig,
        model: ModelId,
        cancel: CancellationToken,
    ) -> Result<Self, OracleError> {
        if config.endpoint.trim().is_empty() {
            return Err(invalid_request("oracle.endpoint must not be empty"));
        }
        if model.trim().is_empty() {
            return Err(invalid_request("oracle model id must not be empty"));
        }

        let credential = resolve_credential(&config.credential)?;
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| {
                OracleError::new(
                    OracleErrorKind::Internal,
                    format!("failed to build http client: {err}"),
                )
                .with_retryable(false)
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model,
            credential,
            extra_headers: config
                .extra_headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            reliability: ReliabilityLayer::new(config.reliability.clone()),
            cancel,
        })
    }

    async fn invoke_once(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "temperature": self.temperature,
        });
        if matches!(request.output_mode, OutputMode::JsonObject) {
            body["response_format"] = json!({"type": "json_object"});
        }
        if let Some(max_tokens) = self.max_output_tokens {
            body["max_tokens"] = Value::Number(max_tokens.into());
        }

        let mut req_builder = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-id", request.request_id.as_str())
            .json(&body);
        if let Some(auth_header) = &self.credential.auth_header {
            req_builder = req_builder.header(header::AUTHORIZATION, auth_header);
        }
        for (k, v) in &self.extra_headers {
            req_builder = req_builder.header(k.as_str(), v.as_str());
        }

        let response = req_builder.send().await.map_err(|err| {
            let kind = if err.is_timeout() {
                OracleErrorKind::Timeout
            } else {
                OracleErrorKind::Transport
            };
            OracleError::new(kind, format!("chat completion request failed: {err}"))
                .with_model(self.model.clone())
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, &self.model, &body));
        }

        let payload = response.json::<Value>().await.map_err(|err| {
            OracleError::new(
                OracleErrorKind::MalformedResponse,
                format!("chat completion body decode failed: {err}"),
            )
            .with_retryable(false)
            .with_model(self.model.clone())
        })?;

        extract_message_content(&payload, &self.model)
    }
}

#[async_trait]
impl Oracle for OpenAiCompatibleOracle {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError> {
        let deadline = self.reliability.config().request_timeout();
        let started_at = Instant::now();
        let mut attempt = 0_u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(cancelled("oracle call cancelled before dispatch")
                    .with_model(self.model.clone()));
            }

            let outcome = tokio::select! {
                _ = self.cancel.cancelled() => {
                    Err(cancelled("oracle call cancelled").with_model(self.model.clone()))
                }
                result = timeout(deadline, self.invoke_once(&request)) => match result {
                    Ok(result) => result,
                    Err(_) => Err(OracleError::new(
                        OracleErrorKind::Timeout,
                        format!(
                            "oracle call exceeded deadline of {} ms",
                            deadline.as_millis()
                        ),
                    )
                    .with_model(self.model.clone())),
                },
            };

            let err = match outcome {
                Ok(text) => {
                    tracing::debug!(
                        target: "oracle",
                        request_id = %request.request_id,
                        model = %self.model,
                        attempts = attempt + 1,
                        elapsed_ms = started_at.elapsed().as_millis() as u64,
                        "oracle_call_completed"
                    );
                    return Ok(text);
                }
                Err(err) => err,
            };

            let can_retry = self.reliability.can_retry(&err, attempt);
            tracing::debug!(
                target: "oracle",
                request_id = %request.request_id,
                model = %self.model,
                attempt = attempt,
                kind = ?err.kind,
                retryable = err.retryable,
                can_retry = can_retry,
                error = %err.message,
                "oracle_attempt_failed"
            );
            if !can_retry {
                return Err(err);
            }

            attempt += 1;
            let delay = self.reliability.backoff_delay(attempt);
            if err.kind == OracleErrorKind::RateLimited {
                tracing::warn!(
                    target: "oracle",
                    request_id = %request.request_id,
                    model = %self.model,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "oracle_rate_limited_backoff"
                );
            }
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(cancelled("oracle call cancelled during backoff")
                        .with_model(self.model.clone()));
                }
                _ = sleep(delay) => {}
            }
        }
    }
}

pub fn map_http_error(status: u16, model: &str, body: &str) -> OracleError {
    let normalized_body = body.chars().take(240).collect::<String>();

    let mut err = if status == 401 {
        OracleError::new(OracleErrorKind::Authentication, "authentication failed")
            .with_retryable(false)
    } else if status == 403 {
        OracleError::new(OracleErrorKind::Authorization, "authorization failed")
            .with_retryable(false)
    } else if status == 408 || status == 429 {
        OracleError::new(
            OracleErrorKind::RateLimited,
            format!("oracle returned status {}", status),
        )
        .with_retryable(true)
    } else if (400..500).contains(&status) {
        OracleError::new(
            OracleErrorKind::InvalidRequest,
            format!("oracle returned status {}", status),
        )
        .with_retryable(false)
    } else {
        OracleError::new(
            OracleErrorKind::Transport,
            format!("oracle returned status {}", status),
        )
        .with_retryable(true)
    };

    err = err.with_model(model.to_string()).with_http_status(status);
    if !normalized_body.is_empty() {
        err.message = format!("{}: {}", err.message, normalized_body);
    }
    err
}

fn extract_message_content(payload: &Value, model: &str) -> Result<String, OracleError> {
    // Some routers answer 200 with an embedded error object.
    if let Some(error) = payload.get("error") {
        let status = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
            .unwrap_or(502);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("embedded provider error");
        return Err(map_http_error(status, model, message));
    }

    let message = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            OracleError::new(
                OracleErrorKind::MalformedResponse,
                "chat completion response missing choices[0].message",
            )
            .with_retryable(false)
            .with_model(model.to_string())
        })?;

    match message.get("content") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Array(parts)) => Ok(parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("")),
        _ => Ok(String::new()),
    }
}
