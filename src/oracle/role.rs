use std::{sync::Arc, time::Instant};

use crate::oracle::{
    Oracle,
    error::OracleError,
    types::{OracleRequest, OutputMode},
};

/// An oracle bound to a fixed role instruction (e.g. Taxonomist or Critic).
///
/// Two roles may share the same underlying oracle; they exchange nothing but
/// the text each caller hands over.
#[derive(Clone)]
pub struct RoleOracle {
    name: &'static str,
    system_prompt: String,
    output_mode: OutputMode,
    oracle: Arc<dyn Oracle>,
}

impl RoleOracle {
    pub fn new(
        name: &'static str,
        system_prompt: impl Into<String>,
        oracle: Arc<dyn Oracle>,
    ) -> Self {
        Self {
            name,
            system_prompt: system_prompt.into(),
            output_mode: OutputMode::JsonObject,
            oracle,
        }
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub async fn ask(
        &self,
        request_id: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<String, OracleError> {
        let request = OracleRequest::new(request_id, self.system_prompt.clone(), user_prompt)
            .with_output_mode(self.output_mode);
        let request_id = request.request_id.clone();
        let started_at = Instant::now();
        tracing::debug!(
            target: "oracle",
            role = self.name,
            request_id = %request_id,
            model = %self.oracle.model_id(),
            user_prompt = %request.user_prompt,
            "role_prompt"
        );

        match self.oracle.complete(request).await {
            Ok(text) => {
                tracing::debug!(
                    target: "oracle",
                    role = self.name,
                    request_id = %request_id,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    output_chars = text.len(),
                    output_text = %text,
                    "role_output"
                );
                Ok(text)
            }
            Err(err) => {
                tracing::debug!(
                    target: "oracle",
                    role = self.name,
                    request_id = %request_id,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    kind = ?err.kind,
                    error = %err,
                    "role_failed"
                );
                Err(err)
            }
        }
    }
}
