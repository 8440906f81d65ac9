pub mod credentials;
pub mod error;
pub mod openai_compatible;
pub mod reliability;
pub mod response_normalizer;
pub mod role;
pub mod types;

use async_trait::async_trait;

pub use error::{OracleError, OracleErrorKind};
pub use openai_compatible::OpenAiCompatibleOracle;
pub use response_normalizer::{MalformedResponse, normalize};
pub use role::RoleOracle;
pub use types::{CredentialRef, ModelId, OracleConfig, OracleRequest, OutputMode};

/// External classification oracle: one prompt in, free text out.
///
/// Implementations make no promise that the text is JSON; callers run it
/// through [`normalize`].
#[async_trait]
pub trait Oracle: Send + Sync {
    fn model_id(&self) -> &str;

    async fn complete(&self, request: OracleRequest) -> Result<String, OracleError>;
}
