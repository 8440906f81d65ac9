use std::env;

use crate::oracle::{
    error::{OracleError, OracleErrorKind, invalid_request},
    types::{CredentialRef, ResolvedCredential},
};

pub fn resolve_credential(reference: &CredentialRef) -> Result<ResolvedCredential, OracleError> {
    match reference {
        CredentialRef::Env { var } => {
            let token = env::var(var).map_err(|_| {
                OracleError::new(
                    OracleErrorKind::Authentication,
                    format!("missing credential environment variable {}", var),
                )
                .with_retryable(false)
            })?;
            if token.trim().is_empty() {
                return Err(OracleError::new(
                    OracleErrorKind::Authentication,
                    format!("credential environment variable {} is empty", var),
                )
                .with_retryable(false));
            }

            Ok(ResolvedCredential {
                auth_header: Some(format!("Bearer {}", token.trim())),
            })
        }
        CredentialRef::InlineToken { token } => {
            if token.trim().is_empty() {
                return Err(invalid_request("inline credential token cannot be empty"));
            }
            Ok(ResolvedCredential {
                auth_header: Some(format!("Bearer {}", token.trim())),
            })
        }
        CredentialRef::None => Ok(ResolvedCredential::none()),
    }
}
