//! Entra ID access token validator
//!
//! [`EntraTokenValidator`] runs the full pipeline for one raw bearer token:
//!
//! 1. reject an empty token
//! 2. decode header/payload without verification
//! 3. resolve the signing key for the header's `kid`
//! 4. verify the signature
//! 5. evaluate the claims policy
//!
//! The first failing stage ends the attempt. Failures are written to the
//! caller's [`AuthLogger`] and reported as `None`; the validator never
//! returns an error from [`validate_access_token`](EntraTokenValidator::validate_access_token).

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::{AuthSettings, ValidatorConfig};
use crate::error::{AuthError, KeySourceError};
use crate::jwt::{ClaimsPolicy, DecodedToken, JwksClient, KeySource, decode_token, verify_signature};
use crate::logger::{AuthLogger, LogEvent};

/// Validator for bearer tokens issued by Entra ID
///
/// Configuration is immutable; share one instance across requests through `Arc`.
///
/// # Example
///
/// ```rust,no_run
/// use entra_auth::{EntraTokenValidator, TracingLogger, ValidatorConfig};
///
/// # tokio_test::block_on(async {
/// let validator = EntraTokenValidator::new(ValidatorConfig::new(
///     "contoso-tenant-id",
///     "my-client-id",
///     None,
/// ))?;
///
/// let token = "eyJ0eXAiOiJKV1QiLCJhbGc...";
/// if let Some(decoded) = validator.validate_access_token(&TracingLogger, token, None).await {
///     println!("Token valid for: {:?}", decoded.payload.and_then(|c| c.oid));
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct EntraTokenValidator {
    config: ValidatorConfig,
    key_source: Arc<dyn KeySource>,
    clock: Arc<dyn Clock>,
}

impl EntraTokenValidator {
    /// Create a validator that fetches keys from the tenant's JWKS endpoint
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError::Client`] if the HTTP client cannot be built.
    pub fn new(config: ValidatorConfig) -> Result<Self, KeySourceError> {
        let key_source = JwksClient::new(config.key_source_uri().to_string())?;
        Ok(Self::with_key_source(config, Arc::new(key_source)))
    }

    /// Create a validator from loaded settings
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError::Client`] if the HTTP client cannot be built.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, KeySourceError> {
        let config = settings.validator_config();
        let key_source =
            JwksClient::with_ttl(config.key_source_uri().to_string(), settings.jwks_cache_ttl())?;
        Ok(Self::with_key_source(config, Arc::new(key_source)))
    }

    /// Create a validator with a custom key source
    pub fn with_key_source(config: ValidatorConfig, key_source: Arc<dyn KeySource>) -> Self {
        Self {
            config,
            key_source,
            clock: Arc::new(SystemClock),
        }
    }

    /// Read time from `clock` instead of the system clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The validation policy
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate `raw_token`, logging the reason for any failure to `logger`
    ///
    /// When `required_scope` is given, the token's `scp` claim must contain it.
    /// Returns the verified token, or `None` after logging why it was rejected.
    pub async fn validate_access_token(
        &self,
        logger: &dyn AuthLogger,
        raw_token: &str,
        required_scope: Option<&str>,
    ) -> Option<DecodedToken> {
        match self.try_validate(raw_token, required_scope).await {
            Ok(token) => Some(token),
            Err(err) => {
                log_failure(logger, &err);
                None
            }
        }
    }

    /// Validate `raw_token`, returning the failure cause instead of logging it
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first stage that rejected the token.
    pub async fn try_validate(
        &self,
        raw_token: &str,
        required_scope: Option<&str>,
    ) -> Result<DecodedToken, AuthError> {
        if raw_token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        let unverified = decode_token(raw_token).map_err(AuthError::Decode)?;

        let key_id = unverified.header.key_id.clone().unwrap_or_default();
        let key = match self.key_source.resolve_public_key(&key_id).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                return Err(AuthError::KeyResolution {
                    key_id,
                    source: None,
                });
            }
            Err(e) => {
                return Err(AuthError::KeyResolution {
                    key_id,
                    source: Some(e),
                });
            }
        };

        let token = verify_signature(raw_token, &key).map_err(AuthError::Signature)?;

        ClaimsPolicy::new(&self.config, self.clock.as_ref())
            .evaluate(token.claims(), required_scope)
            .into_result()
            .map_err(AuthError::Claims)?;

        debug!(
            key_id = %key_id,
            tenant = ?token.claims().and_then(|c| c.tid.as_deref()),
            "Access token validated"
        );

        Ok(token)
    }
}

/// Write the log sequence for a failed attempt: the stage's cause (if any),
/// then the stage's generic message
fn log_failure(logger: &dyn AuthLogger, err: &AuthError) {
    match err {
        AuthError::EmptyToken => {}
        AuthError::Decode(cause) => logger.error(LogEvent::Error(cause)),
        AuthError::KeyResolution { source, .. } => {
            if let Some(cause) = source {
                logger.error(LogEvent::Error(cause));
            }
        }
        AuthError::Signature(cause) => logger.error(LogEvent::Error(cause)),
        AuthError::Claims(reason) => logger.error(LogEvent::Message(&reason.to_string())),
    }
    logger.error(LogEvent::Message(&err.to_string()));
}
