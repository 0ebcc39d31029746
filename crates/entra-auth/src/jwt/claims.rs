//! Claims policy for Entra access tokens
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. payload present
//! 2. `iat <= now <= exp` (both bounds inclusive, both claims required)
//! 3. `aud` is the client id or `api://{client id}`
//! 4. `iss` present
//! 5. `iss` rooted at an allowed tenant (empty allow-list trusts any tenant)
//! 6. `scp` contains the required scope, when one is required (an empty
//!    required scope counts as none)

use super::AccessTokenClaims;
use crate::clock::Clock;
use crate::config::{AUTHORITY_HOST, ValidatorConfig};
use crate::error::ClaimsError;

/// Result of evaluating a token's claims
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimsOutcome<'a> {
    /// Every check passed
    Valid(&'a AccessTokenClaims),
    /// The first failing check
    Invalid(ClaimsError),
}

impl<'a> ClaimsOutcome<'a> {
    /// Convert into a `Result`
    ///
    /// # Errors
    ///
    /// Returns the [`ClaimsError`] of an `Invalid` outcome.
    pub fn into_result(self) -> Result<&'a AccessTokenClaims, ClaimsError> {
        match self {
            Self::Valid(claims) => Ok(claims),
            Self::Invalid(err) => Err(err),
        }
    }

    /// Whether every check passed
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Claims policy evaluated against a [`ValidatorConfig`]
#[derive(Debug, Clone, Copy)]
pub struct ClaimsPolicy<'a> {
    config: &'a ValidatorConfig,
    clock: &'a dyn Clock,
}

impl<'a> ClaimsPolicy<'a> {
    /// Policy for `config`, reading time from `clock`
    pub fn new(config: &'a ValidatorConfig, clock: &'a dyn Clock) -> Self {
        Self { config, clock }
    }

    /// Evaluate `payload`, requiring `required_scope` when given
    ///
    /// `Some("")` is treated like `None`.
    pub fn evaluate<'c>(
        &self,
        payload: Option<&'c AccessTokenClaims>,
        required_scope: Option<&str>,
    ) -> ClaimsOutcome<'c> {
        match self.check(payload, required_scope) {
            Ok(claims) => ClaimsOutcome::Valid(claims),
            Err(err) => ClaimsOutcome::Invalid(err),
        }
    }

    fn check<'c>(
        &self,
        payload: Option<&'c AccessTokenClaims>,
        required_scope: Option<&str>,
    ) -> Result<&'c AccessTokenClaims, ClaimsError> {
        let claims = payload.ok_or(ClaimsError::MissingPayload)?;

        let now = self.clock.now_epoch_secs();
        match (claims.iat, claims.exp) {
            (Some(iat), Some(exp)) if iat <= now && now <= exp => {}
            _ => return Err(ClaimsError::TimestampInvalid),
        }

        let audience = claims.aud.as_ref().and_then(|aud| aud.as_single());
        if !audience.is_some_and(|aud| self.is_expected_audience(aud)) {
            return Err(ClaimsError::AudienceInvalid);
        }

        let issuer = claims
            .iss
            .as_deref()
            .filter(|iss| !iss.is_empty())
            .ok_or(ClaimsError::IssuerMissing)?;

        if !self.is_trusted_issuer(issuer) {
            return Err(ClaimsError::IssuerUntrusted {
                issuer: issuer.to_string(),
            });
        }

        if let Some(scope) = required_scope.filter(|scope| !scope.is_empty())
            && !claims.scp.as_deref().is_some_and(|scp| scp.contains(scope))
        {
            return Err(ClaimsError::ScopeMissing {
                scope: scope.to_string(),
            });
        }

        Ok(claims)
    }

    fn is_expected_audience(&self, audience: &str) -> bool {
        let client_id = self.config.client_id();
        audience == client_id
            || audience
                .strip_prefix("api://")
                .is_some_and(|rest| rest == client_id)
    }

    fn is_trusted_issuer(&self, issuer: &str) -> bool {
        let allowed = self.config.allowed_issuer_tenant_ids();
        allowed.is_empty()
            || allowed
                .iter()
                .any(|tid| issuer.starts_with(&format!("{AUTHORITY_HOST}/{tid}/")))
    }
}
