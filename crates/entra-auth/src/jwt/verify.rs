//! Signature verification
//!
//! Only asymmetric algorithms are accepted, which keeps algorithm confusion
//! (`none`, or HS256 keyed with a public key) out. Time, audience and issuer
//! checks are switched off in `jsonwebtoken` here; the claims policy owns them.

use std::collections::HashSet;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use super::{DecodedToken, decode_token};
use crate::error::SignatureError;

/// Algorithms a token may be signed with
pub const SUPPORTED_ALGORITHMS: &[Algorithm] = &[
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
    Algorithm::ES256,
    Algorithm::ES384,
];

/// Verify `raw`'s signature with `key` and return the decoded token
///
/// # Errors
///
/// Returns [`SignatureError`] if the token cannot be parsed, declares an
/// unsupported algorithm, or its signature does not verify against `key`.
pub fn verify_signature(raw: &str, key: &DecodingKey) -> Result<DecodedToken, SignatureError> {
    let token = decode_token(raw).map_err(|e| SignatureError::Malformed(e.to_string()))?;

    let algorithm = Algorithm::from_str(&token.header.algorithm)
        .ok()
        .filter(|alg| SUPPORTED_ALGORITHMS.contains(alg))
        .ok_or_else(|| SignatureError::UnsupportedAlgorithm(token.header.algorithm.clone()))?;

    decode::<serde_json::Value>(raw, key, &signature_only(algorithm))?;

    Ok(token)
}

fn signature_only(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}
