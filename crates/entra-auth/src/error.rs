//! Error taxonomy for access token validation
//!
//! Every stage of the validation pipeline reports its own typed error. None of
//! them escape [`EntraTokenValidator::validate_access_token`](crate::EntraTokenValidator::validate_access_token):
//! they are logged and collapsed into `None` there. [`AuthError`] is the
//! umbrella type returned by [`EntraTokenValidator::try_validate`](crate::EntraTokenValidator::try_validate)
//! for callers that want the failure cause programmatically.

use thiserror::Error;

/// Structural failure while decoding a compact token (no cryptography involved)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token does not have exactly three dot-separated segments
    #[error("Invalid token format: expected 3 segments, found {0}")]
    SegmentCount(usize),

    /// A segment is not valid unpadded base64url
    #[error("Invalid base64url in token {segment}: {message}")]
    Base64 {
        /// Which segment failed (`header` or `payload`)
        segment: &'static str,
        /// Underlying decoder message
        message: String,
    },

    /// The header is not a JSON object with an `alg` member
    #[error("Invalid token header: {0}")]
    Header(String),

    /// The payload is a JSON object whose registered claims have the wrong type
    #[error("Invalid token claims: {0}")]
    Claims(String),
}

/// Failure while resolving a signing key from the JWKS endpoint
#[derive(Debug, Error)]
pub enum KeySourceError {
    /// The HTTP client could not be constructed
    #[error("Failed to create JWKS HTTP client: {0}")]
    Client(String),

    /// The endpoint is not HTTPS (plain HTTP is only allowed for loopback hosts)
    #[error("JWKS endpoint must use HTTPS: {0}")]
    InsecureEndpoint(String),

    /// The request failed (connection error, timeout, ...)
    #[error("JWKS fetch failed: {0}")]
    Fetch(String),

    /// The endpoint answered with a non-success status
    #[error("JWKS endpoint returned status {0}")]
    Status(u16),

    /// The response body is not a JWK set
    #[error("Invalid JWKS format: {0}")]
    InvalidJwks(String),

    /// No key with the requested identifier is published
    #[error("Unable to find a signing key that matches '{0}'")]
    KeyNotFound(String),
}

/// Failure while verifying a token signature against a resolved key
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The header declares an algorithm that is not accepted
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The token could not be parsed for verification
    #[error("Malformed token: {0}")]
    Malformed(String),

    /// The signature does not match, or the key does not fit the algorithm
    #[error("Invalid token signature: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Why a token's claims were rejected
///
/// The display strings are the exact messages written to the request logger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// The token carries no structured payload
    #[error("Invalid token payload.")]
    MissingPayload,

    /// `iat`/`exp` missing, or the current time is outside `[iat, exp]`
    #[error("The token is expired or not yet valid.")]
    TimestampInvalid,

    /// `aud` is neither the client id nor `api://{client id}`
    #[error("The token is not issued for the expected audience.")]
    AudienceInvalid,

    /// `iss` is missing or empty
    #[error("Invalid token issuer.")]
    IssuerMissing,

    /// `iss` is not rooted at any allowed tenant
    #[error("The token is issued by unexpected tenant: {issuer}")]
    IssuerUntrusted {
        /// The offending issuer
        issuer: String,
    },

    /// `scp` does not contain the required scope
    #[error("The token is not issued for the required scope: {scope}")]
    ScopeMissing {
        /// The scope that was required
        scope: String,
    },
}

/// Umbrella error for one validation attempt
///
/// The display strings are the generic stage messages logged after the
/// stage-specific cause.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The raw token was empty
    #[error("No token provided")]
    EmptyToken,

    /// The token could not be decoded
    #[error("Failed to decode the access token")]
    Decode(#[source] DecodeError),

    /// No usable public key was found for the token's key id
    #[error("Failed to find public key for the key identifier \"{key_id}\"")]
    KeyResolution {
        /// Key id taken from the token header (empty when absent)
        key_id: String,
        /// The error raised during resolution, if any
        #[source]
        source: Option<KeySourceError>,
    },

    /// The signature did not verify
    #[error("Failed to validate the token signature")]
    Signature(#[source] SignatureError),

    /// The claims policy rejected the token
    #[error("Failed to validate the access token claims")]
    Claims(#[source] ClaimsError),
}

/// Settings loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    /// Unsupported file format
    #[error("Unsupported configuration file format. Use .toml, .yaml, .yml, or .json")]
    UnsupportedFormat,

    /// Parsing or deserialization failed
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),
}
