//! JWT infrastructure for Entra access tokens
//!
//! # Pipeline
//!
//! ```text
//!  raw token ──► decode ──► JWKS key (kid) ──► verify signature ──► claims policy
//!               (decode)     (jwks)              (verify)            (claims)
//! ```
//!
//! Each stage gates the next; nothing is retried.
//!
//! # Modules
//!
//! - `decode` - unverified compact-token decoding
//! - `jwks` - signing key resolution with caching
//! - `verify` - signature verification
//! - `claims` - time window, audience, issuer tenant and scope policy

pub mod claims;
pub mod decode;
pub mod jwks;
pub mod verify;

pub use claims::{ClaimsOutcome, ClaimsPolicy};
pub use decode::decode_token;
pub use jwks::{JwksClient, KeySource};
pub use verify::{SUPPORTED_ALGORITHMS, verify_signature};

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// JOSE header fields the validator relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Key ID (kid) used to select the JWKS entry
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Signing algorithm (alg) as declared by the token
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Token type (typ)
    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Audience claim, which RFC 7519 allows to be a string or an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience string (what Entra issues)
    Single(String),
    /// Audience array
    Multiple(Vec<String>),
}

impl Audience {
    /// The audience when it is a single string
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(aud) => Some(aud),
            Self::Multiple(_) => None,
        }
    }
}

/// Claims of an Entra access token
///
/// The claims the policy checks (`iat`, `exp`, `aud`, `iss`, `scp`) are typed
/// strictly. Informational claims (`nbf`, `sub`, `tid`, `oid`, `appId`) are read
/// leniently: a value of an unexpected JSON type reads as `None`. Every other
/// claim is kept in `additional`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issued At (iat) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration Time (exp) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Not Before (nbf) - Unix timestamp
    #[serde(
        default,
        deserialize_with = "lenient_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub nbf: Option<i64>,

    /// Audience (aud)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Issuer (iss)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Space-delimited delegated scopes (scp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scp: Option<String>,

    /// Subject (sub)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Tenant id of the signed-in user (tid)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub tid: Option<String>,

    /// Object id of the signed-in user (oid)
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub oid: Option<String>,

    /// Calling application id (`appId`); the v1 `appid` claim stays in `additional`
    #[serde(
        rename = "appId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_id: Option<String>,

    /// All other claims
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_str).map(str::to_string))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_i64))
}

/// A decoded compact token
///
/// Produced unverified by [`decode_token`] and again, once the signature has
/// been checked, by [`verify_signature`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    /// JOSE header
    pub header: TokenHeader,
    /// Claims; `None` when the payload is not a JSON object
    pub payload: Option<AccessTokenClaims>,
    /// Signature segment, still base64url encoded
    pub signature: String,
}

impl DecodedToken {
    /// Claims, if the payload is a JSON object
    pub fn claims(&self) -> Option<&AccessTokenClaims> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claims_from_entra_payload() {
        let claims: AccessTokenClaims = serde_json::from_value(json!({
            "aud": "api://mock-client-id",
            "iss": "https://login.microsoftonline.com/mock-tenant-id/v2.0",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
            "scp": "access_as_user",
            "tid": "mock-tenant-id",
            "oid": "user-object-id",
            "appId": "calling-app",
            "name": "Megan Bowen"
        }))
        .unwrap();

        assert_eq!(
            claims.aud.as_ref().and_then(Audience::as_single),
            Some("api://mock-client-id")
        );
        assert_eq!(claims.app_id.as_deref(), Some("calling-app"));
        assert_eq!(claims.additional.get("name"), Some(&json!("Megan Bowen")));
        assert!(claims.nbf.is_none());
    }

    #[test]
    fn test_v1_appid_is_not_app_id() {
        let claims: AccessTokenClaims =
            serde_json::from_value(json!({ "appid": "v1-app" })).unwrap();
        assert_eq!(claims.app_id, None);
        assert_eq!(claims.additional.get("appid"), Some(&json!("v1-app")));

        let claims: AccessTokenClaims =
            serde_json::from_value(json!({ "appId": "v2-app", "appid": "v1-app" })).unwrap();
        assert_eq!(claims.app_id.as_deref(), Some("v2-app"));
        assert_eq!(claims.additional.get("appid"), Some(&json!("v1-app")));
    }

    #[test]
    fn test_informational_claims_are_lenient() {
        let claims: AccessTokenClaims = serde_json::from_value(json!({
            "sub": 12345,
            "nbf": 1_704_066_900.5,
            "tid": null,
            "oid": ["x"],
            "appId": true,
            "iss": "https://login.microsoftonline.com/t/v2.0"
        }))
        .unwrap();

        assert_eq!(claims.sub, None);
        assert_eq!(claims.nbf, None);
        assert_eq!(claims.tid, None);
        assert_eq!(claims.oid, None);
        assert_eq!(claims.app_id, None);
        assert!(claims.iss.is_some());
    }

    #[test]
    fn test_policy_claims_stay_strict() {
        assert!(serde_json::from_value::<AccessTokenClaims>(json!({ "exp": "soon" })).is_err());
        assert!(serde_json::from_value::<AccessTokenClaims>(json!({ "scp": 1 })).is_err());
    }

    #[test]
    fn test_audience_array() {
        let claims: AccessTokenClaims =
            serde_json::from_value(json!({ "aud": ["a", "b"] })).unwrap();
        assert_eq!(
            claims.aud,
            Some(Audience::Multiple(vec!["a".to_string(), "b".to_string()]))
        );
        assert!(claims.aud.unwrap().as_single().is_none());
    }

    #[test]
    fn test_header_field_names() {
        let header: TokenHeader =
            serde_json::from_value(json!({ "alg": "RS256", "kid": "k1", "typ": "JWT" })).unwrap();
        assert_eq!(header.key_id.as_deref(), Some("k1"));
        assert_eq!(header.algorithm, "RS256");
        assert_eq!(header.token_type.as_deref(), Some("JWT"));
    }
}
