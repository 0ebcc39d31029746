//! Unverified decoding of compact-serialized tokens
//!
//! Pure parsing: base64url + JSON. Nothing here is trusted until
//! [`verify_signature`](super::verify_signature) has run.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;

use super::{AccessTokenClaims, DecodedToken, TokenHeader};
use crate::error::DecodeError;

/// Decode `raw` into header, claims and signature without verifying it
///
/// # Errors
///
/// Returns [`DecodeError`] if the token is not three dot-separated segments,
/// a segment is not base64url, the header is not a JSON object with `alg`,
/// or the payload is an object whose registered claims have the wrong type.
/// A payload that is valid JSON but not an object decodes to `payload: None`.
pub fn decode_token(raw: &str) -> Result<DecodedToken, DecodeError> {
    let parts: Vec<&str> = raw.split('.').collect();
    let [header, payload, signature] = parts.as_slice() else {
        return Err(DecodeError::SegmentCount(parts.len()));
    };

    let header_json = decode_segment(header, "header")?;
    let header: TokenHeader =
        serde_json::from_value(header_json).map_err(|e| DecodeError::Header(e.to_string()))?;

    let payload = match decode_segment(payload, "payload")? {
        value @ Value::Object(_) => Some(
            serde_json::from_value::<AccessTokenClaims>(value)
                .map_err(|e| DecodeError::Claims(e.to_string()))?,
        ),
        _ => None,
    };

    Ok(DecodedToken {
        header,
        payload,
        signature: (*signature).to_string(),
    })
}

fn decode_segment(segment: &str, name: &'static str) -> Result<Value, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| DecodeError::Base64 {
            segment: name,
            message: e.to_string(),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| match name {
        "header" => DecodeError::Header(e.to_string()),
        _ => DecodeError::Claims(e.to_string()),
    })
}
