//! JWKS (JSON Web Key Set) fetching and caching
//!
//! Entra publishes its signing keys per tenant at
//! `https://login.microsoftonline.com/{tenant}/discovery/v2.0/keys`.
//! [`JwksClient`] fetches that document, keeps it in memory for a fixed TTL
//! and hands out [`DecodingKey`]s by key id.
//!
//! - **Timeout**: every fetch is bounded by 30 seconds
//! - **Caching**: the whole key set is cached (default 10 minutes)
//! - **Unknown kid**: a cached set that lacks the kid is refetched once; a
//!   set fetched by the same lookup is not
//! - **No rate limiting**: every cache miss goes to the network

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::{Jwk, JwkSet, PublicKeyUse};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_JWKS_CACHE_TTL;
use crate::error::KeySourceError;

/// Connect + response timeout for JWKS requests
pub const JWKS_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves signing keys by key identifier
///
/// `Ok(None)` means the key set lists the kid but the entry carries no usable
/// verification material. Every other failure is an error.
#[async_trait]
pub trait KeySource: Send + Sync + std::fmt::Debug {
    /// Resolve the public key published under `key_id`
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError`] if the key set cannot be fetched or does not
    /// contain `key_id`.
    async fn resolve_public_key(&self, key_id: &str)
    -> Result<Option<DecodingKey>, KeySourceError>;
}

/// JWKS cache entry with metadata
#[derive(Debug, Clone)]
struct CachedJwks {
    /// The JWK set
    jwks: JwkSet,
    /// When this was cached
    cached_at: SystemTime,
    /// TTL for this cache entry
    ttl: Duration,
}

impl CachedJwks {
    /// Check if this cache entry is still valid
    fn is_valid(&self) -> bool {
        match SystemTime::now().duration_since(self.cached_at) {
            Ok(age) => age < self.ttl,
            Err(_) => false, // Clock went backwards, invalidate
        }
    }
}

/// JWKS client for fetching and caching a JSON Web Key Set
///
/// # Example
///
/// ```rust,no_run
/// # use entra_auth::jwt::{JwksClient, KeySource};
/// # tokio_test::block_on(async {
/// let client = JwksClient::new(
///     "https://login.microsoftonline.com/common/discovery/v2.0/keys".to_string(),
/// )?;
///
/// if let Some(key) = client.resolve_public_key("key-id-123").await? {
///     // verify a signature with `key`
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct JwksClient {
    /// JWKS endpoint URL
    jwks_uri: String,
    /// Cached JWKS
    cache: Arc<RwLock<Option<CachedJwks>>>,
    /// HTTP client
    http_client: reqwest::Client,
    /// Cache TTL (default: 10 minutes)
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a JWKS client with the default 10 minute cache TTL
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError::Client`] if the HTTP client cannot be built.
    pub fn new(jwks_uri: String) -> Result<Self, KeySourceError> {
        Self::with_ttl(jwks_uri, DEFAULT_JWKS_CACHE_TTL)
    }

    /// Create a JWKS client with a custom cache TTL
    ///
    /// # Errors
    ///
    /// Returns [`KeySourceError::Client`] if the HTTP client cannot be built.
    pub fn with_ttl(jwks_uri: String, cache_ttl: Duration) -> Result<Self, KeySourceError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(JWKS_REQUEST_TIMEOUT)
            .timeout(JWKS_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| KeySourceError::Client(e.to_string()))?;

        Ok(Self::with_http_client(jwks_uri, cache_ttl, http_client))
    }

    /// Create a JWKS client around an existing HTTP client
    ///
    /// The caller is responsible for the client's timeouts.
    pub fn with_http_client(
        jwks_uri: String,
        cache_ttl: Duration,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            jwks_uri,
            cache: Arc::new(RwLock::new(None)),
            http_client,
            cache_ttl,
        }
    }

    /// Get JWKS (from cache or fetch if needed)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - JWKS endpoint is insecure or unreachable
    /// - Response is not valid JWKS JSON
    /// - Network timeout (30 seconds)
    pub async fn get_jwks(&self) -> Result<JwkSet, KeySourceError> {
        self.cached_or_fetched().await.map(|(jwks, _)| jwks)
    }

    /// The key set, and whether it was fetched by this call
    async fn cached_or_fetched(&self) -> Result<(JwkSet, bool), KeySourceError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.is_valid()
            {
                debug!(jwks_uri = %self.jwks_uri, "Using cached JWKS");
                return Ok((cached.jwks.clone(), false));
            }
        }

        Ok((self.fetch_and_cache().await?, true))
    }

    /// Fetch JWKS from endpoint and update cache
    async fn fetch_and_cache(&self) -> Result<JwkSet, KeySourceError> {
        info!(jwks_uri = %self.jwks_uri, "Fetching JWKS from endpoint");

        if !is_secure_endpoint(&self.jwks_uri) {
            return Err(KeySourceError::InsecureEndpoint(self.jwks_uri.clone()));
        }

        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| {
                error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to fetch JWKS");
                KeySourceError::Fetch(e.to_string())
            })?;

        if !response.status().is_success() {
            error!(
                jwks_uri = %self.jwks_uri,
                status = %response.status(),
                "JWKS endpoint returned error status"
            );
            return Err(KeySourceError::Status(response.status().as_u16()));
        }

        let jwks: JwkSet = response.json().await.map_err(|e| {
            error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to parse JWKS JSON");
            KeySourceError::InvalidJwks(e.to_string())
        })?;

        info!(
            jwks_uri = %self.jwks_uri,
            key_count = jwks.keys.len(),
            "Successfully fetched JWKS"
        );

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedJwks {
                jwks: jwks.clone(),
                cached_at: SystemTime::now(),
                ttl: self.cache_ttl,
            });
        }

        Ok(jwks)
    }

    /// Get the JWKS endpoint URI
    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    /// Get the cache TTL
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Clear the cache (for testing or manual refresh)
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        debug!(jwks_uri = %self.jwks_uri, "JWKS cache cleared");
    }
}

#[async_trait]
impl KeySource for JwksClient {
    async fn resolve_public_key(
        &self,
        key_id: &str,
    ) -> Result<Option<DecodingKey>, KeySourceError> {
        let (jwks, fetched) = self.cached_or_fetched().await?;
        let jwks = if fetched || jwks.find(key_id).is_some() {
            jwks
        } else {
            // Keys rotate; a cached set may predate the token's kid
            debug!(jwks_uri = %self.jwks_uri, key_id, "Key ID not cached, refetching JWKS");
            self.fetch_and_cache().await?
        };

        let jwk = jwks.find(key_id).ok_or_else(|| {
            warn!(key_id, "Key ID not found in JWKS");
            KeySourceError::KeyNotFound(key_id.to_string())
        })?;

        Ok(signing_key(jwk))
    }
}

/// Verification key for a JWK, if it is usable for signatures
fn signing_key(jwk: &Jwk) -> Option<DecodingKey> {
    if matches!(
        jwk.common.public_key_use,
        Some(ref key_use) if *key_use != PublicKeyUse::Signature
    ) {
        warn!(key_id = ?jwk.common.key_id, "JWK is not a signing key");
        return None;
    }

    match DecodingKey::from_jwk(jwk) {
        Ok(key) => Some(key),
        Err(e) => {
            warn!(key_id = ?jwk.common.key_id, error = %e, "JWK has no usable key material");
            None
        }
    }
}

/// HTTPS, or plain HTTP to a loopback host
fn is_secure_endpoint(uri: &str) -> bool {
    let Ok(url) = url::Url::parse(uri) else {
        return false;
    };

    match url.scheme() {
        "https" => true,
        "http" => matches!(
            url.host_str(),
            Some("localhost") | Some("127.0.0.1") | Some("[::1]")
        ),
        _ => false,
    }
}
