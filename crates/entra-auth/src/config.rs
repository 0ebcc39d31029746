//! Validator configuration
//!
//! [`ValidatorConfig`] is the immutable policy input of the validator.
//! [`AuthSettings`] is its serializable counterpart, loaded from a settings
//! file and/or `ENTRA_*` environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Authority host that issues Entra ID tokens
pub const AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tenant values meaning "any directory"
pub const MULTI_TENANT_SENTINELS: [&str; 3] = ["common", "organizations", "consumers"];

/// Default JWKS cache time-to-live (10 minutes)
pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(600);

/// Whether `tenant_id` is one of the multi-tenant sentinels
pub fn is_multi_tenant(tenant_id: &str) -> bool {
    MULTI_TENANT_SENTINELS.contains(&tenant_id)
}

/// JWKS discovery endpoint for a tenant
pub fn jwks_uri_for_tenant(tenant_id: &str) -> String {
    format!("{AUTHORITY_HOST}/{tenant_id}/discovery/v2.0/keys")
}

/// Immutable validation policy for one validator instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    tenant_id: String,
    client_id: String,
    allowed_issuer_tenant_ids: Vec<String>,
    key_source_uri: String,
}

impl ValidatorConfig {
    /// Build a config for `tenant_id` / `client_id`
    ///
    /// `allowed_tenant_ids` is only honoured for multi-tenant sentinels
    /// (`common`, `organizations`, `consumers`), where an empty or absent list
    /// trusts every tenant. A concrete tenant always trusts exactly itself.
    ///
    /// # Example
    ///
    /// ```rust
    /// use entra_auth::ValidatorConfig;
    ///
    /// let config = ValidatorConfig::new("contoso-tenant", "my-app", Some(vec!["other".into()]));
    /// assert_eq!(config.allowed_issuer_tenant_ids(), ["contoso-tenant"]);
    ///
    /// let config = ValidatorConfig::new("common", "my-app", None);
    /// assert!(config.allowed_issuer_tenant_ids().is_empty());
    /// ```
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        allowed_tenant_ids: Option<Vec<String>>,
    ) -> Self {
        let tenant_id = tenant_id.into();
        let allowed_issuer_tenant_ids = if is_multi_tenant(&tenant_id) {
            allowed_tenant_ids.unwrap_or_default()
        } else {
            vec![tenant_id.clone()]
        };
        let key_source_uri = jwks_uri_for_tenant(&tenant_id);

        Self {
            tenant_id,
            client_id: client_id.into(),
            allowed_issuer_tenant_ids,
            key_source_uri,
        }
    }

    /// Directory tenant id or multi-tenant sentinel
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Application id expected as audience
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Tenants whose issuers are trusted; empty means any tenant
    pub fn allowed_issuer_tenant_ids(&self) -> &[String] {
        &self.allowed_issuer_tenant_ids
    }

    /// JWKS endpoint derived from the tenant
    pub fn key_source_uri(&self) -> &str {
        &self.key_source_uri
    }

    /// Whether the configured tenant is a multi-tenant sentinel
    pub fn is_multi_tenant(&self) -> bool {
        is_multi_tenant(&self.tenant_id)
    }
}

fn default_jwks_cache_ttl_secs() -> u64 {
    DEFAULT_JWKS_CACHE_TTL.as_secs()
}

/// Deserializable auth settings
///
/// Environment variables use the `ENTRA_` prefix, e.g. `ENTRA_TENANT_ID`,
/// `ENTRA_CLIENT_ID`, `ENTRA_ALLOWED_TENANT_IDS` (comma separated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Directory tenant id or multi-tenant sentinel
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Allow-list for multi-tenant sentinels
    #[serde(default)]
    pub allowed_tenant_ids: Option<Vec<String>>,
    /// JWKS cache time-to-live in seconds
    #[serde(default = "default_jwks_cache_ttl_secs")]
    pub jwks_cache_ttl_secs: u64,
}

impl AuthSettings {
    /// Environment variable prefix
    pub const ENV_PREFIX: &'static str = "ENTRA";

    /// Load settings from `ENTRA_*` environment variables only
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if required values are missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load settings from a file (TOML, YAML, or JSON), with `ENTRA_*`
    /// environment variables overriding file values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file doesn't exist
    /// - The file format is unsupported
    /// - The file contains invalid settings
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        use config::{Config, File, FileFormat};

        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => FileFormat::Toml,
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            _ => return Err(ConfigError::UnsupportedFormat),
        };

        let config = Config::builder()
            .add_source(File::new(
                path.to_str().ok_or(ConfigError::UnsupportedFormat)?,
                format,
            ))
            .add_source(Self::environment())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(Self::ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("allowed_tenant_ids")
    }

    /// Validation policy derived from these settings
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig::new(
            self.tenant_id.clone(),
            self.client_id.clone(),
            self.allowed_tenant_ids.clone(),
        )
    }

    /// JWKS cache time-to-live
    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_secs)
    }
}
