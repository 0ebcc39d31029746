//! # Entra Auth - Bearer Token Validation for Teams Devtools Backends
//!
//! Validates access tokens issued by Entra ID (Azure AD) and authenticates
//! client requests carrying Teams routing headers.
//!
//! ## Key Features
//!
//! - **JWKS key resolution** - tenant-scoped signing keys, cached, 30 s timeout
//! - **Signature verification** - asymmetric algorithms only (RS*, PS*, ES*)
//! - **Claims policy** - time window, audience, issuer tenant (with
//!   multi-tenant allow-lists) and optional required scope
//! - **Tower middleware** - `401 unauthorized` or a per-request
//!   [`ClientAuthContext`] in the request extensions
//!
//! ## Architecture
//!
//! - [`config`] - [`ValidatorConfig`] policy and loadable [`AuthSettings`]
//! - [`jwt`] - decode, JWKS, verify and claims stages
//! - [`validator`] - [`EntraTokenValidator`], the pipeline entry point
//! - [`context`] - [`ClientAuthContext`] and header extraction
//! - [`tower`] - [`ClientAuthLayer`](crate::tower::ClientAuthLayer) middleware
//! - [`logger`] - request logger abstraction ([`AuthLogger`])
//! - [`error`] - per-stage error types
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use entra_auth::{EntraTokenValidator, TracingLogger, ValidatorConfig};
//!
//! # tokio_test::block_on(async {
//! let config = ValidatorConfig::new("common", "my-client-id", Some(vec!["contoso-tenant".into()]));
//! let validator = EntraTokenValidator::new(config)?;
//!
//! let raw = "eyJ0eXAiOiJKV1QiLCJhbGc...";
//! match validator.validate_access_token(&TracingLogger, raw, Some("access_as_user")).await {
//!     Some(token) => println!("authenticated: {:?}", token.claims().and_then(|c| c.oid.as_deref())),
//!     None => println!("rejected"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```
//!
//! ## Feature Flags
//!
//! - `middleware` (default) - Tower middleware support
//! - `tower` - alias for `middleware`

// Submodules
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod jwt;
pub mod logger;
#[cfg(feature = "middleware")]
pub mod tower;
pub mod validator;

#[doc(inline)]
pub use clock::{Clock, FixedClock, SystemClock};

#[doc(inline)]
pub use config::{AuthSettings, ValidatorConfig, is_multi_tenant};

#[doc(inline)]
pub use context::{ClientAuthContext, ClientRequestHeaders};

#[doc(inline)]
pub use error::{AuthError, ClaimsError, ConfigError, DecodeError, KeySourceError, SignatureError};

#[doc(inline)]
pub use jwt::{AccessTokenClaims, Audience, ClaimsOutcome, DecodedToken, TokenHeader};

#[doc(inline)]
pub use logger::{AuthLogger, LogEvent, TracingLogger};

#[doc(inline)]
pub use validator::EntraTokenValidator;
