//! Tower Layer implementation for client auth

use std::fmt;
use std::sync::Arc;
use tower::Layer;

use crate::logger::{AuthLogger, TracingLogger};
use crate::validator::EntraTokenValidator;

use super::service::ClientAuthService;

/// Tower Layer that authenticates client requests
///
/// This layer wraps inner services with [`ClientAuthService`].
///
/// # Example
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use entra_auth::tower::ClientAuthLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(ClientAuthLayer::new(validator))
///     .service(my_inner_service);
/// ```
#[derive(Clone)]
pub struct ClientAuthLayer {
    /// Token validator; without one every request is rejected
    validator: Option<Arc<EntraTokenValidator>>,
    /// Logger handed to the validator
    logger: Arc<dyn AuthLogger>,
}

impl fmt::Debug for ClientAuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAuthLayer")
            .field("validator", &self.validator)
            .field("logger", &"<dyn AuthLogger>")
            .finish()
    }
}

impl ClientAuthLayer {
    /// Create a layer that validates with `validator` and logs through `tracing`
    pub fn new(validator: EntraTokenValidator) -> Self {
        Self::from_arc(Arc::new(validator))
    }

    /// Create a layer from an Arc'd validator
    pub fn from_arc(validator: Arc<EntraTokenValidator>) -> Self {
        Self {
            validator: Some(validator),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Create a layer without a validator
    ///
    /// Every request is answered with 401; useful when auth settings are
    /// absent and the endpoint must stay closed.
    pub fn unconfigured() -> Self {
        Self {
            validator: None,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Log through `logger` instead of `tracing`
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn AuthLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Whether a validator is configured
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }
}

impl<S> Layer<S> for ClientAuthLayer {
    type Service = ClientAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ClientAuthService::new(inner, self.validator.clone(), Arc::clone(&self.logger))
    }
}
