//! Tower Service implementation for client auth
//!
//! Works with any `http::Request<B>` based stack (Axum, Tower-HTTP, hyper).
//! The rejection is an ordinary `401` response, so the service keeps the
//! inner service's error type; the response body only has to be
//! constructible from a `&'static str`.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Request, Response, StatusCode};
use tower_service::Service;

use crate::context::ClientRequestHeaders;
use crate::logger::{AuthLogger, LogEvent};
use crate::validator::EntraTokenValidator;

use super::UNAUTHORIZED_BODY;

/// Tower Service that authenticates client requests
///
/// Extracts the Teams routing headers and bearer token, validates the token,
/// and either inserts a [`ClientAuthContext`](crate::ClientAuthContext) into
/// the request's extensions and calls the inner service, or answers `401`.
#[derive(Clone)]
pub struct ClientAuthService<S> {
    inner: S,
    validator: Option<Arc<EntraTokenValidator>>,
    logger: Arc<dyn AuthLogger>,
}

impl<S: fmt::Debug> fmt::Debug for ClientAuthService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientAuthService")
            .field("inner", &self.inner)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl<S> ClientAuthService<S> {
    /// Create a new client auth service
    pub fn new(
        inner: S,
        validator: Option<Arc<EntraTokenValidator>>,
        logger: Arc<dyn AuthLogger>,
    ) -> Self {
        Self {
            inner,
            validator,
            logger,
        }
    }

    /// Get a reference to the inner service
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Get a mutable reference to the inner service
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

/// Future type for client auth service responses
pub type ClientAuthServiceFuture<T, E> = BoxFuture<'static, Result<T, E>>;

impl<S, B, ResBody> Service<Request<B>> for ClientAuthService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: From<&'static str> + Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ClientAuthServiceFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        // The ready inner service moves into the future; a fresh clone stays behind
        let inner = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, inner);
        let validator = self.validator.clone();
        let logger = Arc::clone(&self.logger);

        Box::pin(async move {
            let headers = ClientRequestHeaders::from_header_map(req.headers());
            let token = headers.bearer_token().to_string();

            let validated = match validator {
                Some(validator) => {
                    validator
                        .validate_access_token(logger.as_ref(), &token, None)
                        .await
                }
                None => None,
            };

            let Some(context) = validated.and_then(|decoded| headers.into_context(token, &decoded))
            else {
                logger.debug(LogEvent::Message(UNAUTHORIZED_BODY));
                return Ok(unauthorized());
            };

            req.extensions_mut().insert(context);
            inner.call(req).await
        })
    }
}

fn unauthorized<ResBody: From<&'static str>>() -> Response<ResBody> {
    let mut response = Response::new(ResBody::from(UNAUTHORIZED_BODY));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
