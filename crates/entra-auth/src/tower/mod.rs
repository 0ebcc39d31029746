//! # Tower Middleware for Client Auth
//!
//! [`ClientAuthLayer`] wraps an HTTP service with [`ClientAuthService`], which
//! authenticates every request before it reaches the inner service.
//!
//! ## Per-request flow
//!
//! ```text
//! Start ─► headers extracted ─► token validated ──► context attached, inner service called
//!                                      │
//!                                      └──────────► 401 "unauthorized"
//! ```
//!
//! A request is rejected when the `X-Teams-Page-Id` or `X-Teams-App-Session-Id`
//! header is missing, when no validator is configured, or when the bearer
//! token fails validation. All of these produce the same response so callers
//! learn nothing about why; the cause is only in the server log.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use entra_auth::tower::ClientAuthLayer;
//!
//! let service = ServiceBuilder::new()
//!     .layer(ClientAuthLayer::new(validator))
//!     .service(my_inner_service);
//! ```
//!
//! ## Request Extensions
//!
//! On success the [`ClientAuthContext`](crate::ClientAuthContext) is inserted
//! into the request's extensions:
//!
//! ```rust,ignore
//! if let Some(ctx) = req.extensions().get::<ClientAuthContext>() {
//!     println!("Page {} for user {:?}", ctx.page_id, ctx.user_id);
//! }
//! ```

mod layer;
mod service;

pub use layer::ClientAuthLayer;
pub use service::{ClientAuthService, ClientAuthServiceFuture};

/// Body of every rejection response
pub const UNAUTHORIZED_BODY: &str = "unauthorized";
