//! HTTP middleware and request extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Path normalization (trailing slash)
//! 2. Sentry layers (hub per request, transaction)
//! 3. `TraceLayer` (request span with `request_id` field)
//! 4. Request ID (fills the span field, echoes `x-request-id`)
//! 5. Rate limiting on login/registration routes (governor)
//!
//! Bearer authentication is not a layer; handlers opt in through the
//! extractors in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{RequireAccount, RequireShopUser, RequireUser, ensure_same_shop, ensure_same_user};
pub use rate_limit::{RateLimiterLayer, auth_rate_limiter};
pub use request_id::request_id_middleware;
