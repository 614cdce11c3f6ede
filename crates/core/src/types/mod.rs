//! Core types for MenuHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use account::{AccountKind, Username, UsernameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::NotificationStatus;
