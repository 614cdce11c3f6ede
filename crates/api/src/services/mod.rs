//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password hashing, bearer tokens, account registration and login
//! - `notifications` - Fan-out of shop announcements to followers
//! - `uploads` - Validated image storage on the local filesystem

pub mod auth;
pub mod notifications;
pub mod uploads;
