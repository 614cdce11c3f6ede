//! MenuHub Core - Shared domain types.
//!
//! This crate provides the types shared by every MenuHub component:
//! - `api` - The HTTP JSON backend
//! - `cli` - Operator tooling (table creation, seeding, debug tokens)
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Database encoding is opt-in through the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, validated account fields, prices, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
