//! Shoplane Core - Shared types library.
//!
//! This crate provides common types used by the Shoplane storefront:
//! validated wrappers for IDs, email addresses, phone numbers, prices,
//! and payment modes.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, phones,
//!   and payment modes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
