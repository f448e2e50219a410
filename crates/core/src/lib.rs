//! School Portal Core - Shared types library.
//!
//! This crate provides common types used across all School Portal components:
//! - `server` - REST backend
//! - `portal` - Client library (session store, forms, API client)
//! - `cli` - Command-line front end for the portal
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. The field validators live here so the portal forms and the
//! server's payload checks apply the same rules.
//!
//! # Modules
//!
//! - [`types`] - Admin records, school info, roles and emails
//! - [`validation`] - Per-field form validators and error aggregation
//! - [`wire`] - JSON and multipart bodies shared by server and portal

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;
pub mod wire;

pub use types::*;
pub use validation::FieldErrors;
