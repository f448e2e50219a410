//! Core types for School Portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod admin;
pub mod email;
pub mod role;
pub mod school;

pub use admin::{AdminPatch, AdminRecord};
pub use email::{Email, EmailError};
pub use role::{Role, RoleParseError};
pub use school::SchoolInfo;
