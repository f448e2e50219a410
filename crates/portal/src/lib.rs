//! School Portal client library.
//!
//! Everything the browser tier does, as a library the CLI (and tests) drive:
//!
//! - [`store`] - Key-value persistence (in-memory with quota, JSON file)
//! - [`session`] - Active admin identity and cached profile/school records
//! - [`api`] - HTTP client for the backend
//! - [`forms`] - Account creation forms with client-side validation
//! - [`dashboard`] - Role-based dashboard routing
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod dashboard;
pub mod forms;
pub mod session;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use session::SessionStore;
pub use store::{FileStore, KeyValueStore, MemoryStore};
