//! # provider-auth
//!
//! OAuth 2.0 building blocks for signing writers in with a source-control provider:
//! - CSRF state tokens for the authorization redirect
//! - The `Provider` trait and its GitHub implementation (authorize URL, code exchange,
//!   user profile)
//! - HTTP client building with a per-request timeout and user agent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use provider_auth::{
//!     http::HttpClientBuilder,
//!     oauth::{providers::github, Provider, StateToken},
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
