//! HTTP client building with middleware.

mod client;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
