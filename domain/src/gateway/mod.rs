//! Clients for external services the domain layer talks to.

pub mod github_contents;
pub mod oauth;
