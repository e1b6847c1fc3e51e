//! Provider-specific OAuth implementations.

pub mod github;
