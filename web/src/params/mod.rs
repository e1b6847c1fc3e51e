//! This module holds typed parameters for the endpoint inputs.

pub(crate) mod oauth;
