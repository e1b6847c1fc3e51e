//! OAuth authentication gateway.
//!
//! Re-exports OAuth types from provider-auth and provides provider-specific clients.

pub mod github;

// Re-export OAuth types from provider-auth
pub use provider_auth::oauth::{
    verify_state, AccessToken, AuthorizationRequest, Provider, ProviderKind, StateToken,
    UserInfo, STATE_COOKIE_NAME, STATE_TTL_SECONDS,
};
