//! OAuth 2.0 authorization-code flow infrastructure.

mod provider;
mod state;
mod token;

pub mod providers;

pub use provider::{AuthorizationRequest, Provider, ProviderKind, UserInfo};
pub use state::{verify_state, StateToken, STATE_COOKIE_NAME, STATE_TTL_SECONDS};
pub use token::AccessToken;
