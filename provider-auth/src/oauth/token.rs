//! OAuth token types.

use secrecy::{ExposeSecret, SecretString};

/// Access token obtained from the code exchange.
///
/// Never persisted server-side; it is only handed back to the browser.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer credential for provider API requests.
    pub access_token: SecretString,
}

impl AccessToken {
    pub fn new(access_token: SecretString) -> Self {
        Self { access_token }
    }

    pub fn secret(&self) -> &str {
        self.access_token.expose_secret()
    }
}
