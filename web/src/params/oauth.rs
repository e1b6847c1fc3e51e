use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters the provider appends when redirecting back to the callback.
///
/// Both are optional here so that their absence is reported with the OAuth error
/// messages instead of a generic query rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CallbackParams {
    /// Authorization code issued by the provider
    pub code: Option<String>,
    /// State token echoed back by the provider
    pub state: Option<String>,
}
