pub(crate) mod oauth_state_cookie;
