//! Domain logic for the OAuth login handlers.
//!
//! `oauth_login` drives the authorize/callback flow against the provider and
//! `login_audit` keeps the per-user login document in the site repository current.
//! Both talk to GitHub through the clients under `gateway`.

pub mod content_store;
pub mod error;
pub mod gateway;
pub mod login_audit;
pub mod oauth_login;
