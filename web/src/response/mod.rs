pub(crate) mod authorization_page;
