use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;

/// Default GitHub endpoints used when the provider URLs are not overridden.
pub const DEFAULT_PROVIDER_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const DEFAULT_PROVIDER_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const DEFAULT_PROVIDER_API_BASE_URL: &str = "https://api.github.com";

/// Repository path of the login audit document.
pub const DEFAULT_AUDIT_FILE_PATH: &str = "data/user-logins.json";

/// Path the provider redirects back to, appended to the site URL.
pub const CALLBACK_PATH: &str = "/api/callback";

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The OAuth app client ID registered with the provider.
    #[arg(long, env)]
    provider_client_id: Option<String>,

    /// The OAuth app client secret registered with the provider.
    #[arg(long, env, hide_env_values = true)]
    provider_client_secret: Option<String>,

    /// Public URL of the site, used to build the OAuth redirect URI
    /// (e.g. https://devnotes.example.com).
    #[arg(long, env)]
    site_url: Option<String>,

    /// The OAuth scope requested from the provider.
    #[arg(long, env, default_value = "repo")]
    oauth_scope: String,

    /// The provider's authorization endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_PROVIDER_AUTHORIZE_URL)]
    provider_authorize_url: String,

    /// The provider's token exchange endpoint.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_PROVIDER_TOKEN_URL)]
    provider_token_url: String,

    /// The base URL of the provider REST API (user profile and repository contents).
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_PROVIDER_API_BASE_URL)]
    provider_api_base_url: String,

    /// Owner of the repository holding the login audit document.
    #[arg(long, env)]
    repo_owner: Option<String>,

    /// Name of the repository holding the login audit document.
    #[arg(long, env)]
    repo_name: Option<String>,

    /// Token used to read and write the login audit document.
    #[arg(long, env, hide_env_values = true)]
    repo_access_token: Option<String>,

    /// Path of the login audit document inside the repository.
    #[arg(long, env, default_value = DEFAULT_AUDIT_FILE_PATH)]
    audit_file_path: String,

    /// Number of attempts for the conditional write of the audit document.
    /// A value of 1 never retries after a concurrent modification.
    #[arg(long, env, default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=10))]
    pub audit_write_attempts: u32,

    /// Timeout in seconds applied to every outbound HTTP call
    #[arg(long, env, default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..))]
    pub http_timeout_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Parse from an explicit argument list instead of the process arguments.
    /// The first item is the binary name. Environment variables still apply.
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Config::try_parse_from(args)
    }

    pub fn provider_client_id(&self) -> Option<String> {
        self.provider_client_id.clone().filter(|id| !id.is_empty())
    }

    pub fn provider_client_secret(&self) -> Option<SecretString> {
        self.provider_client_secret
            .clone()
            .filter(|secret| !secret.is_empty())
            .map(SecretString::new)
    }

    pub fn site_url(&self) -> Option<String> {
        self.site_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// Returns the URL the provider redirects back to after consent.
    pub fn redirect_uri(&self) -> Option<String> {
        self.site_url().map(|url| format!("{url}{CALLBACK_PATH}"))
    }

    pub fn oauth_scope(&self) -> &str {
        &self.oauth_scope
    }

    pub fn provider_authorize_url(&self) -> &str {
        &self.provider_authorize_url
    }

    pub fn provider_token_url(&self) -> &str {
        &self.provider_token_url
    }

    pub fn provider_api_base_url(&self) -> &str {
        self.provider_api_base_url.trim_end_matches('/')
    }

    pub fn repo_owner(&self) -> Option<String> {
        self.repo_owner.clone().filter(|owner| !owner.is_empty())
    }

    pub fn repo_name(&self) -> Option<String> {
        self.repo_name.clone().filter(|name| !name.is_empty())
    }

    pub fn repo_access_token(&self) -> Option<SecretString> {
        self.repo_access_token
            .clone()
            .filter(|token| !token.is_empty())
            .map(SecretString::new)
    }

    pub fn audit_file_path(&self) -> &str {
        self.audit_file_path.trim_start_matches('/')
    }

    pub fn http_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http_timeout_secs)
    }
}
