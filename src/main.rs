use log::*;
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
    }

    info!(
        "Starting up devnotes_oauth {} (log level {})",
        env!("CARGO_PKG_VERSION"),
        config.log_level_filter
    );
    if config.provider_client_id().is_none() {
        warn!("PROVIDER_CLIENT_ID is not set, /api/auth will answer with 500");
    }
    if config.repo_owner().is_none() || config.repo_name().is_none() {
        info!("Audit repository not configured, logins will not be recorded");
    }

    let app_state = AppState::new(config);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server exited with an error: {e}");
        std::process::exit(1);
    }
}
