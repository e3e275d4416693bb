pub mod audio;
pub mod chat;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod medications;
pub mod models;
pub mod pipeline;
pub mod profile;
pub mod store;
pub mod visualization;

use tracing_subscriber::EnvFilter;

pub fn run() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let backend_config = config::BackendConfig::from_env();
    let state = match core_state::CoreState::from_config(&backend_config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Backend setup failed, falling back to built-in mock");
            core_state::CoreState::with_mock_backend()
        }
    };

    let stdin = std::io::stdin();
    if let Err(e) = commands::run_repl(&state, stdin.lock(), std::io::stdout()) {
        tracing::error!(error = %e, "Terminal session ended with error");
    }

    tracing::info!("{} shutting down", config::APP_NAME);
}
