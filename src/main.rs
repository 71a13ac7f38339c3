//! Pillbox entrypoint: open the medication store, start the local
//! server, wait for Ctrl-C.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use pillbox_lib::api::start_server;
use pillbox_lib::config;
use pillbox_lib::core_state::CoreState;
use pillbox_lib::scan::OllamaVisionRecognizer;
use pillbox_lib::store::MedicationStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Pillbox starting v{}", config::APP_VERSION);

    let store = match MedicationStore::open(config::store_path()) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Cannot open medication store: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        source = ?store.load_source(),
        count = store.list().len(),
        "Medication store ready"
    );

    let recognizer = Arc::new(OllamaVisionRecognizer::default_local());
    let core = Arc::new(CoreState::new(store, recognizer));

    let mut server = match start_server(core, config::DEFAULT_PORT).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Cannot start server: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Open {} in your browser", server.url());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
}
