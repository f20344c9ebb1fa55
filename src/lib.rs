use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod config;
pub mod conversation;
pub mod download;
pub mod error;
pub mod events;
pub mod history;
pub mod models;
pub mod pipeline;
pub mod tracker;
pub mod util;

#[cfg(feature = "desktop")]
mod commands;

pub use error::{ModcraftError, Result};
pub use pipeline::{Outcome, Session};

static INIT_TRACING: Once = Once::new();

/// Install the global tracing subscriber. Filter comes from `MODCRAFT_LOG`,
/// defaulting to `info` with noisy HTTP crates turned down.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("MODCRAFT_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::Arc;

    init_tracing();

    let config = config::load();
    let service = match api::HttpModService::new(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, "cannot build HTTP client");
            return;
        }
    };
    let session = match Session::new(config, Arc::new(service)) {
        Ok(session) => Arc::new(session),
        Err(e) => {
            tracing::error!(error = %e, "cannot build HTTP client");
            return;
        }
    };

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(commands::SessionState(session))
        .invoke_handler(tauri::generate_handler![
            commands::chat::send_message,
            commands::chat::get_conversation,
            commands::chat::is_generating,
            commands::mods::list_mods,
            commands::mods::refresh_mods,
            commands::mods::resume_compile,
            commands::mods::download_mod,
            commands::config::load_config,
            commands::config::save_config,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!(error = %e, "failed to run ModCraft");
    }
}
