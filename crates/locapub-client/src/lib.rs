pub mod app;
pub mod campaigns;
pub mod config;
pub mod forms;
pub mod home;
pub mod lifetime;
pub mod navigator;
pub mod notice;
pub mod shell;
pub mod supports;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use app::{App, CampaignsTab, SupportsTab};
pub use config::{CacheBackend, ClientConfig};
pub use navigator::{Navigator, OpenOutcome};
pub use notice::{Action, ActionError, FormMessage, Notice, NoticeLevel, NoticeReceiver};
pub use shell::{Shell, Tab};

/// Install the fmt subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("locapub_client=debug,locapub_net=debug,locapub_store=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Configure logging, read [`ClientConfig`] from the environment and build
/// the [`App`].
pub fn start() -> Result<(App, NoticeReceiver), locapub_store::StoreError> {
    init_tracing();
    tracing::info!("Starting Locapub client v{}", env!("CARGO_PKG_VERSION"));

    App::from_config(&ClientConfig::from_env())
}
