pub mod activity;
pub mod api;
pub mod app;
pub mod auth;
pub mod branches;
pub mod changes;
pub mod cli;
pub mod config;
pub mod drafts;
pub mod error;
pub mod navigation;
pub mod store;

use clap::Parser;

pub use app::TranslationApp;
pub use config::AppConfig;
pub use error::{ApiError, AppError, DraftError, NavigationError, SessionError, StoreError};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default `info` level.
/// Output goes to stderr so it never mixes with command output.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    init_logging();
    let cli = cli::Cli::parse();

    // All core logic is interleaved on one thread; only I/O suspends.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli::execute(cli))
}
