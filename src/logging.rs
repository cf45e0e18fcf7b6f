//! Tracing subscriber bootstrap for embedding applications.

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global stderr subscriber.
///
/// The embedding app calls this once at startup; `RUST_LOG` overrides
/// `default_level`. Setting a subscriber twice is a no-op rather than
/// an error, so tests may call this freely.
pub fn init(default_level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
