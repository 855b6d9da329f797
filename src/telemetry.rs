//! Structured logging bootstrap.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Result, error::AppError};

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins over `level` when set. Fails if a global subscriber is
/// already installed.
pub fn init_logging(level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| AppError::InternalServerError(format!("failed to initialize logging: {e}")))
}
