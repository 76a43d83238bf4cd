//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honour `RUST_LOG`, falling back to the configured log level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Build the filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!("marketplace_tx={level},marketplace_cli={level}", level = config.log_level)
}

/// Install the global tracing subscriber.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(config).into());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_uses_level() {
        let config = ObservabilityConfig {
            log_level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(
            default_filter(&config),
            "marketplace_tx=debug,marketplace_cli=debug"
        );
    }
}
