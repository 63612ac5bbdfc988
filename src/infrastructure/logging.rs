//! Tracing subscriber setup

use tracing_subscriber::{
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};
use crate::domain::DomainError;

/// Dependency targets capped at info unless `RUST_LOG` says otherwise
const QUIET_TARGETS: &[&str] = &["hyper=info", "h2=info", "reqwest=info", "redis=info"];

/// Installs the global subscriber
///
/// `RUST_LOG` replaces the configured level entirely when set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), DomainError> {
    let filter = build_filter(&config.level, std::env::var("RUST_LOG").ok());

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
    };

    result.map_err(|e| DomainError::internal(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!(level = %config.level, "Logging initialized");
    Ok(())
}

fn build_filter(level: &str, env_override: Option<String>) -> EnvFilter {
    if let Some(directives) = env_override.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::new(directives);
    }

    let mut filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    for target in QUIET_TARGETS {
        if let Ok(directive) = target.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    filter
}
