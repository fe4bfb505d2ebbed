use crate::config::LoggingConfig;
use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "folio_api=info,folio_core=info,tower_http=info";

/// Console output plus a daily-rolled JSON file under the configured
/// directory.
pub fn init_logging(config: &LoggingConfig) {
    if let Err(e) = fs::create_dir_all(&config.directory) {
        eprintln!(
            "Could not create log directory {}: {}",
            config.directory.display(),
            e
        );
    }

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| configured_filter(&config.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    // The writer flushes on drop, so the guard lives for the whole process.
    std::mem::forget(guard);
}

/// Directives from config; blank or unparsable falls back to the defaults.
fn configured_filter(directives: &str) -> EnvFilter {
    if directives.trim().is_empty() {
        return EnvFilter::new(DEFAULT_DIRECTIVES);
    }
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid log filter '{directives}': {e}");
        EnvFilter::new(DEFAULT_DIRECTIVES)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter() {
        let filter = configured_filter("folio_api=debug").to_string();
        assert!(filter.contains("folio_api=debug"));

        let fallback = configured_filter("  ").to_string();
        assert!(fallback.contains("folio_core=info"));
        assert!(fallback.contains("tower_http=info"));
    }
}
