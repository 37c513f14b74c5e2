use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "blogpress=debug,tower_http=debug"
    } else {
        "blogpress=info,tower_http=info"
    }
}

/// Installs the global subscriber
///
/// Human-readable output goes to stdout. With `log_dir`, JSON lines are
/// also written to a daily rolling file there; keep the returned guard
/// alive so buffered lines are flushed on exit.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "blogpress.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging was already initialised: {e}");
    }

    guard
}

/// Installs a subscriber for command line tools
///
/// Events go to stderr so stdout only carries command output. Only warnings
/// and errors are shown unless `RUST_LOG` says otherwise.
pub fn init_cli_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CLI_FILTER));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging was already initialised: {e}");
    }
}

const CLI_FILTER: &str = "blogpress=warn";
