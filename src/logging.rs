//! Diagnostic logging
//!
//! Diagnostics go to stderr through `tracing`; command results stay on
//! stdout. `KUBESUPV_LOG` takes an `EnvFilter` directive and overrides
//! `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "KUBESUPV_LOG";

/// Filter used when `KUBESUPV_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "kubesupv=debug"
    } else {
        "kubesupv=warn"
    }
}

/// Install the global subscriber; later calls are ignored
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
