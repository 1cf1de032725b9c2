//! Logger initialisation for the command-line adapter.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `verbose` lowers the default filter from info to debug. `RUST_LOG` still
/// overrides either default.
pub(crate) fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    // Only fails when a logger is already installed.
    let _ = builder.try_init();
}
