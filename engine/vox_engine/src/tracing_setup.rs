//! Process-wide tracing subscriber.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use vox_object::{VoxError, VoxResult};

use crate::config::EngineConfig;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for the engine.
///
/// Directives come from `config.log_filter`, else `RUST_LOG`. With neither
/// set this does nothing. Safe to call multiple times; only the first
/// successful call installs a subscriber. Enable with e.g.
/// `VOX_LOG=vox_hrg=debug` or `VOX_LOG=trace VOX_LOG_TREE=1`.
pub fn init_tracing(config: &EngineConfig) -> VoxResult<()> {
    let directives = config
        .log_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|d| !d.trim().is_empty());
    let Some(directives) = directives else {
        return Ok(());
    };
    let filter = EnvFilter::try_new(&directives).map_err(|e| {
        VoxError::argument(format!("invalid log filter '{directives}': {e}"))
    })?;

    let tree = config.log_tree;
    TRACING_INIT.call_once(move || {
        use tracing_subscriber::{fmt, prelude::*};

        let lines = (!tree).then(|| fmt::layer().with_target(true).with_level(true));
        let hierarchy = tree.then(|| tracing_tree::HierarchicalLayer::new(2).with_targets(true));

        // The host may already have installed a global subscriber.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(lines)
            .with(hierarchy)
            .try_init();
    });
    Ok(())
}
