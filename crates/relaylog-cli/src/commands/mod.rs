pub mod send;
pub mod show;

use anyhow::Context;
use relaylog_engine::LogManager;
use std::path::Path;
use std::sync::Arc;

/// A manager, configured from `config` when one is given.
fn load_manager(config: Option<&Path>) -> anyhow::Result<Arc<LogManager>> {
    let manager = Arc::new(LogManager::new());
    if let Some(path) = config {
        manager
            .load_configuration_file(path)
            .with_context(|| format!("loading pipeline configuration {}", path.display()))?;
    }
    Ok(manager)
}
