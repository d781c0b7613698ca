//! Show-config command
//!
//! Usage: relaylog show-config --config FILE [--address A] [--level L] [--sync]

use anyhow::Context;
use clap::Args;
use relaylog_engine::PipelineSnapshot;
use relaylog_service::{PipelineConfigurator, DEFAULT_MIN_LEVEL};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ShowConfigArgs {
    /// Pipeline configuration file (TOML)
    #[arg(long)]
    pub config: PathBuf,

    /// Remote viewer addresses to add on top of the file
    #[arg(long)]
    pub address: Vec<String>,

    /// Minimum level for added viewers
    #[arg(long, default_value = DEFAULT_MIN_LEVEL)]
    pub level: String,

    /// Add viewers without an async wrapper
    #[arg(long)]
    pub sync: bool,
}

/// Execute show-config command
pub fn execute(args: ShowConfigArgs) -> anyhow::Result<()> {
    let manager = super::load_manager(Some(&args.config))?;

    let configurator = PipelineConfigurator::new(Arc::clone(&manager));
    for address in &args.address {
        configurator
            .configure_remote_address(address, &args.level, !args.sync)
            .with_context(|| format!("adding viewer {address}"))?;
    }

    let snapshot = manager.configuration().unwrap_or_default();
    print!("{}", render(&snapshot));
    Ok(())
}

fn render(snapshot: &PipelineSnapshot) -> String {
    let mut out = format!("targets ({}):\n", snapshot.targets.len());
    for target in &snapshot.targets {
        out.push_str(&format!("  {} [{}]\n", target.name, target.sink.kind()));
    }
    out.push_str(&format!("rules ({}):\n", snapshot.rules.len()));
    for rule in &snapshot.rules {
        out.push_str(&format!(
            "  {} >= {} -> {}{}\n",
            rule.logger_pattern,
            rule.min_level,
            rule.targets.join(", "),
            if rule.is_final { " (final)" } else { "" }
        ));
    }
    out
}
