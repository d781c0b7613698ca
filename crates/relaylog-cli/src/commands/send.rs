//! Send command
//!
//! Usage: relaylog send [--name N] [--address A] [--level L] [--sync]
//!        [--config FILE] [--options FILE] [--console] [--severity S] MESSAGE...

use anyhow::Context;
use clap::Args;
use relaylog_core::{LogLevel, LoggingService};
use relaylog_engine::{ConsoleSink, LogManager};
use relaylog_service::{EngineLoggingService, PipelineConfigurator, ServiceOptions};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Logger name (resolved from the caller when omitted)
    #[arg(long)]
    pub name: Option<String>,

    /// Remote viewer address, e.g. udp://127.0.0.1:9999
    #[arg(long)]
    pub address: Option<String>,

    /// Minimum level for the sinks this command adds [default: debug]
    #[arg(long)]
    pub level: Option<String>,

    /// Deliver on the calling thread instead of through an async wrapper
    #[arg(long)]
    pub sync: bool,

    /// Pipeline configuration file (TOML) to start from
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Service options file (TOML); flags override its values
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Also write to stdout
    #[arg(long)]
    pub console: bool,

    /// Level the messages are logged at
    #[arg(long, default_value = "info")]
    pub severity: String,

    /// Messages to send, one record each
    #[arg(required = true)]
    pub messages: Vec<String>,
}

/// Execute send command
pub fn execute(args: SendArgs) -> anyhow::Result<()> {
    let severity: LogLevel = args
        .severity
        .parse()
        .with_context(|| format!("--severity {}", args.severity))?;

    let options = merge_options(&args)?;
    let manager = super::load_manager(args.config.as_deref())?;

    if args.console {
        PipelineConfigurator::new(Arc::clone(&manager))
            .configure_sink(
                Some("console"),
                Arc::new(ConsoleSink::default()),
                &options.min_level,
                options.is_async,
            )
            .context("adding console sink")?;
    }

    let service = EngineLoggingService::from_options(Arc::clone(&manager), &options)
        .context("configuring logging service")?;

    for message in &args.messages {
        service.log(severity, format_args!("{message}"));
    }
    flush(&manager)?;

    eprintln!(
        "Sent {} message(s) as '{}' at {}",
        args.messages.len(),
        service.resolved_name(),
        severity
    );
    Ok(())
}

fn merge_options(args: &SendArgs) -> anyhow::Result<ServiceOptions> {
    let mut options = match &args.options {
        Some(path) => ServiceOptions::from_path(path)
            .with_context(|| format!("reading service options {}", path.display()))?,
        None => ServiceOptions::default(),
    };
    if let Some(name) = &args.name {
        options.name = Some(name.clone());
    }
    if let Some(address) = &args.address {
        options.address = Some(address.clone());
    }
    if let Some(level) = &args.level {
        options.min_level = level.clone();
    }
    if args.sync {
        options.is_async = false;
    }
    Ok(options)
}

fn flush(manager: &LogManager) -> anyhow::Result<()> {
    manager.flush().context("flushing sinks")
}
