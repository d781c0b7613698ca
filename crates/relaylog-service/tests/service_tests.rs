#![allow(clippy::unwrap_used, clippy::expect_used)]

use relaylog_core::{
    log_debug, log_error, CallerNameResolver, LogLevel, LoggingService, NullLoggingService,
};
use relaylog_engine::{LogManager, MemorySink, Severity};
use relaylog_service::{
    EngineLoggingService, PipelineConfigurator, ServiceOptions, SERVICE_FRAMES_TO_SKIP,
};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn with_memory(min_level: &str) -> (Arc<LogManager>, Arc<MemorySink>) {
    let manager = Arc::new(LogManager::new());
    let memory = Arc::new(MemorySink::default());
    PipelineConfigurator::new(Arc::clone(&manager))
        .configure_sink(Some("mem"), memory.clone(), min_level, false)
        .unwrap();
    (manager, memory)
}

#[derive(Debug)]
struct PaymentDeclined;

impl fmt::Display for PaymentDeclined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("card declined")
    }
}

impl std::error::Error for PaymentDeclined {}

// ===== END TO END =====

#[test]
fn test_named_logger_with_remote_address() {
    let manager = Arc::new(LogManager::new());
    let logger = EngineLoggingService::new(Arc::clone(&manager), Some("blah"));
    assert_eq!(logger.name(), Some("blah"));
    assert!(!manager.has_configuration());

    PipelineConfigurator::new(Arc::clone(&manager))
        .configure_remote_address("udp://1.2.3.4:9999", "debug", true)
        .unwrap();

    let snapshot = manager.configuration().unwrap();
    assert_eq!(snapshot.targets.len(), 2);
    assert_eq!(snapshot.rules.len(), 1);
    assert_eq!(snapshot.rules[0].min_level, Severity::Debug);
}

#[test]
fn test_with_remote_address_sync_registers_one_target() {
    let manager = Arc::new(LogManager::new());
    let logger = EngineLoggingService::with_remote_address(
        Arc::clone(&manager),
        Some("blah"),
        "udp://1.2.3.4:9999",
        "debug",
        false,
    )
    .unwrap();

    assert_eq!(logger.name(), Some("blah"));
    assert_eq!(manager.target_count(), 1);
    assert_eq!(manager.rule_count(), 1);
}

#[test]
fn test_failed_construction_leaves_pipeline_untouched() {
    let manager = Arc::new(LogManager::new());
    let result =
        EngineLoggingService::with_remote_address(Arc::clone(&manager), Some("blah"), "", "debug", true);
    assert!(result.is_err());
    assert!(!manager.has_configuration());
}

#[test]
fn test_from_options_applies_defaults() {
    let manager = Arc::new(LogManager::new());
    let options = ServiceOptions {
        name: Some("shop::api".to_string()),
        address: Some("udp://127.0.0.1:9999".to_string()),
        ..ServiceOptions::default()
    };

    let logger = EngineLoggingService::from_options(Arc::clone(&manager), &options).unwrap();

    assert_eq!(logger.resolved_name(), "shop::api");
    assert_eq!(manager.target_count(), 2);
    assert_eq!(
        manager.configuration().unwrap().rules[0].min_level,
        Severity::Debug
    );
}

#[test]
fn test_from_options_without_address_leaves_pipeline_alone() {
    let manager = Arc::new(LogManager::new());
    EngineLoggingService::from_options(Arc::clone(&manager), &ServiceOptions::default()).unwrap();
    assert!(!manager.has_configuration());
}

// ===== LEVEL GATING =====

#[test]
fn test_levels_below_threshold_are_skipped() {
    let (manager, memory) = with_memory("warning");
    let logger = EngineLoggingService::new(manager, Some("gate"));

    logger.trace("t");
    logger.debug("d");
    logger.info("i");
    logger.warning("w");
    logger.error("e");
    log_error!(logger, "order {} failed", 7);

    assert_eq!(memory.messages(), vec!["w", "e", "order 7 failed"]);
}

#[test]
fn test_fatal_is_gated() {
    let (manager, memory) = with_memory("off");
    let logger = EngineLoggingService::new(manager, Some("gate"));

    logger.fatal("down");
    logger.fatal_exception(&PaymentDeclined, Some("checkout"), false);

    assert!(memory.is_empty());
}

#[test]
fn test_unknown_and_off_messages_are_dropped() {
    let (manager, memory) = with_memory("trace");
    let logger = EngineLoggingService::new(manager, Some("gate"));

    logger.log(LogLevel::Unknown, format_args!("unknown"));
    logger.log(LogLevel::Off, format_args!("off"));
    logger.info("kept");

    assert_eq!(memory.messages(), vec!["kept"]);
}

// ===== EXCEPTIONS =====

#[test]
fn test_exception_message_is_composed() {
    let (manager, memory) = with_memory("debug");
    let logger = EngineLoggingService::new(manager, Some("payments"));

    logger.error_exception(&PaymentDeclined, Some("Charging order 7"), false);

    let records = memory.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].severity, Severity::Error);
    assert_eq!(
        records[0].message,
        "Charging order 7 Exception Message: card declined"
    );
}

#[test]
fn test_fatal_exception_with_stack_trace_flag() {
    let (manager, memory) = with_memory("debug");
    let logger = EngineLoggingService::new(manager, Some("payments"));

    logger.fatal_exception(&PaymentDeclined, None, true);

    let records = memory.records();
    assert_eq!(records[0].severity, Severity::Fatal);
    assert!(records[0].message.contains("card declined"));
}

// ===== RESOLUTION =====

#[derive(Default)]
struct CountingResolver {
    calls: AtomicUsize,
    skipped: AtomicUsize,
}

impl CallerNameResolver for CountingResolver {
    fn resolve(&self, frames_to_skip: usize) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.skipped.store(frames_to_skip, Ordering::SeqCst);
        Some("checkout::Handler".to_string())
    }
}

#[test]
fn test_engine_logger_is_resolved_once() {
    let (manager, memory) = with_memory("debug");
    let resolver = Arc::new(CountingResolver::default());
    let logger = EngineLoggingService::new(Arc::clone(&manager), None).with_resolver(resolver.clone());
    let lookups_before = manager.lookup_count();

    for i in 0..5 {
        log_debug!(logger, "call {}", i);
    }

    assert_eq!(manager.lookup_count(), lookups_before + 1);
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.skipped.load(Ordering::SeqCst), SERVICE_FRAMES_TO_SKIP);
    assert_eq!(logger.resolved_name(), "checkout::Handler");
    assert!(memory
        .records()
        .iter()
        .all(|r| r.logger == "checkout::Handler"));
}

#[test]
fn test_explicit_name_skips_resolver() {
    let manager = Arc::new(LogManager::new());
    let resolver = Arc::new(CountingResolver::default());
    let logger = EngineLoggingService::new(manager, Some("explicit")).with_resolver(resolver.clone());

    logger.info("hello");

    assert_eq!(logger.resolved_name(), "explicit");
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_concurrent_first_use_resolves_one_logger() {
    let (manager, _memory) = with_memory("debug");
    let logger = Arc::new(EngineLoggingService::new(Arc::clone(&manager), Some("shared")));
    let lookups_before = manager.lookup_count();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || logger.info(&format!("thread {i}")))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.lookup_count(), lookups_before + 1);
}

// ===== FAÇADE POLYMORPHISM =====

#[test]
fn test_backends_are_interchangeable() {
    let (manager, memory) = with_memory("info");
    let backends: Vec<Arc<dyn LoggingService>> = vec![
        Arc::new(NullLoggingService::new(Some("null"))),
        Arc::new(EngineLoggingService::new(manager, Some("engine"))),
    ];

    for backend in &backends {
        backend.info("same call");
    }

    assert_eq!(memory.messages(), vec!["same call"]);
}
