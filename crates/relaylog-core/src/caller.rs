//! Caller-name resolution.
//!
//! A logger constructed without a name takes the path of the first calling
//! code outside relaylog and the standard library. Stack inspection is slow;
//! resolve once and cache the result.
//!
//! Prefer naming loggers explicitly with [`logger_name!`](crate::logger_name).

use std::backtrace::Backtrace;

/// Crates treated as part of the logging library itself. Matched against a
/// path's first segment, so binaries built on the library still resolve.
pub const LIBRARY_PREFIXES: &[&str] = &["relaylog_core", "relaylog_engine", "relaylog_service"];

/// First path segments belonging to the platform's base libraries.
const PLATFORM_CRATES: &[&str] = &["std", "core", "alloc", "backtrace", "backtrace_rs"];

/// Resolves a logger name from the active call stack.
pub trait CallerNameResolver: Send + Sync {
    /// Walk outward past `frames_to_skip` frames and return the declaring
    /// path of the first caller outside the logging library.
    fn resolve(&self, frames_to_skip: usize) -> Option<String>;
}

/// Resolver backed by `std::backtrace`.
///
/// Depends on symbol information being present in the binary; stripped
/// release builds resolve to `None`.
#[derive(Debug, Clone)]
pub struct BacktraceResolver {
    library_prefixes: Vec<String>,
}

impl BacktraceResolver {
    pub fn new() -> Self {
        Self::with_library_prefixes(LIBRARY_PREFIXES.iter().map(|p| p.to_string()))
    }

    /// Treat additional crates (for example a host's own logging wrapper)
    /// as library frames.
    pub fn with_library_prefixes(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            library_prefixes: prefixes.into_iter().collect(),
        }
    }
}

impl Default for BacktraceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CallerNameResolver for BacktraceResolver {
    fn resolve(&self, frames_to_skip: usize) -> Option<String> {
        let rendered = Backtrace::force_capture().to_string();
        let symbols: Vec<&str> = rendered.lines().filter_map(frame_symbol).collect();
        let prefixes: Vec<&str> = self.library_prefixes.iter().map(String::as_str).collect();
        resolve_from_symbols(&symbols, frames_to_skip, &prefixes)
    }
}

/// Walk demangled frame symbols, innermost first.
///
/// Frames with no declaring path, or whose path belongs to the library or
/// the platform, are skipped. The walk gives up at the runtime entry point.
pub fn resolve_from_symbols(
    symbols: &[&str],
    frames_to_skip: usize,
    library_prefixes: &[&str],
) -> Option<String> {
    for symbol in symbols.iter().skip(frames_to_skip) {
        let Some(path) = declaring_path(symbol) else {
            continue;
        };
        if is_runtime_entry(&path) {
            return None;
        }
        if is_platform(&path) || is_library(&path, library_prefixes) {
            continue;
        }
        return Some(path);
    }
    None
}

/// Extract the symbol from a `   3: some::path` backtrace line.
fn frame_symbol(line: &str) -> Option<&str> {
    let (index, symbol) = line.trim_start().split_once(": ")?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(symbol.trim())
}

/// The path that declares the function behind `symbol`.
///
/// `a::b::Type::method` yields `a::b::Type`, `<a::Type as Trait>::method`
/// yields `a::Type`. Closure segments and symbol hashes are dropped.
fn declaring_path(symbol: &str) -> Option<String> {
    if let Some(rest) = symbol.strip_prefix('<') {
        let self_type = impl_self_type(rest);
        return (!self_type.is_empty()).then(|| self_type.to_string());
    }

    let mut segments: Vec<&str> = symbol
        .split("::")
        .filter(|s| !s.is_empty() && !s.starts_with("{{") && !s.starts_with('<'))
        .collect();
    if segments.last().is_some_and(|s| is_symbol_hash(s)) {
        segments.pop();
    }
    segments.pop()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("::"))
}

/// The self type of a `<Type as Trait>` or `<Type>` qualified path.
fn impl_self_type(rest: &str) -> &str {
    let mut depth = 0usize;
    for (i, c) in rest.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if depth == 0 => return &rest[..i],
            '>' => depth -= 1,
            ' ' if depth == 0 && rest[i..].starts_with(" as ") => return &rest[..i],
            _ => {}
        }
    }
    rest
}

fn is_symbol_hash(segment: &str) -> bool {
    segment.len() == 17
        && segment.starts_with('h')
        && segment[1..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_platform(path: &str) -> bool {
    let first = path.split("::").next().unwrap_or_default();
    PLATFORM_CRATES.contains(&first)
}

fn is_library(path: &str, library_prefixes: &[&str]) -> bool {
    let first = path.split("::").next().unwrap_or_default();
    library_prefixes.contains(&first)
}

fn is_runtime_entry(path: &str) -> bool {
    path.starts_with("std::rt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_symbol_parsing() {
        assert_eq!(frame_symbol("   3: my_app::main"), Some("my_app::main"));
        assert_eq!(frame_symbol("             at ./src/main.rs:4:5"), None);
        assert_eq!(frame_symbol("note: some text"), None);
    }

    #[test]
    fn test_declaring_path_variants() {
        assert_eq!(
            declaring_path("shop::orders::OrderController::index").as_deref(),
            Some("shop::orders::OrderController")
        );
        assert_eq!(
            declaring_path("<shop::Repo<u8> as core::fmt::Debug>::fmt").as_deref(),
            Some("shop::Repo<u8>")
        );
        assert_eq!(
            declaring_path("shop::run::{{closure}}").as_deref(),
            Some("shop")
        );
        assert_eq!(
            declaring_path("shop::run::h0123456789abcdef").as_deref(),
            Some("shop")
        );
        assert_eq!(declaring_path("main"), None);
    }

    #[test]
    fn test_skips_library_and_platform_frames() {
        let symbols = [
            "std::backtrace::Backtrace::force_capture",
            "relaylog_core::caller::BacktraceResolver::resolve",
            "relaylog_service::service::EngineLoggingService::logger",
            "main",
            "shop::orders::OrderController::index",
            "std::rt::lang_start",
        ];
        assert_eq!(
            resolve_from_symbols(&symbols, 0, LIBRARY_PREFIXES).as_deref(),
            Some("shop::orders::OrderController")
        );
    }

    #[test]
    fn test_binaries_named_like_the_library_still_resolve() {
        let symbols = [
            "relaylog_core::caller::BacktraceResolver::resolve",
            "<relaylog_service::service::EngineLoggingService as relaylog_core::facade::LoggingService>::log",
            "relaylog_cli::commands::send::execute",
            "relaylog_cli::main",
            "std::rt::lang_start",
        ];
        assert_eq!(
            resolve_from_symbols(&symbols, 0, LIBRARY_PREFIXES).as_deref(),
            Some("relaylog_cli::commands::send")
        );
        assert!(!is_library("relaylog_core_extras::Thing", LIBRARY_PREFIXES));
        assert!(is_library("relaylog_engine::manager::LogManager", LIBRARY_PREFIXES));
    }

    #[test]
    fn test_gives_up_at_runtime_entry() {
        let symbols = [
            "relaylog_service::service::EngineLoggingService::logger",
            "std::rt::lang_start_internal",
            "shop::never_reached",
        ];
        assert_eq!(resolve_from_symbols(&symbols, 0, LIBRARY_PREFIXES), None);
    }

    #[test]
    fn test_frames_to_skip_is_honoured() {
        let symbols = ["shop::inner::Helper::go", "shop::outer::Caller::go"];
        assert_eq!(
            resolve_from_symbols(&symbols, 1, LIBRARY_PREFIXES).as_deref(),
            Some("shop::outer::Caller")
        );
    }

    #[test]
    fn test_custom_library_prefixes() {
        let symbols = ["shop::logging::Wrapper::log", "shop::api::Handler::get"];
        assert_eq!(
            resolve_from_symbols(&symbols, 0, &["shop::logging"]).as_deref(),
            Some("shop::api::Handler")
        );
    }
}
