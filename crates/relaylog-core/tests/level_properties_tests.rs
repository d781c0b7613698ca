//! Property tests for level parsing and caller resolution
//!
//! Level names come from configuration files and command lines, and
//! backtrace text varies by platform, so both are exercised with
//! arbitrary input.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use relaylog_core::caller::{resolve_from_symbols, LIBRARY_PREFIXES};
    use relaylog_core::LogLevel;

    proptest! {
        /// **Property:** A threshold parsed from any string is never `Unknown`.
        #[test]
        fn test_parsed_threshold_is_never_unknown(name in ".*") {
            let threshold = LogLevel::parse_or_off(&name).threshold();
            prop_assert_ne!(threshold, LogLevel::Unknown);
        }

        /// **Property:** Canonical names parse back in any letter case.
        #[test]
        fn test_names_parse_case_insensitively(
            level in prop::sample::select(LogLevel::ALL.to_vec()),
            upper in any::<bool>(),
        ) {
            let name = if upper {
                level.as_str().to_uppercase()
            } else {
                level.as_str().to_string()
            };
            prop_assert_eq!(LogLevel::parse_or_off(&name), level);
        }

        /// **Property:** Resolution never panics and never returns a
        /// library path.
        #[test]
        fn test_resolution_never_returns_library_frames(
            symbols in prop::collection::vec("[a-z_<>: {}#]{0,40}", 0..12),
            skip in 0usize..4,
        ) {
            let refs: Vec<&str> = symbols.iter().map(String::as_str).collect();
            if let Some(path) = resolve_from_symbols(&refs, skip, LIBRARY_PREFIXES) {
                let first = path.split("::").next().unwrap_or_default();
                prop_assert!(!LIBRARY_PREFIXES.contains(&first));
                prop_assert!(!path.is_empty());
            }
        }
    }
}
