// perf.rs - Timing instrumentation for Tandem
//
// Controlled via the TANDEM_PERF environment variable.
//
// Usage:
//   TANDEM_PERF=1 tandem --stdio       # Log parse and index durations
//   TANDEM_PERF=verbose tandem --stdio # Also warn when thresholds are exceeded

use std::sync::OnceLock;
use std::time::Instant;

static PERF_ENABLED: OnceLock<bool> = OnceLock::new();
static PERF_VERBOSE: OnceLock<bool> = OnceLock::new();

fn enabled_from(value: Option<&str>) -> bool {
    value
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn verbose_from(value: Option<&str>) -> bool {
    value.map(|v| v.to_lowercase() == "verbose").unwrap_or(false)
}

/// Check if performance timing is enabled
pub fn is_enabled() -> bool {
    *PERF_ENABLED.get_or_init(|| enabled_from(std::env::var("TANDEM_PERF").ok().as_deref()))
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    *PERF_VERBOSE.get_or_init(|| verbose_from(std::env::var("TANDEM_PERF").ok().as_deref()))
}

/// RAII timing guard that logs duration on drop
///
/// ```
/// use tandem::perf::TimingGuard;
///
/// let _guard = TimingGuard::new("operation_name");
/// // ... do work ...
/// ```
pub struct TimingGuard {
    start: Instant,
    name: &'static str,
    threshold_warn_ms: Option<u64>,
    enabled: bool,
}

impl TimingGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
            threshold_warn_ms: None,
            enabled: is_enabled(),
        }
    }

    /// Create a timing guard that warns (in verbose mode) when the operation
    /// takes longer than `threshold_ms`.
    pub fn with_threshold(name: &'static str, threshold_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            name,
            threshold_warn_ms: Some(threshold_ms),
            enabled: is_enabled(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if !self.enabled {
            return;
        }

        let elapsed = self.start.elapsed();
        log::info!("[PERF] {} completed in {:?}", self.name, elapsed);

        if let Some(threshold) = self.threshold_warn_ms {
            if elapsed.as_millis() > threshold as u128 && is_verbose() {
                log::warn!(
                    "[PERF] {} exceeded threshold ({}ms > {}ms)",
                    self.name,
                    elapsed.as_millis(),
                    threshold
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_value_parsing() {
        assert!(!enabled_from(None));
        assert!(!enabled_from(Some("")));
        assert!(!enabled_from(Some("0")));
        assert!(!enabled_from(Some("FALSE")));
        assert!(enabled_from(Some("1")));
        assert!(enabled_from(Some("verbose")));

        assert!(verbose_from(Some("Verbose")));
        assert!(!verbose_from(Some("1")));
        assert!(!verbose_from(None));
    }
}
