//! Utility functions and helpers
//!
//! This module provides various utility functions and helpers used throughout the codebase.

pub mod string;

pub use string::StringUtils;

use std::time::Instant;
use log::info;

/// Measure execution time of a closure
pub fn measure_time<F, T>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    info!(
        "{} took {}",
        name,
        StringUtils::format_duration(elapsed.as_millis() as u64)
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_measure_time() {
        let result = measure_time("test_operation", || {
            std::thread::sleep(Duration::from_millis(5));
            42
        });

        assert_eq!(result, 42);
    }

    #[test]
    fn test_measure_time_passes_errors_through() {
        let result: Result<(), &str> = measure_time("failing_operation", || Err("boom"));
        assert_eq!(result, Err("boom"));
    }
}
