//! This module provides observability hooks for the compression passes.
//!
//! The passes make size decisions that are hard to reconstruct after the
//! fact, so the `log_metric!` macro emits structured key-value lines
//! describing what a pass saw and produced.
//!
//! It is a zero-cost abstraction: the `#[cfg(debug_assertions)]` attribute
//! ensures that the macro body and all calls to it are completely compiled
//! out of release builds.

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use dofpack::log_metric;
/// let saved = 12;
/// log_metric!("event"="compress_data", "slots_saved"=&saved);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("DOFPACK_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}
