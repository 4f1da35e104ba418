//! Logging setup for hosts embedding the multiplexer
//!
//! Everything in this crate logs through `tracing`. Hosts that do not install
//! their own subscriber can use one of the `init_*` helpers below.

#[cfg(feature = "tracing")]
use tracing::debug;

/// Initialize a tracing subscriber with sensible defaults
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "dear_imgui_multiplex=info,dear_imgui_multiplex_winit=info,warn".into()
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Initialize a tracing subscriber with a custom filter
#[cfg(feature = "tracing")]
pub fn init_tracing_with_filter(filter: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Initialize a verbose subscriber for development
#[cfg(feature = "tracing")]
pub fn init_tracing_dev() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "dear_imgui_multiplex=trace,dear_imgui_multiplex_winit=debug,info".into()
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log per-frame capture statistics for one context
#[cfg(feature = "tracing")]
pub fn log_capture_stats(context: &str, batches: usize, vertices: usize, indices: usize) {
    debug!(
        "Context '{}' captured {} batches ({} vertices, {} indices)",
        context, batches, vertices, indices
    );
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing() {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing_with_filter(_filter: &str) {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}

#[cfg(not(feature = "tracing"))]
pub fn init_tracing_dev() {
    eprintln!("Warning: tracing feature not enabled, logging disabled");
}

#[cfg(not(feature = "tracing"))]
pub fn log_capture_stats(_context: &str, _batches: usize, _vertices: usize, _indices: usize) {}

/// Conditional trace logging
#[macro_export]
macro_rules! multiplex_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

/// Conditional debug logging
#[macro_export]
macro_rules! multiplex_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

/// Conditional info logging
#[macro_export]
macro_rules! multiplex_info {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::info!($($arg)*);
    };
}

/// Conditional warning logging
#[macro_export]
macro_rules! multiplex_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::warn!($($arg)*);
    };
}

/// Conditional error logging
#[macro_export]
macro_rules! multiplex_error {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::error!($($arg)*);
    };
}
