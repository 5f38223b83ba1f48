// Prometheus textfile-collector exporters - Public API

// Re-export error types
pub mod error;
pub use error::{ExporterError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;

// Re-export commonly used types
pub use platform::{CommandRunner, SystemRunner};

// Initialize logging. Everything goes to stderr so stdout stays exposition text.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();
}
