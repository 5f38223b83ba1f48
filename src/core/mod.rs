// Core logic: parsers and renderers, free of process I/O

pub mod chrony;
pub mod config;
pub mod exposition;
pub mod last_update;
pub mod updates;

// Re-export commonly used items
pub use chrony::TimeSource;
pub use exposition::{escape_label, MetricWriter, Seconds};
pub use last_update::LastUpdate;
pub use updates::{PendingPackage, UpdateSummary};
