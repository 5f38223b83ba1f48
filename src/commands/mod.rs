// Exporter handlers: probe, parse, render
pub mod chrony_sources;
pub mod dnf_last_update;
pub mod dnf_update_check;
