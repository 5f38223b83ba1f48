// dnf_last_update: timestamp of the newest package installation

use std::io::Write;

use anyhow::{Context, Result};
use log::warn;

use crate::core::config::RPM_LAST_INSTALLED;
use crate::core::exposition::MetricWriter;
use crate::core::last_update::{self, LastUpdate};
use crate::platform::CommandRunner;

/// Read the install history and parse its newest entry
pub fn collect<R: CommandRunner>(runner: &R) -> LastUpdate {
    let output = match runner.run_checked(&RPM_LAST_INSTALLED) {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to read install history: {}", e);
            return LastUpdate::failed();
        }
    };

    if output.stdout.is_empty() {
        warn!("{} printed nothing", RPM_LAST_INSTALLED);
        return LastUpdate::failed();
    }

    let record = last_update::parse_history(&output.stdout);
    if record.error {
        warn!("Could not parse install time from {:?}", record.time_text);
    }
    record
}

pub fn execute<R: CommandRunner, W: Write>(runner: &R, out: W) -> Result<()> {
    let record = collect(runner);

    let mut writer = MetricWriter::new(out);
    last_update::render(&record, &mut writer)
        .and_then(|_| writer.flush())
        .context("Failed to write dnf_last_update metrics")?;
    Ok(())
}
