// chrony_sources: health of chrony's time sources

use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::core::chrony::{self, TimeSource};
use crate::core::config::{CHRONYC, CHRONYC_SOURCES};
use crate::core::exposition::MetricWriter;
use crate::platform::CommandRunner;

/// Query chronyc. `None` means the tool is missing or failed, which is
/// reported as `chrony_sources_up 0`.
pub fn collect<R: CommandRunner>(runner: &R) -> Option<Vec<TimeSource>> {
    if !runner.is_available(CHRONYC) {
        warn!("{} not found on PATH", CHRONYC);
        return None;
    }

    match runner.run_checked(&CHRONYC_SOURCES) {
        Ok(output) => {
            let sources = chrony::parse_sources(&output.stdout);
            debug!("Parsed {} time sources", sources.len());
            Some(sources)
        }
        Err(e) => {
            warn!("Failed to query time sources: {}", e);
            None
        }
    }
}

pub fn execute<R: CommandRunner, W: Write>(runner: &R, out: W) -> Result<()> {
    let sources = collect(runner);

    let mut writer = MetricWriter::new(out);
    chrony::render(sources.as_deref(), &mut writer)
        .and_then(|_| writer.flush())
        .context("Failed to write chrony_sources metrics")?;
    Ok(())
}
