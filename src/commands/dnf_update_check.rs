// dnf_update_check: pending updates, security advisories and reboot state

use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::core::config::{
    CommandSpec, PackageManager, CHECK_UPDATE_PENDING_EXIT, NEEDS_RESTARTING,
    NEEDS_RESTARTING_REBOOT, RPM_LAST_KERNEL, UNAME_RELEASE,
};
use crate::core::exposition::MetricWriter;
use crate::core::updates::{self, UpdateSummary};
use crate::platform::CommandRunner;

/// Running kernel release, empty when `uname` fails
fn current_kernel<R: CommandRunner>(runner: &R) -> String {
    match runner.run_checked(&UNAME_RELEASE) {
        Ok(output) => output.stdout.trim().to_string(),
        Err(e) => {
            warn!("Failed to read running kernel: {}", e);
            String::new()
        }
    }
}

/// Count security advisories; `None` when the listing failed or was empty
fn security_count<R: CommandRunner>(runner: &R, spec: &CommandSpec) -> Option<usize> {
    match runner.run_checked(spec) {
        Ok(output) if !output.stdout.is_empty() => {
            Some(updates::count_security_advisories(&output.stdout))
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Security advisory listing unavailable: {}", e);
            None
        }
    }
}

/// Ask needs-restarting when installed, otherwise compare kernel versions
fn reboot_required<R: CommandRunner>(runner: &R, current_kernel: &str) -> bool {
    if runner.is_available(NEEDS_RESTARTING) {
        return match runner.run(&NEEDS_RESTARTING_REBOOT) {
            Ok(output) => !output.success(),
            Err(e) => {
                warn!("Failed to run {}: {}", NEEDS_RESTARTING_REBOOT, e);
                true
            }
        };
    }

    match runner.run_checked(&RPM_LAST_KERNEL) {
        Ok(output) => updates::newest_installed_kernel(&output.stdout)
            .is_some_and(|newest| updates::kernel_reboot_required(current_kernel, &newest)),
        Err(e) => {
            debug!("No installed kernel-core to compare against: {}", e);
            false
        }
    }
}

/// Run the full update check
pub fn collect<R: CommandRunner>(runner: &R) -> UpdateSummary {
    let manager = PackageManager::detect(runner.is_available(PackageManager::Dnf.program()));
    let mut summary = UpdateSummary::new(current_kernel(runner));

    let check_spec = manager.check_update();
    let check = match runner.run(&check_spec) {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {}: {}", check_spec, e);
            summary.check_error = true;
            return summary;
        }
    };

    match check.code {
        Some(CHECK_UPDATE_PENDING_EXIT) => {
            summary.updates_available = true;
            summary.apply_check_update(&check.combined());
        }
        Some(0) => {}
        code => {
            warn!("{} exited with {:?}", check_spec, code);
            summary.check_error = true;
            return summary;
        }
    }

    if let Some(spec) = manager.security_updates() {
        if let Some(count) = security_count(runner, &spec) {
            summary.set_security_count(count);
        }
    }

    summary.reboot_required = reboot_required(runner, &summary.current_kernel);
    summary
}

pub fn execute<R: CommandRunner, W: Write>(runner: &R, out: W) -> Result<()> {
    let summary = collect(runner);

    let mut writer = MetricWriter::new(out);
    updates::render(&summary, &mut writer)
        .and_then(|_| writer.flush())
        .context("Failed to write dnf_update_check metrics")?;
    Ok(())
}
