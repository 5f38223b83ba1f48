// Pending dnf/yum updates, security advisories and reboot state

use std::io::{self, Write};

use log::debug;

use crate::core::config::{KERNEL_CORE_PREFIX, KERNEL_PACKAGES, PENDING_LIST_MAX_LEN};
use crate::core::exposition::MetricWriter;

pub const METRIC_AVAILABLE: &str = "dnf_update_available";
pub const METRIC_PENDING_COUNT: &str = "dnf_update_pending_count";
pub const METRIC_KERNEL_AVAILABLE: &str = "dnf_update_kernel_available";
pub const METRIC_KERNEL_VERSION_INFO: &str = "dnf_update_kernel_version_info";
pub const METRIC_KERNEL_CURRENT_INFO: &str = "dnf_update_kernel_current_version_info";
pub const METRIC_KERNEL_PENDING_INFO: &str = "dnf_update_kernel_pending_version_info";
pub const METRIC_SECURITY_AVAILABLE: &str = "dnf_update_security_available";
pub const METRIC_SECURITY_COUNT: &str = "dnf_update_security_count";
pub const METRIC_REBOOT_REQUIRED: &str = "dnf_update_reboot_required";
pub const METRIC_CHECK_ERROR: &str = "dnf_update_check_error";
pub const METRIC_PENDING_PKG: &str = "dnf_update_pending_pkg";
pub const METRIC_PENDING_INFO: &str = "dnf_update_pending_info";

/// Header that opens the obsoleted-packages section of `check-update`
const OBSOLETING_HEADER: &str = "Obsoleting";

/// One package with an update waiting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingPackage {
    /// `name.arch` exactly as printed
    pub name_arch: String,
    pub name: String,
    pub arch: String,
    pub version: String,
    pub repo: String,
}

impl PendingPackage {
    /// Build from the first three `check-update` columns.
    /// The architecture is whatever follows the last dot.
    pub fn new(name_arch: &str, version: &str, repo: &str) -> Self {
        let (name, arch) = match name_arch.rsplit_once('.') {
            Some((name, arch)) => (name.to_string(), arch.to_string()),
            None => (String::new(), String::new()),
        };

        Self {
            name_arch: name_arch.to_string(),
            name,
            arch,
            version: version.to_string(),
            repo: repo.to_string(),
        }
    }

    pub fn is_kernel(&self) -> bool {
        KERNEL_PACKAGES.contains(&self.name.as_str())
    }

    /// `name.arch-version` token used in the pending list label
    pub fn list_token(&self) -> String {
        format!("{}-{}", self.name_arch, self.version)
    }
}

/// Aggregate state of one update check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub updates_available: bool,
    pub pending_count: usize,
    pub kernel_available: bool,
    pub current_kernel: String,
    pub pending_kernel: String,
    pub security_available: bool,
    pub security_count: usize,
    pub reboot_required: bool,
    pub check_error: bool,
    pub packages: Vec<PendingPackage>,
}

impl UpdateSummary {
    pub fn new(current_kernel: impl Into<String>) -> Self {
        Self {
            current_kernel: current_kernel.into(),
            ..Default::default()
        }
    }

    /// Record a pending package. The first kernel package seen fixes the
    /// pending kernel version; later ones leave it alone.
    pub fn push_package(&mut self, package: PendingPackage) {
        if package.is_kernel() && !self.kernel_available {
            self.pending_kernel = package.version.clone();
            self.kernel_available = true;
        }
        self.pending_count += 1;
        self.packages.push(package);
    }

    /// Fill in the package list from `check-update` output
    pub fn apply_check_update(&mut self, output: &str) {
        for package in parse_check_update(output) {
            self.push_package(package);
        }
    }

    pub fn set_security_count(&mut self, count: usize) {
        self.security_count = count;
        self.security_available = count > 0;
    }

    /// Comma-joined `name.arch-version` list, capped at [`PENDING_LIST_MAX_LEN`].
    /// The token that would cross the cap is dropped with everything after it.
    pub fn pending_list(&self) -> String {
        let mut list = String::new();
        for package in &self.packages {
            let token = package.list_token();
            let separator = usize::from(!list.is_empty());
            if list.len() + separator + token.len() > PENDING_LIST_MAX_LEN {
                break;
            }
            if separator == 1 {
                list.push(',');
            }
            list.push_str(&token);
        }
        list
    }
}

/// Pending packages listed in `check-update` output.
///
/// Blank lines and lines whose first column has no `.` (headers, metadata
/// notices) are skipped; scanning stops at the obsoleted-packages section.
pub fn parse_check_update(output: &str) -> Vec<PendingPackage> {
    let mut packages = Vec::new();

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with(OBSOLETING_HEADER) {
            break;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        if !fields[0].contains('.') {
            debug!("Skipping check-update line: {:?}", line);
            continue;
        }

        packages.push(PendingPackage::new(fields[0], fields[1], fields[2]));
    }

    packages
}

/// Number of non-blank lines in the security advisory listing
pub fn count_security_advisories(output: &str) -> usize {
    output.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Version of the newest installed kernel-core from `rpm -q --last kernel-core`
pub fn newest_installed_kernel(output: &str) -> Option<String> {
    let first = output.lines().next()?.split_whitespace().next()?;
    Some(
        first
            .strip_prefix(KERNEL_CORE_PREFIX)
            .unwrap_or(first)
            .to_string(),
    )
}

/// Fallback reboot check: the running kernel must be a prefix of the newest
/// installed one. An unknown running kernel never asks for a reboot.
pub fn kernel_reboot_required(current_kernel: &str, newest_installed: &str) -> bool {
    !current_kernel.is_empty() && !newest_installed.starts_with(current_kernel)
}

fn version_info<W: Write>(
    writer: &mut MetricWriter<W>,
    name: &str,
    summary: &UpdateSummary,
) -> io::Result<()> {
    if summary.kernel_available {
        writer.gauge(name, &[("version", summary.pending_kernel.as_str())], 1)
    } else {
        writer.gauge(name, &[("version", "")], 0)
    }
}

pub fn render<W: Write>(summary: &UpdateSummary, writer: &mut MetricWriter<W>) -> io::Result<()> {
    writer.gauge(METRIC_AVAILABLE, &[], u8::from(summary.updates_available))?;
    writer.gauge(METRIC_PENDING_COUNT, &[], summary.pending_count)?;
    writer.gauge(METRIC_KERNEL_AVAILABLE, &[], u8::from(summary.kernel_available))?;

    version_info(writer, METRIC_KERNEL_VERSION_INFO, summary)?;
    writer.gauge(
        METRIC_KERNEL_CURRENT_INFO,
        &[("version", summary.current_kernel.as_str())],
        1,
    )?;
    version_info(writer, METRIC_KERNEL_PENDING_INFO, summary)?;

    writer.gauge(METRIC_SECURITY_AVAILABLE, &[], u8::from(summary.security_available))?;
    writer.gauge(METRIC_SECURITY_COUNT, &[], summary.security_count)?;
    writer.gauge(METRIC_REBOOT_REQUIRED, &[], u8::from(summary.reboot_required))?;
    writer.gauge(METRIC_CHECK_ERROR, &[], u8::from(summary.check_error))?;

    writer.gauge_type(METRIC_PENDING_PKG)?;
    for package in &summary.packages {
        writer.sample(
            METRIC_PENDING_PKG,
            &[
                ("name", package.name.as_str()),
                ("arch", package.arch.as_str()),
                ("version", package.version.as_str()),
                ("repo", package.repo.as_str()),
            ],
            1,
        )?;
    }

    let pending_list = summary.pending_list();
    writer.gauge(METRIC_PENDING_INFO, &[("packages", pending_list.as_str())], 1)?;
    writer.trailer()
}
