// Static exporter configuration: identity and the external commands we run

use std::fmt;

/// Schema version printed in every trailer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Attribution line printed in every trailer
pub const SIGNATURE: &str = "Designed by Ifesinachi Osude";

/// `check-update` exit status meaning "updates are pending"
pub const CHECK_UPDATE_PENDING_EXIT: i32 = 100;

/// Package names whose update counts as a kernel update, in no particular order
pub const KERNEL_PACKAGES: &[&str] = &["kernel-core", "kernel"];

/// Prefix `rpm -q` puts in front of the installed kernel version
pub const KERNEL_CORE_PREFIX: &str = "kernel-core-";

/// Upper bound for the `packages` label of `dnf_update_pending_info`
pub const PENDING_LIST_MAX_LEN: usize = 1200;

/// One external command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl CommandSpec {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Installed packages, newest first, with install times
pub const RPM_LAST_INSTALLED: CommandSpec = CommandSpec::new("rpm", &["-qa", "--last"]);

/// Installed kernel-core packages, newest first
pub const RPM_LAST_KERNEL: CommandSpec = CommandSpec::new("rpm", &["-q", "--last", "kernel-core"]);

pub const CHRONYC: &str = "chronyc";

/// Numeric source table with the verbose legend
pub const CHRONYC_SOURCES: CommandSpec = CommandSpec::new(CHRONYC, &["-n", "sources", "-v"]);

/// Running kernel release
pub const UNAME_RELEASE: CommandSpec = CommandSpec::new("uname", &["-r"]);

pub const NEEDS_RESTARTING: &str = "needs-restarting";

/// Exits nonzero when a reboot is needed
pub const NEEDS_RESTARTING_REBOOT: CommandSpec = CommandSpec::new(NEEDS_RESTARTING, &["-r"]);

/// Package manager used by the update check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Dnf,
    Yum,
}

impl PackageManager {
    /// Prefer dnf, fall back to yum when dnf is not installed
    pub fn detect(dnf_available: bool) -> Self {
        if dnf_available {
            PackageManager::Dnf
        } else {
            PackageManager::Yum
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
        }
    }

    pub fn check_update(self) -> CommandSpec {
        match self {
            PackageManager::Dnf => CommandSpec::new("dnf", &["-q", "check-update"]),
            PackageManager::Yum => CommandSpec::new("yum", &["-q", "check-update"]),
        }
    }

    /// Security advisory listing; yum has no equivalent we rely on
    pub fn security_updates(self) -> Option<CommandSpec> {
        match self {
            PackageManager::Dnf => Some(CommandSpec::new(
                "dnf",
                &["-q", "updateinfo", "list", "security"],
            )),
            PackageManager::Yum => None,
        }
    }
}
