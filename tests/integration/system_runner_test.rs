// SystemRunner against shell scripts in a throwaway search path

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use once_cell::sync::Lazy;
use tempfile::TempDir;
use textfile_exporters::commands::{chrony_sources, dnf_update_check};
use textfile_exporters::core::config::{CommandSpec, CHRONYC_SOURCES};
use textfile_exporters::{CommandRunner, ExporterError, SystemRunner};

use super::support::render;

const SCRIPTS: &[(&str, &str)] = &[
    (
        "chronyc",
        "cat <<'EOF'\n\
         MS Name/IP address         Stratum Poll Reach LastRx Last sample\n\
         ===============================================================================\n\
         ^* 10.0.0.1                      2  10   377    32   -120us[ +30us] +/-  500us\n\
         EOF\n",
    ),
    (
        "dnf",
        "case \"$*\" in\n\
         \"-q check-update\") echo 'bash.x86_64  5.1.8-9.el9  baseos'; exit 100 ;;\n\
         \"-q updateinfo list security\") echo 'RHSA-2024:0001 Important/Sec. bash'; exit 0 ;;\n\
         esac\n\
         exit 1\n",
    ),
    ("uname", "echo 5.14.0-362.8.1.el9_3.x86_64\n"),
    ("needs-restarting", "exit 1\n"),
    ("failing", "echo broken >&2\nexit 3\n"),
];

/// Every script is written before any test runs one, so no process is
/// spawned while a script file is still open for writing.
static SCRIPT_DIR: Lazy<TempDir> = Lazy::new(|| {
    let dir = TempDir::new().unwrap();
    for (name, body) in SCRIPTS {
        let path = dir.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    dir
});

fn runner() -> SystemRunner {
    SystemRunner::with_search_path(SCRIPT_DIR.path())
}

#[test]
fn test_lookup_restricted_to_search_path() {
    let runner = runner();
    let found = runner.lookup("chronyc").unwrap();
    assert!(found.ends_with("chronyc"));
    assert!(!runner.is_available("definitely-not-installed"));
}

#[test]
fn test_run_captures_exit_code_and_streams() {
    let output = runner().run(&CommandSpec::new("failing", &[])).unwrap();
    assert_eq!(output.code, Some(3));
    assert_eq!(output.stdout, "");
    assert_eq!(output.stderr, "broken\n");
    assert!(!output.success());
}

#[test]
fn test_run_checked_rejects_nonzero_exit() {
    let err = runner()
        .run_checked(&CommandSpec::new("failing", &[]))
        .unwrap_err();
    assert!(matches!(
        err,
        ExporterError::CommandFailed { code: Some(3), .. }
    ));
}

#[test]
fn test_missing_program_is_not_found() {
    let err = runner()
        .run(&CommandSpec::new("rpm", &["-qa", "--last"]))
        .unwrap_err();
    assert!(matches!(err, ExporterError::ToolNotFound(ref p) if p == "rpm"));
}

#[test]
fn test_chrony_exporter_end_to_end() {
    let output = runner().run_checked(&CHRONYC_SOURCES).unwrap();
    assert!(output.stdout.starts_with("MS Name/IP address"));

    let text = render(|out| chrony_sources::execute(&runner(), out));
    assert!(text.contains("chrony_sources_up 1\n"));
    assert!(text.contains(
        "chrony_source_reach{source=\"10.0.0.1\",mode=\"^*\",stratum=\"2\",poll=\"10\"} 255\n"
    ));
}

#[test]
fn test_update_exporter_end_to_end() {
    let text = render(|out| dnf_update_check::execute(&runner(), out));
    assert!(text.contains("dnf_update_available 1\n"));
    assert!(text.contains("dnf_update_pending_count 1\n"));
    assert!(text.contains("dnf_update_security_count 1\n"));
    assert!(text.contains("dnf_update_reboot_required 1\n"));
    assert!(text.contains(
        "dnf_update_kernel_current_version_info{version=\"5.14.0-362.8.1.el9_3.x86_64\"} 1\n"
    ));
}
