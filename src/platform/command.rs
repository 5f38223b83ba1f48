// Process boundary: executable lookup and command execution

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::core::config::CommandSpec;
use crate::error::{ExporterError, Result};

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, the way a shell `2>&1` capture reads
    pub fn combined(&self) -> String {
        let mut text = String::with_capacity(self.stdout.len() + self.stderr.len());
        text.push_str(&self.stdout);
        if !self.stderr.is_empty() && !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&self.stderr);
        text
    }
}

/// Narrow interface over the external tools every exporter shells out to.
///
/// Parsers only ever see the text a runner hands back, so tests can swap in
/// captured fixture output instead of live system state.
pub trait CommandRunner {
    /// Resolve `program` on the executable search path
    fn lookup(&self, program: &str) -> Option<PathBuf>;

    /// Run a command to completion. A nonzero exit is reported through
    /// [`CommandOutput::code`]; only a failure to start the process is an error.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    fn is_available(&self, program: &str) -> bool {
        self.lookup(program).is_some()
    }

    /// Run a command and require exit status 0
    fn run_checked(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.run(spec)?;
        if output.success() {
            Ok(output)
        } else {
            Err(ExporterError::command_failed(spec.program, output.code))
        }
    }
}

/// Runner backed by real processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    search_path: Option<OsString>,
}

impl SystemRunner {
    /// Runner that resolves programs through the inherited `PATH`
    pub fn new() -> Self {
        Self { search_path: None }
    }

    /// Runner restricted to an explicit search path (useful for testing)
    pub fn with_search_path<S: Into<OsString>>(search_path: S) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    fn resolve(&self, program: &str) -> Result<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir()?;
                which::which_in(program, Some(paths), cwd)
            }
            None => which::which(program),
        };
        found.map_err(|_| ExporterError::tool_not_found(program))
    }
}

impl CommandRunner for SystemRunner {
    fn lookup(&self, program: &str) -> Option<PathBuf> {
        self.resolve(program).ok()
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let binary = self.resolve(spec.program)?;
        debug!("Running {} ({})", spec, binary.display());

        let output = Command::new(&binary)
            .args(spec.args)
            .output()
            .map_err(|e| ExporterError::spawn(spec.program, e))?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "{} finished with {:?} ({} bytes stdout)",
            spec.program,
            result.code,
            result.stdout.len()
        );
        Ok(result)
    }
}
