// Scripted CommandRunner used in place of the real system tools

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use textfile_exporters::core::config::CommandSpec;
use textfile_exporters::platform::{CommandOutput, CommandRunner};
use textfile_exporters::{ExporterError, Result};

/// Runner that answers from canned output keyed by the full command line
#[derive(Debug, Default)]
pub struct FakeRunner {
    tools: Vec<String>,
    responses: HashMap<String, CommandOutput>,
    calls: RefCell<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a program on the fake PATH without scripting any output
    pub fn with_tool(mut self, program: &str) -> Self {
        if !self.tools.iter().any(|t| t == program) {
            self.tools.push(program.to_string());
        }
        self
    }

    /// Script `command_line` to exit with `code` and print `stdout`
    pub fn respond(self, command_line: &str, code: i32, stdout: &str) -> Self {
        self.respond_with(
            command_line,
            CommandOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    pub fn respond_with(mut self, command_line: &str, output: CommandOutput) -> Self {
        let program = command_line.split_whitespace().next().unwrap_or_default();
        self = self.with_tool(program);
        self.responses.insert(command_line.to_string(), output);
        self
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn lookup(&self, program: &str) -> Option<PathBuf> {
        self.tools
            .iter()
            .any(|t| t == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }

    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let line = spec.to_string();
        self.calls.borrow_mut().push(line.clone());

        if !self.is_available(spec.program) {
            return Err(ExporterError::tool_not_found(spec.program));
        }
        self.responses.get(&line).cloned().ok_or_else(|| {
            ExporterError::spawn(
                spec.program,
                io::Error::new(io::ErrorKind::NotFound, "no scripted response"),
            )
        })
    }
}

/// Run an exporter into a string
pub fn render<F>(execute: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> anyhow::Result<()>,
{
    let mut buffer = Vec::new();
    execute(&mut buffer).expect("rendering into memory cannot fail");
    String::from_utf8(buffer).expect("metrics are UTF-8")
}

/// The two closing lines every exporter prints
pub fn trailer() -> String {
    format!(
        "# VERSION {}\n# Designed by Ifesinachi Osude\n",
        textfile_exporters::core::config::VERSION
    )
}

/// Check that every sample line is preceded by a `# TYPE` line for its metric.
///
/// Returns the offending line on failure.
pub fn check_well_formed(text: &str) -> std::result::Result<(), String> {
    let mut typed: Vec<&str> = Vec::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("# TYPE ") {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(_kind)) => typed.push(name),
                _ => return Err(line.to_string()),
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if line.is_empty() {
            return Err(line.to_string());
        }

        let name_end = line.find(['{', ' ']).unwrap_or(line.len());
        let name = &line[..name_end];
        if !typed.contains(&name) {
            return Err(line.to_string());
        }
        let value = line.rsplit(' ').next().unwrap_or("");
        if value.parse::<f64>().is_err() {
            return Err(line.to_string());
        }
    }
    Ok(())
}

#[test]
fn test_check_well_formed() {
    assert!(check_well_formed("# TYPE up gauge\nup 1\n# VERSION 1.0.0\n").is_ok());
    assert_eq!(check_well_formed("up 1\n"), Err("up 1".to_string()));
    assert!(check_well_formed("# TYPE up gauge\nup{a=\"x y\"} 1\n").is_ok());
    assert!(check_well_formed("# TYPE up gauge\nup one\n").is_err());
}
