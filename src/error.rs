use std::io;
use thiserror::Error;

/// Error type shared by every exporter
#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Executable not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {}", describe_code(.code))]
    CommandFailed { program: String, code: Option<i32> },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Result type alias for the exporters
pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    pub fn tool_not_found<S: Into<String>>(program: S) -> Self {
        ExporterError::ToolNotFound(program.into())
    }

    pub fn spawn<S: Into<String>>(program: S, source: io::Error) -> Self {
        ExporterError::Spawn {
            program: program.into(),
            source,
        }
    }

    pub fn command_failed<S: Into<String>>(program: S, code: Option<i32>) -> Self {
        ExporterError::CommandFailed {
            program: program.into(),
            code,
        }
    }
}
