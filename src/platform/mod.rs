// Process boundary: tool lookup and execution

pub mod command;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
