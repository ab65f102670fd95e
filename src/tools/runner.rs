// External tool invocation
//
// Every compiler and translator call goes through ToolRunner::run. Calls are
// blocking: the caller is suspended until the tool exits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Failure of one external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Executable missing or not runnable
    #[error("Failed to start {tool:?}: {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tool ran and exited non-zero
    #[error("{tool:?} exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Failed {
        tool: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr)
    }
}

/// Runs an external tool and hands back its standard output.
pub trait ToolRunner {
    fn run(&self, tool: &Path, args: &[OsString]) -> Result<Vec<u8>, ToolError>;
}

/// Spawns real processes with std::process::Command.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, tool: &Path, args: &[OsString]) -> Result<Vec<u8>, ToolError> {
        log::debug!("Running {} {}", tool.display(), display_args(args));

        let output = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: tool.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: tool.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        Ok(output.stdout)
    }
}

fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
