//! External process execution
//!
//! Every external binary (provider CLIs, ssh/scp, terraform, ansible,
//! kubectl) is invoked through the [`CommandRunner`] trait so the
//! orchestration logic can be exercised in tests with a scripted runner.

use std::path::Path;
use std::process::{Command, Stdio};

use console::Style;

use crate::error::{KcdError, Result};

/// Captured result of a finished external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    /// stderr if non-empty, otherwise the exit code, for error reporting
    pub fn failure_reason(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            match self.status_code {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            }
        } else {
            stderr.to_string()
        }
    }
}

/// Abstract process execution collaborator
pub trait CommandRunner {
    /// Run a command, capturing stdout and stderr
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Run a command in a directory with inherited stdio, returning only the
    /// exit status (used for long-running terraform/ansible invocations whose
    /// output should stream to the operator)
    fn run_streaming(&self, dir: Option<&Path>, program: &str, args: &[String])
    -> Result<Option<i32>>;
}

/// Runner backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn echo(&self, program: &str, args: &[String]) {
        if self.verbose {
            eprintln!(
                "{}",
                Style::new().dim().apply_to(format_invocation(program, args))
            );
        }
    }
}

/// Render a command line the way it would be typed at a shell prompt
pub fn format_invocation(program: &str, args: &[String]) -> String {
    let mut line = format!("$ {}", program);
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push('\'');
            line.push_str(arg);
            line.push('\'');
        } else {
            line.push_str(arg);
        }
    }
    line
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        self.echo(program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| KcdError::SpawnFailed {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        Ok(CommandOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_streaming(
        &self,
        dir: Option<&Path>,
        program: &str,
        args: &[String],
    ) -> Result<Option<i32>> {
        self.echo(program, args);
        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = dir {
            command.current_dir(dir);
        }

        let status = command.status().map_err(|e| KcdError::SpawnFailed {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

        Ok(status.code())
    }
}

/// Convenience for building owned argument vectors
pub fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| (*s).to_string()).collect()
}
