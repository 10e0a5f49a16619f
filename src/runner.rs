//! External command execution primitives.
//!
//! Every component in the crate drives `docker`, `minikube`, and `kubectl`
//! exclusively through the [`CommandRunner`] trait so tests can substitute a
//! scripted double. The [`StreamingCommandRunner`] used by the binary echoes
//! each command line before execution and forwards child output to the
//! operator while capturing it for callers.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use shell_escape::unix::escape;
use thiserror::Error;

/// Result of running an external command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandOutput {
    /// Exit code reported by the process, if available.
    pub code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// Returns `true` when the exit code equals zero.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Errors raised while executing external commands.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CommandError {
    /// Raised when the command cannot be started at all.
    #[error("failed to start {program}: {message}")]
    Spawn {
        /// Program that could not be spawned.
        program: String,
        /// Operating system error message.
        message: String,
    },
    /// Raised when a command required to succeed exits non-zero.
    #[error("{program} exited with status {status_text}: {stderr}")]
    Failure {
        /// Program that failed.
        program: String,
        /// Exit status reported by the OS.
        status: Option<i32>,
        /// Human readable representation of the exit status.
        status_text: String,
        /// Stderr captured from the command.
        stderr: String,
    },
}

impl CommandError {
    /// Returns the underlying command exit status when one exists.
    #[must_use]
    pub const fn status(&self) -> Option<i32> {
        match self {
            Self::Spawn { .. } => None,
            Self::Failure { status, .. } => *status,
        }
    }
}

/// Renders a program and its arguments as an operator-readable shell line.
#[must_use]
pub fn render_command_line(program: &str, args: &[OsString]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        let text = arg.to_string_lossy().into_owned();
        rendered.push_str(escape(text.into()).as_ref());
    }
    rendered
}

/// Abstraction over command execution to support fakes in tests.
pub trait CommandRunner {
    /// Runs `program` with the given arguments, capturing stdout and stderr.
    ///
    /// A non-zero exit is not an error at this level; callers that require
    /// success use [`CommandRunner::run_checked`], while status probes inspect
    /// the returned [`CommandOutput`] directly.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the command cannot be started.
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError>;

    /// Runs the command and converts a non-zero exit into
    /// [`CommandError::Failure`].
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Spawn`] if the command cannot be started and
    /// [`CommandError::Failure`] when it exits non-zero.
    fn run_checked(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        let output = self.run(program, args)?;
        if output.is_success() {
            return Ok(output);
        }
        let status_text = output
            .code
            .map_or_else(|| String::from("unknown"), |code| code.to_string());
        Err(CommandError::Failure {
            program: program.to_owned(),
            status: output.code,
            status_text,
            stderr: output.stderr,
        })
    }
}

/// Real command runner that captures output without forwarding it.
#[derive(Clone, Debug, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|err| CommandError::Spawn {
                program: program.to_owned(),
                message: err.to_string(),
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Command runner that echoes the command line and forwards child output to
/// the operator's terminal while also capturing it.
#[derive(Clone, Debug, Default)]
pub struct StreamingCommandRunner;

impl CommandRunner for StreamingCommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> Result<CommandOutput, CommandError> {
        writeln!(io::stderr(), "$ {}", render_command_line(program, args)).ok();

        let spawn_error = |err: &io::Error| CommandError::Spawn {
            program: program.to_owned(),
            message: err.to_string(),
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_error(&err))?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_thread = thread::spawn(move || match stdout_pipe {
            Some(pipe) => tee(pipe, io::stdout()),
            None => String::new(),
        });
        let stderr_thread = thread::spawn(move || match stderr_pipe {
            Some(pipe) => tee(pipe, io::stderr()),
            None => String::new(),
        });

        let status = child.wait().map_err(|err| spawn_error(&err))?;
        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        Ok(CommandOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

/// Copies `source` to `sink` chunk by chunk, returning the captured text.
fn tee(mut source: impl Read, mut sink: impl Write) -> String {
    let mut captured = Vec::new();
    let mut buffer = [0_u8; 4096];
    loop {
        match source.read(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(read) => {
                let Some(chunk) = buffer.get(..read) else {
                    break;
                };
                sink.write_all(chunk).ok();
                sink.flush().ok();
                captured.extend_from_slice(chunk);
            }
        }
    }
    String::from_utf8_lossy(&captured).into_owned()
}
