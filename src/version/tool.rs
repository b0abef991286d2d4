//! External version tool
//!
//! Runs the configured program with flags built from `VersionOptions`,
//! streams its output line by line and extracts the version.

use crate::config::schema::ToolConfig;
use crate::diagnostics::{MessageLog, Verbosity};
use crate::error::{BuildMemoError, BuildMemoResult};
use crate::version::options::VersionOptions;
use crate::version::output::VersionCollector;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

/// Something that can calculate a version from options
///
/// The version task only depends on this trait, so tests can count
/// invocations without spawning processes.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Calculate the version, forwarding any diagnostics to `log`
    async fn calculate(
        &self,
        options: &VersionOptions,
        log: &dyn MessageLog,
    ) -> BuildMemoResult<String>;

    /// Human-readable name for logs
    fn source_name(&self) -> String;
}

/// Version source backed by an external executable
pub struct ExternalTool {
    config: ToolConfig,
}

impl ExternalTool {
    /// Create a tool runner from configuration
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Full argument list: configured leading args, then option flags
    pub fn args(&self, options: &VersionOptions) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.extend(options.to_args());
        args
    }

    /// Command line as displayed in logs and errors
    pub fn command_line(&self, options: &VersionOptions) -> String {
        let mut line = quote_arg(&self.config.program);
        for arg in self.args(options) {
            line.push(' ');
            line.push_str(&quote_arg(&arg));
        }
        line
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.contains(char::is_whitespace) {
        format!("\"{}\"", arg)
    } else {
        arg.to_string()
    }
}

#[async_trait]
impl VersionSource for ExternalTool {
    async fn calculate(
        &self,
        options: &VersionOptions,
        log: &dyn MessageLog,
    ) -> BuildMemoResult<String> {
        let importance = Verbosity::importance_of(options.verbosity.as_deref());
        let command_line = self.command_line(options);
        debug!("Executing: {}", command_line);

        let mut command = Command::new(&self.config.program);
        command
            .args(self.args(options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = options.work_dir {
            command.current_dir(dir);
        }

        let program = &self.config.program;
        let mut child = command
            .spawn()
            .map_err(|e| BuildMemoError::command_failed(program, &command_line, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BuildMemoError::Internal("tool stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BuildMemoError::Internal("tool stderr was not captured".to_string()))?;

        let mut collector = VersionCollector::new(self.config.diagnostic_prefix.clone());

        let run = async {
            let mut out_lines = BufReader::new(stdout).lines();
            let mut err_lines = BufReader::new(stderr).lines();
            let mut out_done = false;
            let mut err_done = false;

            while !(out_done && err_done) {
                tokio::select! {
                    line = out_lines.next_line(), if !out_done => {
                        match line.map_err(|e| BuildMemoError::io("reading tool stdout", e))? {
                            Some(line) => {
                                if let Some(passthrough) = collector.feed(line) {
                                    log.message(importance, &passthrough);
                                }
                            }
                            None => out_done = true,
                        }
                    }
                    line = err_lines.next_line(), if !err_done => {
                        match line.map_err(|e| BuildMemoError::io("reading tool stderr", e))? {
                            Some(line) => log.message(importance, &line),
                            None => err_done = true,
                        }
                    }
                }
            }

            child
                .wait()
                .await
                .map_err(|e| BuildMemoError::command_failed(program, &command_line, e))
        };

        let outcome = match self.config.timeout_secs {
            0 => Ok(run.await),
            secs => tokio::time::timeout(Duration::from_secs(secs), run).await,
        };

        let status: ExitStatus = match outcome {
            Ok(status) => status?,
            Err(_) => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to kill timed out tool: {}", e);
                }
                return Err(BuildMemoError::ToolTimeout {
                    command: command_line,
                    secs: self.config.timeout_secs,
                });
            }
        };

        match status.code() {
            Some(0) => collector.finish(&command_line),
            Some(code) => Err(BuildMemoError::ToolFailed {
                command: command_line,
                code,
            }),
            None => Err(BuildMemoError::ProcessSignaled),
        }
    }

    fn source_name(&self) -> String {
        self.config.program.clone()
    }
}
