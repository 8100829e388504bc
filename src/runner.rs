use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Executes external commands (`ip`, `kubectl`).
pub trait Runner {
    /// Runs a command and returns its stdout unmodified on success.
    /// Parameters: `program` (&str) executable name.
    /// Parameters: `args` (&[&str]) argument list.
    /// Returns: Result<String> with raw stdout or an error carrying stderr.
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runner implementation that invokes system binaries.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        // Capture stderr so kubectl and ip failures carry their message.
        tracing::debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to run {program}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} failed ({}): {}", output.status, stderr.trim());
        }

        // Callers decide about whitespace; log output must keep it.
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// A command a runner was asked to execute.
pub struct CommandRecord {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandRecord {
    fn key(&self) -> String {
        let mut key = self.program.clone();
        for arg in &self.args {
            key.push(' ');
            key.push_str(arg);
        }
        key
    }
}

#[derive(Debug, Default)]
/// Test runner with scripted replies keyed by the full command line.
pub struct FakeRunner {
    replies: HashMap<String, std::result::Result<String, String>>,
    pub calls: Mutex<Vec<CommandRecord>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to `command` (program and args joined by spaces) with `stdout`.
    pub fn respond(mut self, command: &str, stdout: &str) -> Self {
        self.replies
            .insert(command.to_string(), Ok(stdout.to_string()));
        self
    }

    /// Makes `command` fail with `stderr`.
    pub fn fail(mut self, command: &str, stderr: &str) -> Self {
        self.replies
            .insert(command.to_string(), Err(stderr.to_string()));
        self
    }

    pub fn recorded(&self) -> Vec<CommandRecord> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Runner for FakeRunner {
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        let record = CommandRecord {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        };
        // Record every call, including ones without a scripted reply.
        let key = record.key();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(record);
        }

        match self.replies.get(&key) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => bail!("{program} failed: {stderr}"),
            None => bail!("unexpected command: {key}"),
        }
    }
}
