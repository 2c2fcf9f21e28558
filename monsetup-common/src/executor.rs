use std::cell::RefCell;
use std::fmt;
use std::process::{Child, Command};
use std::thread;

use crate::error::{MonsetupError, ProcessError};
use crate::Result;

/// How external tools get run.
///
/// Queries are awaited and their stdout returned. Everything that changes
/// external state goes through `dispatch`, which starts the command and
/// returns immediately: nothing downstream depends on the outcome, and each
/// call targets a separate output, desktop, or rule.
pub trait Executor {
    fn query(&self, cmd: Command) -> Result<String>;
    fn dispatch(&self, cmd: Command);
}

/// Printable snapshot of a `Command`: program, arguments, and env overrides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandRecord {
    pub program: String,
    pub args: Vec<String>,
    /// `None` values are removals from the inherited environment.
    pub envs: Vec<(String, Option<String>)>,
}

impl CommandRecord {
    pub fn from_command(cmd: &Command) -> Self {
        let mut envs: Vec<(String, Option<String>)> = cmd
            .get_envs()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().to_string(),
                    v.map(|v| v.to_string_lossy().to_string()),
                )
            })
            .collect();
        envs.sort();

        Self {
            program: cmd.get_program().to_string_lossy().to_string(),
            args: cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect(),
            envs,
        }
    }

    /// Program and arguments joined with spaces, without env overrides.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn env(&self, key: &str) -> Option<Option<&str>> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            match value {
                Some(value) => write!(f, "{}={} ", key, value)?,
                None => write!(f, "-u {} ", key)?,
            }
        }
        f.write_str(&self.command_line())
    }
}

/// Runs commands as real child processes.
#[derive(Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn watch(record: CommandRecord, mut child: Child) {
        // Detached: the process may exit before the child does, in which case
        // the outcome is simply never observed.
        let spawned = thread::Builder::new()
            .name("dispatch-watch".to_string())
            .spawn(move || match child.wait() {
                Ok(status) if !status.success() => {
                    log::warn!(
                        "Dispatched command exited with {}: {}",
                        status.code().unwrap_or(-1),
                        record
                    );
                }
                Ok(_) => log::debug!("Dispatched command finished: {}", record),
                Err(e) => log::warn!("Failed to wait for {}: {}", record, e),
            });

        if let Err(e) = spawned {
            log::debug!("Could not start watcher thread: {}", e);
        }
    }
}

impl Executor for ProcessExecutor {
    fn query(&self, mut cmd: Command) -> Result<String> {
        let record = CommandRecord::from_command(&cmd);
        log::debug!("Executing: {}", record);

        let output = cmd.output().map_err(|e| {
            MonsetupError::Process(ProcessError::Execution {
                command: record.command_line(),
                source: e,
            })
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!(
                "{} failed with exit code {}: {}",
                record.command_line(),
                output.status.code().unwrap_or(-1),
                stderr
            );
            return Err(MonsetupError::Process(ProcessError::NonZeroExit {
                command: record.command_line(),
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.to_string(),
            }));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn dispatch(&self, mut cmd: Command) {
        let record = CommandRecord::from_command(&cmd);
        log::info!("Dispatching: {}", record);

        match cmd.spawn() {
            Ok(child) => Self::watch(record, child),
            Err(e) => log::warn!("Failed to start {}: {}", record.command_line(), e),
        }
    }
}

/// Runs queries for real but only prints what would be dispatched.
#[derive(Default)]
pub struct DryRunExecutor {
    inner: ProcessExecutor,
    dispatched: RefCell<Vec<CommandRecord>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<CommandRecord> {
        self.dispatched.borrow().clone()
    }
}

impl Executor for DryRunExecutor {
    fn query(&self, cmd: Command) -> Result<String> {
        self.inner.query(cmd)
    }

    fn dispatch(&self, cmd: Command) {
        let record = CommandRecord::from_command(&cmd);
        log::info!("Dry run, not dispatching: {}", record);
        println!("{}", record);
        self.dispatched.borrow_mut().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_captures_env_overlay() {
        let mut cmd = Command::new("bash");
        cmd.arg("/home/user/.config/polybar/launch.sh")
            .env("MAIN_MONITOR", "DP-1")
            .env_remove("SECONDARY_MONITOR");

        let record = CommandRecord::from_command(&cmd);
        assert_eq!(record.command_line(), "bash /home/user/.config/polybar/launch.sh");
        assert_eq!(record.env("MAIN_MONITOR"), Some(Some("DP-1")));
        assert_eq!(record.env("SECONDARY_MONITOR"), Some(None));
        assert_eq!(record.env("HOME"), None);
        assert_eq!(
            record.to_string(),
            "MAIN_MONITOR=DP-1 -u SECONDARY_MONITOR bash /home/user/.config/polybar/launch.sh"
        );
    }

    #[test]
    fn test_query_missing_binary_is_execution_error() {
        let executor = ProcessExecutor::new();
        let result = executor.query(Command::new("/nonexistent/monsetup-test-binary"));

        match result {
            Err(MonsetupError::Process(ProcessError::Execution { command, .. })) => {
                assert_eq!(command, "/nonexistent/monsetup-test-binary");
            }
            other => panic!("Expected ProcessError::Execution, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_dispatch_missing_binary_does_not_fail() {
        ProcessExecutor::new().dispatch(Command::new("/nonexistent/monsetup-test-binary"));
    }

    #[test]
    fn test_dry_run_records_dispatch() {
        let executor = DryRunExecutor::new();
        let mut cmd = Command::new("bspc");
        cmd.args(["monitor", "DP-1", "-d", "1", "2"]);
        executor.dispatch(cmd);

        let dispatched = executor.dispatched();
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].command_line(), "bspc monitor DP-1 -d 1 2");
    }
}
