//! Executor double for tests: canned query output keyed by command line, and
//! a log of everything dispatched.

use std::cell::RefCell;
use std::collections::HashMap;
use std::process::Command;

use crate::error::{MonsetupError, ProcessError};
use crate::executor::{CommandRecord, Executor};
use crate::Result;

#[derive(Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, std::result::Result<String, String>>,
    queries: RefCell<Vec<CommandRecord>>,
    dispatched: RefCell<Vec<CommandRecord>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command_line` (e.g. `"xrandr --query"`) with `stdout`.
    pub fn respond(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Ok(stdout.to_string()));
        self
    }

    /// Make `command_line` exit non-zero with `stderr`.
    pub fn fail(mut self, command_line: &str, stderr: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Err(stderr.to_string()));
        self
    }

    pub fn queries(&self) -> Vec<CommandRecord> {
        self.queries.borrow().clone()
    }

    pub fn dispatched(&self) -> Vec<CommandRecord> {
        self.dispatched.borrow().clone()
    }

    /// Dispatched command lines, in dispatch order.
    pub fn dispatched_lines(&self) -> Vec<String> {
        self.dispatched
            .borrow()
            .iter()
            .map(CommandRecord::command_line)
            .collect()
    }
}

impl Executor for ScriptedExecutor {
    fn query(&self, cmd: Command) -> Result<String> {
        let record = CommandRecord::from_command(&cmd);
        let line = record.command_line();
        self.queries.borrow_mut().push(record);

        match self.responses.get(&line) {
            Some(Ok(stdout)) => Ok(stdout.clone()),
            Some(Err(stderr)) => Err(MonsetupError::Process(ProcessError::NonZeroExit {
                command: line,
                code: 1,
                stderr: stderr.clone(),
            })),
            None => Err(MonsetupError::Process(ProcessError::Execution {
                command: line,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no scripted response"),
            })),
        }
    }

    fn dispatch(&self, cmd: Command) {
        self.dispatched
            .borrow_mut()
            .push(CommandRecord::from_command(&cmd));
    }
}
