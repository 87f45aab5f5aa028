//! The Shell owns the interpreter state (background jobs and the last known
//! statuses) and drives the read, parse, dispatch loop.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{self, ExitStatus};

use log::{debug, info, warn};

use super::builtins::Builtin;
use super::execute_command;
use super::job_control::JobTable;
use super::{Flow, ShellConfig, PROGRAM_NAME, PROMPT};
use crate::core::parser::Command;
use crate::core::reader::LineReader;
use crate::errors::{Error, Result, ResultExt};
use crate::util::ShExitStatusExt;

#[derive(Debug)]
pub struct Shell {
    config: ShellConfig,
    job_table: JobTable,
    /// Status of the last foreground process, reported by `status`.
    last_foreground_status: ExitStatus,
    last_background_status: Option<ExitStatus>,
}

impl Shell {
    /// Constructs a new Shell. No process-wide state is touched here; see
    /// `signals::install` for that.
    pub fn new(config: ShellConfig) -> Shell {
        Shell {
            config,
            job_table: JobTable::with_capacity(config.job_capacity()),
            last_foreground_status: ExitStatus::from_success(),
            last_background_status: None,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn last_foreground_status(&self) -> ExitStatus {
        self.last_foreground_status
    }

    pub(crate) fn set_last_foreground_status(&mut self, status: ExitStatus) {
        self.last_foreground_status = status;
    }

    pub fn last_background_status(&self) -> Option<ExitStatus> {
        self.last_background_status
    }

    pub fn job_table(&self) -> &JobTable {
        &self.job_table
    }

    pub(crate) fn job_table_mut(&mut self) -> &mut JobTable {
        &mut self.job_table
    }

    pub fn has_background_jobs(&self) -> bool {
        !self.job_table.is_empty()
    }

    /// Reports background jobs that have finished since the last check and
    /// frees their slots.
    pub fn check_jobs(&mut self, stdout: &mut dyn Write) -> Result<()> {
        if let Some(status) = self.job_table.poll(stdout)? {
            self.last_background_status = Some(status);
        }
        Ok(())
    }

    /// Parses and runs a single line of input.
    pub fn execute_command_string(&mut self, input: &str, stdout: &mut dyn Write) -> Result<Flow> {
        let command = Command::parse(input)?;
        debug!("parsed command: {:?}", command);
        self.execute_command(&command, stdout)
    }

    /// Dispatches a parsed command: blank lines and comments do nothing, builtins
    /// run in-process and everything else is launched as an external program.
    pub fn execute_command(&mut self, command: &Command, stdout: &mut dyn Write) -> Result<Flow> {
        if command.is_noop() {
            return Ok(Flow::Continue);
        }
        let name = match command.name {
            Some(ref name) => name,
            None => return Ok(Flow::Continue),
        };

        match Builtin::lookup(name) {
            Some(builtin) => {
                debug!("running builtin {}", builtin.name());
                builtin.run(self, &command.args, stdout)
            }
            None => {
                execute_command::launch(self, command, stdout)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Runs commands until `exit` or end of input.
    ///
    /// Recoverable errors are reported and the loop continues; fatal errors are
    /// returned.
    pub fn execute_from_reader<R: BufRead>(&mut self, reader: &mut LineReader<R>) -> Result<()> {
        let mut stdout = io::stdout();
        loop {
            let temp_result = self.check_jobs(&mut stdout);
            log_if_err!(temp_result, "check_jobs");

            if self.config.display_prompt() {
                write!(stdout, "{}", PROMPT)?;
                stdout.flush()?;
            }

            let line = match reader.read_line()? {
                Some(line) => line,
                None => {
                    info!("reached end of input");
                    break;
                }
            };

            match self.execute_command_string(&line, &mut stdout) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(e) => {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    report_error(&e);
                }
            }
        }

        if self.has_background_jobs() {
            info!(
                "leaving {} background job(s) running: {:?}",
                self.job_table.len(),
                self.job_table.pids()
            );
        }
        Ok(())
    }

    pub fn execute_from_stdin(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut reader = LineReader::new(stdin.lock(), process::id());
        self.execute_from_reader(&mut reader)
    }

    pub fn execute_commands_from_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).chain_err(|| format!("{}", path.display()))?;
        let mut reader = LineReader::new(BufReader::new(file), process::id());
        self.execute_from_reader(&mut reader)
    }
}

/// Prints an error perror-style, prefixed with the program name.
pub(crate) fn report_error(error: &Error) {
    warn!("{}", error.to_report());
    eprintln!("{}: {}", PROGRAM_NAME, error.to_report());
}
