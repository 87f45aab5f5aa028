pub use self::shell::Shell;

pub mod builtins;
pub mod execute_command;
pub mod job_control;
pub mod signals;
#[allow(clippy::module_inception)]
mod shell;

/// Prefix used for every error message the shell prints.
pub const PROGRAM_NAME: &str = "smallsh";

/// Printed before each line is read in interactive mode.
pub const PROMPT: &str = ": ";

/// Number of background jobs that may run at once unless configured otherwise.
pub const DEFAULT_JOB_CAPACITY: usize = 5;

/// What the main loop should do after a command finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Maximum number of background jobs running at the same time. Launches past
    /// this limit are refused.
    job_capacity: usize,

    /// Determines if the prompt is printed before each line is read.
    display_prompt: bool,
}

impl ShellConfig {
    /// Creates a shell reading from a terminal or pipe, printing a prompt before each line.
    pub fn interactive(job_capacity: usize) -> Self {
        Self {
            job_capacity,
            display_prompt: true,
        }
    }

    /// Creates a shell running a script: no prompt is displayed.
    pub fn noninteractive(job_capacity: usize) -> Self {
        Self {
            job_capacity,
            display_prompt: false,
        }
    }

    pub fn job_capacity(&self) -> usize {
        self.job_capacity
    }

    pub fn display_prompt(&self) -> bool {
        self.display_prompt
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::interactive(DEFAULT_JOB_CAPACITY)
    }
}
