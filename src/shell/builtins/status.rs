use crate::shell::builtins::{self, prelude::*};

pub struct Status;

impl builtins::BuiltinCommand for Status {
    const NAME: &'static str = "status";

    /// Prints the exit value or terminating signal of the last foreground process.
    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], stdout: &mut dyn Write) -> Result<Flow> {
        writeln!(stdout, "{}", shell.last_foreground_status().describe())?;
        stdout.flush()?;
        Ok(Flow::Continue)
    }
}
