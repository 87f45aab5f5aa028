use log::info;

use crate::shell::builtins::{self, prelude::*};

pub struct Exit;

impl builtins::BuiltinCommand for Exit {
    const NAME: &'static str = "exit";

    /// Arguments are ignored and the shell always exits with status 0. Running
    /// background jobs are left alone.
    fn run<T: AsRef<str>>(shell: &mut Shell, _args: &[T], _stdout: &mut dyn Write) -> Result<Flow> {
        if shell.has_background_jobs() {
            info!(
                "exit requested with {} background job(s) still running",
                shell.job_table().len()
            );
        }
        Ok(Flow::Exit)
    }
}
