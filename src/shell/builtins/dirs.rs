use std::env;
use std::path::PathBuf;

use log::debug;

use crate::shell::builtins::{self, prelude::*};

pub struct Cd;

impl builtins::BuiltinCommand for Cd {
    const NAME: &'static str = "cd";

    /// Changes the current directory to the first argument, or to `$HOME` when
    /// there is none. Extra arguments are ignored.
    fn run<T: AsRef<str>>(_shell: &mut Shell, args: &[T], _stdout: &mut dyn Write) -> Result<Flow> {
        let dir = match args.first() {
            Some(dir) => PathBuf::from(dir.as_ref()),
            None => env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or_else(|| Error::builtin_command("cd: HOME not set", 1))?,
        };

        env::set_current_dir(&dir).chain_err(|| {
            ErrorKind::BuiltinCommand(format!("cd: {}", dir.display()), 1)
        })?;
        debug!("changed directory to {}", dir.display());
        Ok(Flow::Continue)
    }
}
