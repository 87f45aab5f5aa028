//! Smallsh builtins
//!
//! This module includes the implementations of the builtin commands. They are
//! checked, in table order, before a command is launched as an external program.

use self::prelude::*;

use self::dirs::Cd;
use self::exit::Exit;
use self::status::Status;

pub mod prelude {
    pub use std::io::Write;

    pub use crate::errors::{Error, ErrorKind, Result, ResultExt};
    pub use crate::shell::{Flow, Shell};
    pub use crate::util::ShExitStatusExt;
}

mod dirs;
mod exit;
mod status;

/// Represents a builtin command such as cd or status.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run<T: AsRef<str>>(shell: &mut Shell, args: &[T], stdout: &mut dyn Write) -> Result<Flow>;
}

/// The closed set of builtins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    ChangeDirectory,
    Status,
}

/// Lookup order; the first matching name wins.
const BUILTINS: [(&str, Builtin); 3] = [
    (<Exit as BuiltinCommand>::NAME, Builtin::Exit),
    (<Cd as BuiltinCommand>::NAME, Builtin::ChangeDirectory),
    (<Status as BuiltinCommand>::NAME, Builtin::Status),
];

impl Builtin {
    /// Finds the builtin registered under `name`, if any.
    pub fn lookup(name: &str) -> Option<Builtin> {
        BUILTINS
            .iter()
            .find(|&&(builtin_name, _)| builtin_name == name)
            .map(|&(_, builtin)| builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => Exit::NAME,
            Builtin::ChangeDirectory => Cd::NAME,
            Builtin::Status => Status::NAME,
        }
    }

    pub fn run<T: AsRef<str>>(
        self,
        shell: &mut Shell,
        args: &[T],
        stdout: &mut dyn Write,
    ) -> Result<Flow> {
        match self {
            Builtin::Exit => Exit::run(shell, args, stdout),
            Builtin::ChangeDirectory => Cd::run(shell, args, stdout),
            Builtin::Status => Status::run(shell, args, stdout),
        }
    }
}
