//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

#![allow(missing_docs)]

use std::error::Error as StdError;

error_chain! {
    foreign_links {
        Docopt(::docopt::Error);
        Io(::std::io::Error);
        Log(::log::SetLoggerError);
        Nix(::nix::Error);
    }

    errors {
        LineTooLong(max: usize) {
            description("command length maximum exceeded")
            display("command length maximum exceeded ({} bytes)", max)
        }
        TooManyArguments(max: usize) {
            description("too many arguments")
            display("too many arguments (limit {})", max)
        }
        TooManyJobs(capacity: usize) {
            description("too many background jobs")
            display("too many background jobs (limit {})", capacity)
        }
        BadFile(path: String) {
            description("cannot open redirection target")
            display("{}", path)
        }
        InvalidArgument(arg: String) {
            description("argument contains a nul byte")
            display("{}: argument contains a nul byte", arg)
        }
        Fork {
            description("fork() failed")
            display("fork() failed")
        }
        ReadInput {
            description("failed to read input")
            display("failed to read input")
        }
        BuiltinCommand(message: String, code: i32) {
            description("builtin command error")
            display("{}", message)
        }
    }
}

impl Error {
    pub(crate) fn builtin_command<T: AsRef<str>>(message: T, code: i32) -> Error {
        ErrorKind::BuiltinCommand(message.as_ref().to_string(), code).into()
    }

    /// Fatal errors end the interpreter; everything else is reported and the loop continues.
    pub fn is_fatal(&self) -> bool {
        match *self.kind() {
            ErrorKind::LineTooLong(_) | ErrorKind::Fork | ErrorKind::ReadInput => true,
            _ => false,
        }
    }

    /// Formats the error and its causes perror-style, e.g. `in.txt: No such file or directory`.
    pub fn to_report(&self) -> String {
        let mut parts = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(e) = current {
            parts.push(describe(e));
            current = e.source();
        }
        parts.join(": ")
    }
}

fn describe(e: &(dyn StdError + 'static)) -> String {
    if let Some(errno) = e.downcast_ref::<::nix::Error>() {
        return errno.desc().to_string();
    }
    if let Some(io_error) = e.downcast_ref::<::std::io::Error>() {
        return describe_io(io_error);
    }
    match e.downcast_ref::<Error>() {
        Some(Error(ErrorKind::Nix(errno), _)) => errno.desc().to_string(),
        Some(Error(ErrorKind::Io(io_error), _)) => describe_io(io_error),
        _ => e.to_string(),
    }
}

fn describe_io(e: &::std::io::Error) -> String {
    match e.raw_os_error() {
        Some(code) => ::nix::errno::Errno::from_raw(code).desc().to_string(),
        None => e.to_string(),
    }
}
