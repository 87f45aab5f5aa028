//! Smallsh - a small interactive shell
//!
//! Reads one line at a time, runs the `exit`, `cd` and `status` builtins
//! in-process, launches everything else with optional `<`/`>` redirection, and
//! keeps a bounded table of background (`&`) jobs that is polled before each
//! prompt.

#![warn(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
extern crate error_chain;

#[macro_use]
mod util;

pub mod core;
pub mod errors;
pub mod shell;

pub use crate::shell::{Flow, Shell, ShellConfig};
pub use crate::util::ShExitStatusExt;
