//! Turning raw input into commands: line reading with `$$` expansion, then parsing.

pub mod parser;
pub mod reader;
