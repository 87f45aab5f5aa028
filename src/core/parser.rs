//! Smallsh Parser

use crate::errors::{ErrorKind, Result};

/// Maximum number of arguments (not counting the program name) on one line.
pub const MAX_ARGUMENTS: usize = 512;

const TOKEN_SEPARATOR: char = ' ';
const INPUT_MARKER: &str = "<";
const OUTPUT_MARKER: &str = ">";
const BACKGROUND_MARKER: &str = "&";
const COMMENT_PREFIX: char = '#';

/// Represents all information associated with one line of user input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Command {
    /// The program or builtin to run; `None` for a blank line.
    pub name: Option<String>,
    /// The arguments to the program, in order.
    pub args: Vec<String>,
    /// The name of the input file, if one is specified
    pub infile: Option<String>,
    /// The file to write stdout to, if one is specified
    pub outfile: Option<String>,
    /// Run the command in the background, defaults to false
    pub background: bool,
}

impl Command {
    /// Parses a line of input into a `Command`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smallsh::core::parser::{Command, CommandBuilder};
    ///
    /// let command = Command::parse("sort -r < in.txt > out.txt &").unwrap();
    /// let mut expected = CommandBuilder::new("sort");
    /// expected.arg("-r").infile("in.txt").outfile("out.txt").background(true);
    /// assert_eq!(command, expected.build());
    /// ```
    pub fn parse(line: &str) -> Result<Command> {
        let mut tokens = line
            .split(TOKEN_SEPARATOR)
            .filter(|token| !token.is_empty())
            .peekable();

        let mut command = Command {
            name: tokens.next().map(String::from),
            ..Default::default()
        };

        while let Some(token) = tokens.next() {
            match token {
                INPUT_MARKER => command.infile = tokens.next().map(String::from),
                OUTPUT_MARKER => command.outfile = tokens.next().map(String::from),
                BACKGROUND_MARKER if tokens.peek().is_none() => command.background = true,
                _ => {
                    if command.args.len() == MAX_ARGUMENTS {
                        return Err(ErrorKind::TooManyArguments(MAX_ARGUMENTS).into());
                    }
                    command.args.push(token.to_string());
                }
            }
        }

        Ok(command)
    }

    /// True for a line with no tokens.
    pub fn is_blank(&self) -> bool {
        self.name.is_none()
    }

    /// True when the first token starts with `#`.
    pub fn is_comment(&self) -> bool {
        self.name
            .as_ref()
            .map_or(false, |name| name.starts_with(COMMENT_PREFIX))
    }

    /// Blank lines and comments are not executed.
    pub fn is_noop(&self) -> bool {
        self.is_blank() || self.is_comment()
    }
}

/// Builds Commands.
#[derive(Clone, Debug)]
pub struct CommandBuilder {
    command: Command,
}

impl CommandBuilder {
    /// Construct a new `CommandBuilder` for `name`, with the following default
    /// configuration:
    ///
    /// * No arguments
    /// * No input/output redirection
    /// * Runs in foreground
    pub fn new(name: &str) -> CommandBuilder {
        CommandBuilder {
            command: Command {
                name: Some(String::from(name)),
                ..Default::default()
            },
        }
    }

    /// Add an argument to pass to the program.
    pub fn arg(&mut self, arg: &str) -> &mut CommandBuilder {
        self.command.args.push(String::from(arg));
        self
    }

    /// Add arguments to pass to the program.
    pub fn args(&mut self, args: &[&str]) -> &mut CommandBuilder {
        self.command
            .args
            .extend(args.iter().map(|x| (*x).to_owned()));
        self
    }

    /// Add input redirection from the specified filename.
    pub fn infile(&mut self, filename: &str) -> &mut CommandBuilder {
        self.command.infile = Some(String::from(filename));
        self
    }

    /// Add output redirection to the specified filename.
    pub fn outfile(&mut self, filename: &str) -> &mut CommandBuilder {
        self.command.outfile = Some(String::from(filename));
        self
    }

    /// Configure the command to run in the background.
    pub fn background(&mut self, background: bool) -> &mut CommandBuilder {
        self.command.background = background;
        self
    }

    /// Build the final command.
    pub fn build(&self) -> Command {
        self.command.clone()
    }
}
