//! Reads input lines byte by byte, expanding `$$` to the shell's pid as it goes.

use std::io::{self, BufRead};

use log::trace;

use crate::errors::{ErrorKind, Result, ResultExt};

/// Lines (after expansion) must stay strictly below this many bytes.
pub const MAX_LINE_LENGTH: usize = 2048;

const EXPANSION_MARKER: u8 = b'$';

#[derive(Debug)]
pub struct LineReader<R> {
    input: R,
    pid: String,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a reader whose `$$` expansions produce `pid`.
    pub fn new(input: R, pid: u32) -> LineReader<R> {
        LineReader {
            input,
            pid: pid.to_string(),
        }
    }

    /// Reads the next line without its trailing newline.
    ///
    /// Returns `Ok(None)` once the input is exhausted. A final line without a
    /// newline is still returned.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut line: Vec<u8> = Vec::new();
        let mut pending_marker = false;
        let mut read_any = false;

        loop {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None if read_any => break,
                None => return Ok(None),
            };
            read_any = true;

            if byte == b'\n' {
                break;
            }

            if byte == EXPANSION_MARKER {
                if pending_marker {
                    line.pop();
                    line.extend_from_slice(self.pid.as_bytes());
                    pending_marker = false;
                } else {
                    line.push(byte);
                    pending_marker = true;
                }
            } else {
                line.push(byte);
                pending_marker = false;
            }

            if line.len() >= MAX_LINE_LENGTH {
                return Err(ErrorKind::LineTooLong(MAX_LINE_LENGTH).into());
            }
        }

        let line = String::from_utf8_lossy(&line).into_owned();
        trace!("read line: {:?}", line);
        Ok(Some(line))
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = loop {
            match self.input.fill_buf() {
                Ok(buf) => match buf.first() {
                    Some(&byte) => break byte,
                    None => return Ok(None),
                },
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).chain_err(|| ErrorKind::ReadInput),
            }
        };
        self.input.consume(1);
        Ok(Some(byte))
    }
}
