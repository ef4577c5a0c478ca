//! Line-based console input shared by the interactive agents.

use crate::error::Result;
use std::io::{BufRead, Write};

/// What the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A non-empty line, trimmed.
    Line(String),
    /// `exit`, `quit` or end of input.
    Exit,
}

/// Whether a line ends the session.
pub fn is_exit(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Print `prompt` and read the next non-empty line.
pub fn next_input<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, prompt: &str) -> Result<Input> {
    loop {
        write!(writer, "{}", prompt)?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(Input::Exit);
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            return Ok(Input::Exit);
        }
        return Ok(Input::Line(line.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_until_exit() {
        let mut reader = Cursor::new("hello\n\n  world  \nQUIT\nignored\n");
        let mut out = Vec::new();

        assert_eq!(next_input(&mut reader, &mut out, "> ").unwrap(), Input::Line("hello".into()));
        assert_eq!(next_input(&mut reader, &mut out, "> ").unwrap(), Input::Line("world".into()));
        assert_eq!(next_input(&mut reader, &mut out, "> ").unwrap(), Input::Exit);
        assert_eq!(String::from_utf8(out).unwrap(), "> > > > ");
    }

    #[test]
    fn test_end_of_input_exits() {
        let mut reader = Cursor::new("");
        let mut out = Vec::new();
        assert_eq!(next_input(&mut reader, &mut out, "").unwrap(), Input::Exit);
    }
}
