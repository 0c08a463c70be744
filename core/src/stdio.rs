//! Standard stream helpers for command handlers.
//!
//! Parsing never touches the process streams; these are for handlers that
//! accept input on stdin or change output when piped.

use std::io::{self, IsTerminal, Read};

/// Returns `true` if stdin is not an interactive terminal, i.e. something is
/// piped or redirected in.
pub fn has_stdin() -> bool {
    !io::stdin().is_terminal()
}

/// Returns `true` if stdout is a pipe.
#[cfg(unix)]
pub fn has_pipe() -> bool {
    use std::fs::File;
    use std::os::fd::AsFd;
    use std::os::unix::fs::FileTypeExt;

    let Ok(fd) = io::stdout().as_fd().try_clone_to_owned() else {
        return false;
    };
    File::from(fd)
        .metadata()
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false)
}

/// Returns `true` if stdout is not a terminal.
#[cfg(not(unix))]
pub fn has_pipe() -> bool {
    !io::stdout().is_terminal()
}

/// Reads all of stdin. Returns nothing when stdin is a terminal.
pub fn read_stdin() -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if has_stdin() {
        io::stdin().lock().read_to_end(&mut buf)?;
    }
    Ok(buf)
}

/// Newline-separated records from stdin; empty when stdin is a terminal.
pub fn stdin_args() -> io::Result<Vec<String>> {
    if !has_stdin() {
        return Ok(Vec::new());
    }
    read_records(io::stdin().lock())
}

/// Reads `reader` to the end, trims surrounding whitespace and splits the
/// rest on `\n`. Blank input yields no records; `\r\n` endings are accepted.
pub fn read_records<R: Read>(mut reader: R) -> io::Result<Vec<String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    Ok(text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect())
}
