//! Strip command implementation

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use voxdesk::stream::ThinkFilter;

/// Filter a think preamble from stdin, line by line as it arrives
pub fn strip_command() -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    let mut filter = ThinkFilter::new();

    for line in stdin.lock().lines() {
        let mut line = line.with_context(|| "Failed to read stdin")?;
        line.push('\n');
        if let Some(text) = filter.feed(&line) {
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    if let Some(text) = filter.finish() {
        stdout.write_all(text.as_bytes())?;
    }

    Ok(())
}
