//! Config command for printing the effective configuration.

use std::io::Write;

use anyhow::Result;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, config)?;
    writeln!(writer)?;
    Ok(())
}
