use crate::error::Result;
use crate::harness::{run_scenario, Scenario};
use crate::sink::TextSink;
use std::fs::File;
use std::io;
use std::path::Path;

/// Runs one of the built-in end-to-end scenarios through the real
/// `memtrace-ir` + `memtrace-core` stack, writing the resulting trace
/// to stdout or `output`.
pub fn run(scenario: Scenario, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut sink = TextSink::new(File::create(path)?);
            run_scenario(scenario, &mut sink)?;
        }
        None => {
            let mut sink = TextSink::new(io::stdout().lock());
            run_scenario(scenario, &mut sink)?;
        }
    }
    Ok(())
}
