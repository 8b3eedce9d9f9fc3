use crate::harness::Scenario;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memtrace")]
#[command(about = "Demo harness and trace-replay CLI for a store-tracing DBI core")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one of the built-in end-to-end scenarios through the real
    /// IR pass and runtime, printing the resulting trace.
    Demo {
        #[arg(value_enum)]
        scenario: Scenario,

        /// Write the trace here instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Drive the harness from a text script of alloc/free/store
    /// commands instead of a built-in scenario.
    Replay {
        /// Script file (see `memtrace replay --help` for the grammar).
        script: PathBuf,

        /// Gate stores against a live process's real `/proc/pid/maps`
        /// instead of the harness's synthetic application segment.
        #[arg(long)]
        pid: Option<u32>,

        /// Minimum tracked block size, in bytes.
        #[arg(long, default_value_t = 4096)]
        min_block_size: u64,

        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Summarize a previously captured trace file.
    Stats {
        /// Trace file, in the line format `demo`/`replay` produce.
        trace: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}
