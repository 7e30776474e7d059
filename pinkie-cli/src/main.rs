//! Pinkie CLI: load and run instruction listings.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input or usage error, or unresolved labels found by `check`
//! - 3: Runtime error
//! - otherwise: the status passed to `native_exit`

mod commands;
mod logging;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use pinkie_vm::DEFAULT_HEAP_SIZE;

use crate::logging::LogLevel;

/// Label called by the bootstrap unless `--entry` says otherwise.
pub const DEFAULT_ENTRY: &str = "func_main";

#[derive(Parser)]
#[command(
    name = "pinkie",
    version,
    about = "Run Pinkie instruction listings",
    long_about = "Loads a textual instruction listing, prefixes it with a bootstrap that calls the entry label, and executes it on the Pinkie VM."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and execute a listing
    Run(RunArgs),
    /// Load a listing and report unresolved labels and unknown opcodes
    Check(CheckArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Listing to execute
    source: PathBuf,
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEAP_SIZE)]
    /// Heap size in bytes
    heap_size: usize,
    #[arg(short = 'e', long, default_value = DEFAULT_ENTRY)]
    /// Label the bootstrap calls
    entry: String,
    #[arg(long)]
    /// Allow OUT to addresses that are not allocated
    unsafe_heap: bool,
    #[arg(short = 'v', long)]
    /// Log calls, jumps and heap traffic to stderr
    verbose: bool,
    #[arg(long, value_parser = LogLevel::from_arg)]
    /// Log level (error, warn, info, debug, trace); PINKIE_LOG takes precedence
    log_level: Option<LogLevel>,
}

#[derive(Args)]
struct CheckArgs {
    /// Listing to check
    source: PathBuf,
    #[arg(short = 'e', long, default_value = DEFAULT_ENTRY)]
    /// Label the bootstrap calls
    entry: String,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    let result = match cli.command {
        Command::Run(args) => {
            logging::init(logging::effective_level(args.log_level, args.verbose));
            commands::run(&args)
        }
        Command::Check(args) => {
            logging::init(LogLevel::Warn);
            commands::check(&args)
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
