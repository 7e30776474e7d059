//! CLI command implementations.

use std::fs;
use std::io;
use std::path::Path;

use pinkie_common::Program;
use pinkie_vm::builtins::register_builtins;
use pinkie_vm::{NativeRegistry, Outcome, RunOptions};
use tracing::debug;

use crate::{CheckArgs, RunArgs};

/// Load and execute a listing.
///
/// `Err` carries the process exit status. A `native_exit` status of 0 is
/// reported as success.
pub fn run(args: &RunArgs) -> Result<(), i32> {
    let program = read_listing(&args.source, &args.entry)?;

    let mut natives = NativeRegistry::new();
    register_builtins(&mut natives, io::stdout());

    let options = RunOptions {
        heap_size: args.heap_size,
        unsafe_heap: args.unsafe_heap,
    };
    debug!(
        "running {} from {} with a {}-byte heap",
        args.source.display(),
        args.entry,
        options.heap_size
    );

    match pinkie_vm::run(&program, natives, options) {
        Ok(Outcome::Halted) => Ok(()),
        Ok(Outcome::Exited(0)) => Ok(()),
        Ok(Outcome::Exited(code)) => Err(code),
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Load a listing and report what would fail or be skipped at run time.
pub fn check(args: &CheckArgs) -> Result<(), i32> {
    let program = read_listing(&args.source, &args.entry)?;
    let diagnostics = pinkie_assembler::check(&program);

    for d in &diagnostics {
        if d.is_fatal() {
            eprintln!("error: {d}");
        } else {
            eprintln!("warning: {d}");
        }
    }

    let fatal = diagnostics.iter().filter(|d| d.is_fatal()).count();
    println!(
        "{}: {} instructions, {} labels, {} unresolved, {} unknown",
        args.source.display(),
        program.body().len(),
        program.labels.len(),
        fatal,
        diagnostics.len() - fatal
    );

    if fatal > 0 {
        Err(1)
    } else {
        Ok(())
    }
}

/// Read a listing file and load it with the given entry label.
fn read_listing(path: &Path, entry: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{}': {e}", path.display());
        1
    })?;
    Ok(pinkie_assembler::load(&text, entry))
}
