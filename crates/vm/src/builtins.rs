//! Builtin native functions.
//!
//! Hosts register these under the `native_` prefix. Each reads its argument
//! from `$<name>_arg1`; results come back in `*<name>`.
//!
//! | name            | argument        | effect                                         |
//! |-----------------|-----------------|------------------------------------------------|
//! | `native_puts`   | `$puts_arg1`    | write the value and a newline to the host sink |
//! | `native_exit`   | `$exit_arg1`    | end the run with that exit status              |
//! | `native_malloc` | `$malloc_arg1`  | allocate bytes, address in `*malloc`           |
//! | `native_free`   | `$free_arg1`    | release a block                                |

use std::io::Write;
use std::num::NonZeroUsize;

use tracing::warn;

use crate::heap::heap_address;
use crate::machine::State;
use crate::native::{NativeFlow, NativeRegistry};

/// Prefix under which builtins are registered.
pub const NATIVE_PREFIX: &str = "native_";

/// Value stored in `*malloc` when the requested size is below one byte.
pub const MALLOC_REFUSED: f64 = -1.0;

/// Register every builtin, sending `native_puts` output to `out`.
pub fn register_builtins<W: Write + 'static>(registry: &mut NativeRegistry, mut out: W) {
    registry.register(format!("{NATIVE_PREFIX}puts"), move |state: &mut State| {
        let text = format_number(state.var("$puts_arg1"));
        if let Err(e) = writeln!(out, "{text}").and_then(|()| out.flush()) {
            warn!("native_puts could not write output: {e}");
        }
        Ok(NativeFlow::Continue)
    });

    registry.register(format!("{NATIVE_PREFIX}exit"), |state: &mut State| {
        Ok(NativeFlow::Exit(exit_status(state.var("$exit_arg1"))))
    });

    registry.register(format!("{NATIVE_PREFIX}malloc"), |state: &mut State| {
        let requested = state.var("$malloc_arg1").trunc();
        let address = match requested_size(requested) {
            Some(size) => state.heap.allocate(size)? as f64,
            None => MALLOC_REFUSED,
        };
        state.set_var("*malloc", address);
        Ok(NativeFlow::Continue)
    });

    registry.register(format!("{NATIVE_PREFIX}free"), |state: &mut State| {
        if let Some(address) = heap_address(state.var("$free_arg1")) {
            state.heap.release(address);
        }
        Ok(NativeFlow::Continue)
    });
}

/// Magnitudes in `[1e-6, 1e21)` print in plain decimal; others use an
/// exponent with an explicit sign.
const PLAIN_RANGE: std::ops::Range<f64> = 1e-6..1e21;

/// Render a value the way `native_puts` prints it.
///
/// Shortest round-trip digits, with `1e+21` / `1e-7` style exponents outside
/// `PLAIN_RANGE`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if PLAIN_RANGE.contains(&value.abs()) {
        value.to_string()
    } else {
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    }
}

fn exit_status(value: f64) -> i32 {
    if value.is_finite() {
        value.trunc() as i32
    } else {
        0
    }
}

fn requested_size(value: f64) -> Option<NonZeroUsize> {
    if value >= 1.0 {
        NonZeroUsize::new(value as usize)
    } else {
        None
    }
}
