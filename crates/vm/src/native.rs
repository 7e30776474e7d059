//! Native function registry for the INT instruction.
//!
//! A native function gets full read/write access to the machine [`State`].
//! It talks to the program through variables whose names both sides agree
//! on, e.g. reading `$puts_arg1`. Returning [`NativeFlow::Exit`] ends the
//! whole run; the engine does not execute another instruction afterwards.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::RuntimeError;
use crate::machine::State;

/// What the engine does after a native function returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFlow {
    /// Continue with the next instruction.
    Continue,
    /// Stop the run with this exit status.
    Exit(i32),
}

/// A host-provided function callable via INT.
pub type NativeFn = Box<dyn FnMut(&mut State) -> Result<NativeFlow, RuntimeError>>;

/// Name-keyed table of native functions.
#[derive(Default)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any earlier registration.
    pub fn register<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: FnMut(&mut State) -> Result<NativeFlow, RuntimeError> + 'static,
    {
        let name = name.into();
        if self.functions.insert(name.clone(), Box::new(f)).is_some() {
            debug!("native function {name} replaced");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Call the function registered under `name`.
    pub fn invoke(&mut self, name: &str, state: &mut State) -> Result<NativeFlow, RuntimeError> {
        debug!("native function call: {name}");
        let f = self
            .functions
            .get_mut(name)
            .ok_or_else(|| RuntimeError::IntNotFound {
                name: name.to_string(),
            })?;
        f(state)
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
