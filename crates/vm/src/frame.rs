//! Variable store and call frames.
//!
//! Variables live in one global name-keyed map shared by the whole call
//! chain. A call frame does not copy that map; it keeps an undo log holding
//! the prior binding of each name the first time it is written inside the
//! frame. Returning replays the log, which restores exactly the bindings the
//! caller had at the call site.
//!
//! One value crosses the boundary on return: the callee's return slot,
//! named after the callee label with its first character replaced by `*`
//! (`Fsum` returns through `*sum`).

use std::collections::HashMap;

/// Prefix of every return-slot variable name.
pub const RETURN_SLOT_PREFIX: char = '*';

/// An active call.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Label the call jumped to.
    pub callee: String,
    /// Instruction index to resume at after RET.
    pub return_address: usize,
    /// Bindings to restore on return, `None` meaning "was unset".
    saved: HashMap<String, Option<f64>>,
}

/// The variable store together with its frame stack.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, f64>,
    frames: Vec<Frame>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, 0 when unset.
    pub fn get(&self, name: &str) -> f64 {
        self.lookup(name).unwrap_or(0.0)
    }

    /// Value of `name`, `None` when unset.
    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.record(name);
        self.values.insert(name.to_string(), value);
    }

    /// Unset `name`. A later read yields 0 again.
    pub fn remove(&mut self, name: &str) {
        self.record(name);
        self.values.remove(name);
    }

    /// Number of bound names.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Current call depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Active frames, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Open a frame for a call to `callee`.
    pub fn enter(&mut self, callee: &str, return_address: usize) {
        self.frames.push(Frame {
            callee: callee.to_string(),
            return_address,
            saved: HashMap::new(),
        });
    }

    /// Close the innermost frame and return its return address.
    ///
    /// The callee's return slot is carried into the restored bindings; if the
    /// callee left it unset, it is unset in the caller too. Returns `None`
    /// and leaves the bindings untouched when no frame is open.
    pub fn leave(&mut self) -> Option<usize> {
        let frame = self.frames.pop()?;
        let slot = return_slot(&frame.callee);
        let result = self.lookup(&slot);

        for (name, prior) in frame.saved {
            match prior {
                Some(value) => self.values.insert(name, value),
                None => self.values.remove(&name),
            };
        }

        match result {
            Some(value) => self.set(&slot, value),
            None => self.remove(&slot),
        }
        Some(frame.return_address)
    }

    fn record(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            if !frame.saved.contains_key(name) {
                frame
                    .saved
                    .insert(name.to_string(), self.values.get(name).copied());
            }
        }
    }
}

/// Return-slot variable name for a callee label.
pub fn return_slot(callee: &str) -> String {
    let mut chars = callee.chars();
    chars.next();
    format!("{RETURN_SLOT_PREFIX}{}", chars.as_str())
}
