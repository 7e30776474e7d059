//! VM state management: registers, stacks, variables, heap.

use std::cmp::Ordering;

use crate::error::RuntimeError;
use crate::frame::Variables;
use crate::heap::Heap;
use crate::native::NativeRegistry;
use pinkie_common::{Instruction, Program};

/// Heap size used when the host does not ask for one.
pub const DEFAULT_HEAP_SIZE: usize = 1024 * 1024;

/// Options recognised by [`crate::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Heap size in bytes.
    pub heap_size: usize,
    /// Skip the allocation check on OUT.
    pub unsafe_heap: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            heap_size: DEFAULT_HEAP_SIZE,
            unsafe_heap: false,
        }
    }
}

/// How a run finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// END was reached.
    Halted,
    /// A native function asked for the run to terminate with this status.
    Exited(i32),
}

/// Everything an instruction or native function may read or write.
#[derive(Debug, Clone)]
pub struct State {
    /// Index of the next instruction to execute.
    pub ip: usize,
    /// Result of the most recent CMP.
    pub flag: Ordering,
    /// Named variables and the call frames over them.
    pub variables: Variables,
    /// Stack used by PUSH/POP.
    pub operand_stack: Vec<f64>,
    /// Stack used by PUSH0/POP0.
    pub aux_stack: Vec<f64>,
    pub heap: Heap,
}

impl State {
    /// Fresh state with a zeroed heap of `heap_size` bytes.
    pub fn new(heap_size: usize) -> Self {
        Self {
            ip: 0,
            flag: Ordering::Equal,
            variables: Variables::new(),
            operand_stack: Vec::new(),
            aux_stack: Vec::new(),
            heap: Heap::new(heap_size),
        }
    }

    /// Value of variable `name`, 0 when unset.
    pub fn var(&self, name: &str) -> f64 {
        self.variables.get(name)
    }

    pub fn set_var(&mut self, name: &str, value: f64) {
        self.variables.set(name, value);
    }

    pub fn remove_var(&mut self, name: &str) {
        self.variables.remove(name);
    }

    /// Number of calls that have not yet returned.
    pub fn call_depth(&self) -> usize {
        self.variables.depth()
    }
}

/// The Pinkie virtual machine.
pub struct Machine<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) state: State,
    pub(crate) natives: NativeRegistry,
    pub(crate) options: RunOptions,
}

impl<'a> Machine<'a> {
    /// Create a machine with a fresh state sized by `options.heap_size`.
    pub fn new(program: &'a Program, natives: NativeRegistry, options: RunOptions) -> Self {
        Self::with_state(program, State::new(options.heap_size), natives, options)
    }

    /// Create a machine over an existing state.
    pub fn with_state(
        program: &'a Program,
        state: State,
        natives: NativeRegistry,
        options: RunOptions,
    ) -> Self {
        Self {
            program,
            state,
            natives,
            options,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Consume the machine, keeping its final state.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Fetch the instruction at the current instruction pointer.
    pub(crate) fn fetch(&self) -> Result<&'a Instruction, RuntimeError> {
        self.program
            .get(self.state.ip)
            .ok_or(RuntimeError::InstrNotFound { eip: self.state.ip })
    }

    /// Resolve the label in `instr`'s first operand.
    pub(crate) fn resolve(&self, instr: &Instruction) -> Result<usize, RuntimeError> {
        self.program
            .label(&instr.operand1)
            .ok_or_else(|| RuntimeError::LabelNotFound {
                instruction: instr.clone(),
            })
    }

    /// A literal operand's value, or the named variable's.
    pub(crate) fn operand_value(&self, operand: &str) -> f64 {
        pinkie_common::immediate_value(operand).unwrap_or_else(|| self.state.var(operand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state() {
        let state = State::new(32);
        assert_eq!(state.ip, 0);
        assert_eq!(state.flag, Ordering::Equal);
        assert!(state.variables.is_empty());
        assert!(state.operand_stack.is_empty());
        assert!(state.aux_stack.is_empty());
        assert_eq!(state.heap.size(), 32);
        assert_eq!(state.call_depth(), 0);
    }

    #[test]
    fn default_options() {
        let options = RunOptions::default();
        assert_eq!(options.heap_size, DEFAULT_HEAP_SIZE);
        assert!(!options.unsafe_heap);
    }

    #[test]
    fn operand_value_prefers_literals() {
        let program = Program::with_bootstrap("Fmain");
        let mut machine = Machine::new(&program, NativeRegistry::new(), RunOptions::default());
        machine.state_mut().set_var("x", 9.0);
        // A name made of digits is always a literal.
        machine.state_mut().set_var("12", 5.0);
        assert_eq!(machine.operand_value("x"), 9.0);
        assert_eq!(machine.operand_value("12"), 12.0);
        assert_eq!(machine.operand_value("missing"), 0.0);
    }

    #[test]
    fn fetch_past_end_is_instr_not_found() {
        let program = Program::with_bootstrap("Fmain");
        let mut machine = Machine::new(&program, NativeRegistry::new(), RunOptions::default());
        machine.state_mut().ip = 2;
        assert_eq!(
            machine.fetch().unwrap_err(),
            RuntimeError::InstrNotFound { eip: 2 }
        );
    }
}
