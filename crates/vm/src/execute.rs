//! Main execution loop and opcode dispatch for the Pinkie VM.

use std::cmp::Ordering;

use tracing::{debug, trace, warn};

use crate::error::RuntimeError;
use crate::heap::{heap_address, to_byte};
use crate::machine::{Machine, Outcome};
use crate::native::NativeFlow;
use pinkie_common::{Instruction, Opcode};

fn truthy(value: f64) -> bool {
    value != 0.0
}

fn from_bool(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl<'a> Machine<'a> {
    /// Execute from the current instruction pointer until END, a native
    /// exit request, or an error.
    ///
    /// The instruction pointer is advanced before dispatch; jumps, CALL and
    /// RET overwrite it.
    pub fn execute(&mut self) -> Result<Outcome, RuntimeError> {
        loop {
            let instr = self.fetch()?;
            let eip = self.state.ip;
            trace!(eip, "{instr}");
            self.state.ip += 1;

            let Some(opcode) = instr.opcode else {
                warn!("unsupported instruction: {}", instr.mnemonic);
                continue;
            };
            let (a, b) = (instr.operand1.as_str(), instr.operand2.as_str());

            match opcode {
                // Machine control
                Opcode::End => return Ok(Outcome::Halted),
                Opcode::Nop => warn!("null operation detected at {eip}"),
                Opcode::Int => {
                    if let NativeFlow::Exit(code) = self.exec_int(instr)? {
                        debug!("native exit with status {code}");
                        return Ok(Outcome::Exited(code));
                    }
                }

                // Variables
                Opcode::Mov => self.exec_mov(a, b),
                Opcode::Del => self.state.remove_var(a),

                // Arithmetic
                Opcode::Add => self.exec_arith(a, b, |x, y| x + y),
                Opcode::Sub => self.exec_arith(a, b, |x, y| x - y),
                Opcode::Mul => self.exec_arith(a, b, |x, y| x * y),
                Opcode::Div => self.exec_arith(a, b, |x, y| x / y),

                // Logic and comparison
                Opcode::And => self.exec_logic(a, b, |x, y| x && y),
                Opcode::Or => self.exec_logic(a, b, |x, y| x || y),
                Opcode::Xor => self.exec_logic(a, b, |x, y| x != y),
                Opcode::Not => self.exec_not(a),
                Opcode::Cmp => self.exec_cmp(a, b),

                // Stacks
                Opcode::Push => {
                    let value = self.state.var(a);
                    self.state.operand_stack.push(value);
                }
                Opcode::Pop => {
                    let value = self.state.operand_stack.pop().unwrap_or(0.0);
                    self.state.set_var(a, value);
                }
                Opcode::Push0 => {
                    let value = self.state.var(a);
                    self.state.aux_stack.push(value);
                }
                Opcode::Pop0 => {
                    let value = self.state.aux_stack.pop().unwrap_or(0.0);
                    self.state.set_var(a, value);
                }

                // Control flow
                Opcode::Jmp => self.jump(instr)?,
                Opcode::Je => self.jump_if(instr, |f| f == Ordering::Equal)?,
                Opcode::Jne => self.jump_if(instr, |f| f != Ordering::Equal)?,
                Opcode::Ja => self.jump_if(instr, |f| f == Ordering::Greater)?,
                Opcode::Jae => self.jump_if(instr, |f| f != Ordering::Less)?,
                Opcode::Jb => self.jump_if(instr, |f| f == Ordering::Less)?,
                Opcode::Jbe => self.jump_if(instr, |f| f != Ordering::Greater)?,
                Opcode::Call => self.exec_call(instr)?,
                Opcode::Ret => self.exec_ret(),

                // Heap
                Opcode::Out => self.exec_out(a, b)?,
                Opcode::In => self.exec_in(a, b),
            }
        }
    }

    fn exec_mov(&mut self, a: &str, b: &str) {
        let value = self.operand_value(b);
        self.state.set_var(a, value);
    }

    // ---- Arithmetic and logic ----

    fn exec_arith(&mut self, a: &str, b: &str, op: fn(f64, f64) -> f64) {
        let value = op(self.state.var(a), self.state.var(b));
        self.state.set_var(a, value);
    }

    fn exec_logic(&mut self, a: &str, b: &str, op: fn(bool, bool) -> bool) {
        let value = op(truthy(self.state.var(a)), truthy(self.state.var(b)));
        self.state.set_var(a, from_bool(value));
    }

    fn exec_not(&mut self, a: &str) {
        let value = !truthy(self.state.var(a));
        self.state.set_var(a, from_bool(value));
    }

    /// Set the flag from `a` against a literal or variable `b`.
    ///
    /// If neither less, equal nor greater holds (NaN), the flag is left as is.
    fn exec_cmp(&mut self, a: &str, b: &str) {
        let lhs = self.state.var(a);
        let rhs = self.operand_value(b);
        if let Some(ordering) = lhs.partial_cmp(&rhs) {
            self.state.flag = ordering;
        }
    }

    // ---- Control flow ----

    fn jump(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.resolve(instr)?;
        debug!("jump to {} ({target})", instr.operand1);
        self.state.ip = target;
        Ok(())
    }

    fn jump_if(
        &mut self,
        instr: &Instruction,
        taken: fn(Ordering) -> bool,
    ) -> Result<(), RuntimeError> {
        if taken(self.state.flag) {
            self.jump(instr)?;
        }
        Ok(())
    }

    /// CALL: open a frame returning to the next instruction, then jump.
    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.resolve(instr)?;
        self.state
            .variables
            .enter(&instr.operand1, self.state.ip);
        debug!(
            "call {} ({target}), depth {}",
            instr.operand1,
            self.state.call_depth()
        );
        self.state.ip = target;
        Ok(())
    }

    /// RET: restore the caller's variables and resume after its CALL.
    ///
    /// Without an open frame the instruction pointer is moved past the end
    /// of the program, so the next fetch fails.
    fn exec_ret(&mut self) {
        match self.state.variables.leave() {
            Some(address) => {
                debug!("return to {address}");
                self.state.ip = address;
            }
            None => {
                warn!("RET with no active call at {}", self.state.ip.saturating_sub(1));
                self.state.ip = self.program.len();
            }
        }
    }

    fn exec_int(&mut self, instr: &Instruction) -> Result<NativeFlow, RuntimeError> {
        self.natives.invoke(&instr.operand1, &mut self.state)
    }

    // ---- Heap ----

    /// OUT: store `b` as a byte at the address held in `a`.
    fn exec_out(&mut self, a: &str, b: &str) -> Result<(), RuntimeError> {
        let position = self.state.var(a);
        if !self.options.unsafe_heap && self.state.heap.is_free_at(position) {
            return Err(RuntimeError::AccessUnallocatedHeap { address: position });
        }
        let byte = to_byte(self.state.var(b));
        let stored = heap_address(position).is_some_and(|addr| self.state.heap.store(addr, byte));
        if !stored {
            warn!("OUT to {a} outside the heap dropped");
        }
        Ok(())
    }

    /// IN: load the byte at the address held in `b` into `a`.
    fn exec_in(&mut self, a: &str, b: &str) {
        let value = self
            .state
            .variables
            .lookup(b)
            .and_then(heap_address)
            .and_then(|addr| self.state.heap.load(addr));
        if value.is_none() {
            warn!("IN from {b} outside the heap reads 0");
        }
        self.state.set_var(a, f64::from(value.unwrap_or(0)));
    }
}
