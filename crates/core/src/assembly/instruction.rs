//! Instruction vocabulary for method bodies
//!
//! Bodies are flat instruction lists evaluated on an operand stack. The set
//! is deliberately small: it covers what a calling-convention adapter needs
//! plus constants for hand-written bodies.

use std::fmt;

use esapi_sdk::{MethodRef, TypeRef};

/// A single instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push argument `n` (the receiver is argument 0 for instance methods)
    LdArg(u16),
    /// Push an integer constant
    LdInt(i64),
    /// Push a string constant
    LdStr(String),
    /// Push the runtime type object for a type token
    LdToken(TypeRef),
    /// Early-bound call: always invokes exactly the referenced method
    Call(MethodRef),
    /// Late-bound call: resolves the most derived override on the receiver
    CallVirt(MethodRef),
    /// Return the top of the stack, or nothing for `void` methods
    Ret,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LdArg(n) => write!(f, "ldarg {}", n),
            Instruction::LdInt(v) => write!(f, "ldc {}", v),
            Instruction::LdStr(s) => write!(f, "ldstr {:?}", s),
            Instruction::LdToken(t) => write!(f, "ldtoken {}", t),
            Instruction::Call(m) => write!(f, "call {}", m),
            Instruction::CallVirt(m) => write!(f, "callvirt {}", m),
            Instruction::Ret => f.write_str("ret"),
        }
    }
}
