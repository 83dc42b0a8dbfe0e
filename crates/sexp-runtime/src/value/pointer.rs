//! Payload records of the heap objects. Field order is what the evaluator and the compiler index,
//! so new fields go at the end.

use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxBuildHasher;
use num_bigint::BigInt;

use super::*;
use crate::port::{InputPort, OutputPort};

/// Struct that represents a `cons cell`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pair {
    pub car: Value,
    pub cdr: Value,
}

/// A mutable byte string, its length is the length of the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Str {
    pub data: Vec<u8>,
}

/// The heap part of a long symbol, only ever created by the symbol table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: Box<[u8]>,
}

/// A contiguous vector that cannot grow in size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector {
    pub data: Box<[Value]>,
}

/// A condition raised by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exception {
    pub kind: Value,
    pub message: Value,
    pub irritants: Value,
    pub file: Value,
    pub line: Value,
}

/// A compiled lambda: its bytecode object and the closed over variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Procedure {
    pub flags: u8,
    pub num_args: u16,
    pub bytecode: Value,
    pub vars: Value,
}

impl Procedure {
    pub fn is_variadic(&self) -> bool {
        self.flags & 1 == 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Macro {
    pub procedure: Value,
    pub env: Value,
}

pub type Bindings = im::HashMap<Value, Value, FxBuildHasher>;

/// A binding frame. A frame keeps its parent alive, the root frame has no parent and is the
/// global environment.
#[derive(Clone, Debug)]
pub struct Environment {
    pub flags: u8,
    pub parent: Option<ObjRef>,
    pub bindings: Bindings,
}

impl Environment {
    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }
}

/// Raw instructions, never scanned by the collector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bytecode {
    pub data: Vec<u8>,
}

/// Special forms known to the compiler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CoreCode {
    Define = 1,
    Set,
    Lambda,
    If,
    Begin,
    Quote,
    DefineSyntax,
    LetSyntax,
    LetrecSyntax,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreForm {
    pub code: CoreCode,
    pub name: Box<str>,
}

/// How the virtual machine dispatches an opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpcodeClass {
    TypePredicate = 1,
    Predicate,
    Arithmetic,
    ArithmeticInv,
    ArithmeticCmp,
    Io,
    Constructor,
    Accessor,
    Parameter,
    Generic,
}

/// A primitive operation the compiler inlines, with the procedure used when it is called
/// indirectly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub class: OpcodeClass,
    pub code: u8,
    pub num_args: u8,
    pub flags: u8,
    pub arg1_type: u8,
    pub arg2_type: u8,
    pub inverse: u8,
    pub name: Box<str>,
    pub data: Value,
    pub procedure: Value,
}

impl Opcode {
    pub fn is_variadic(&self) -> bool {
        self.flags & 1 == 1
    }
}

/// Ports are shared handles, the port state outlives any single read or write call.
pub type SharedInput = Rc<RefCell<InputPort>>;
pub type SharedOutput = Rc<RefCell<OutputPort>>;

impl Pair {
    pub fn new(car: Value, cdr: Value) -> Pair {
        Pair { car, cdr }
    }
}

impl Str {
    pub fn new(data: impl Into<Vec<u8>>) -> Str {
        Str { data: data.into() }
    }
}

impl Vector {
    pub fn new(data: Vec<Value>) -> Vector {
        Vector {
            data: data.into_boxed_slice(),
        }
    }

    /// Every slot holds the same `fill` value.
    pub fn filled(len: usize, fill: Value) -> Vector {
        Vector::new(vec![fill; len])
    }
}

impl Exception {
    pub fn new(kind: Value, message: Value, irritants: Value) -> Exception {
        Exception {
            kind,
            message,
            irritants,
            file: Value::FALSE,
            line: Value::FALSE,
        }
    }
}

/// Keeps [BigInt] in its own name so the heap object reads like the others.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bignum(pub BigInt);
