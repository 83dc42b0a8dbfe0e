//! The heap object model. Every object carries its type as the variant of [HeapObject], so
//! reading a field under the wrong type is a [Error::Type] instead of undefined behaviour.

use std::borrow::Cow;

use fxhash::FxHashSet;
use num_bigint::BigInt;

use crate::allocator::{new_allocator, Allocator, Backend};
use crate::error::{Error, Result};
use crate::value::pointer::*;
use crate::value::{ObjRef, Tagged, Value, FIXNUM_MAX, FIXNUM_MIN};

/// One byte runtime type discriminator, in the order the evaluator expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Object = 0,
    Fixnum,
    Char,
    Boolean,
    Pair,
    Symbol,
    String,
    Vector,
    Flonum,
    Bignum,
    InputPort,
    OutputPort,
    Exception,
    Procedure,
    Macro,
    Environment,
    Bytecode,
    Core,
    Opcode,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Object => "object",
            TypeTag::Fixnum => "fixnum",
            TypeTag::Char => "char",
            TypeTag::Boolean => "boolean",
            TypeTag::Pair => "pair",
            TypeTag::Symbol => "symbol",
            TypeTag::String => "string",
            TypeTag::Vector => "vector",
            TypeTag::Flonum => "flonum",
            TypeTag::Bignum => "bignum",
            TypeTag::InputPort => "input-port",
            TypeTag::OutputPort => "output-port",
            TypeTag::Exception => "exception",
            TypeTag::Procedure => "procedure",
            TypeTag::Macro => "macro",
            TypeTag::Environment => "environment",
            TypeTag::Bytecode => "bytecode",
            TypeTag::Core => "core",
            TypeTag::Opcode => "opcode",
        }
    }
}

#[derive(Clone, Debug)]
pub enum HeapObject {
    Pair(Pair),
    String(Str),
    Symbol(Symbol),
    Vector(Vector),
    Float(f64),
    Bignum(Bignum),
    InputPort(SharedInput),
    OutputPort(SharedOutput),
    Exception(Exception),
    Procedure(Procedure),
    Macro(Macro),
    Environment(Environment),
    Bytecode(Bytecode),
    Core(CoreForm),
    Opcode(Opcode),
}

impl HeapObject {
    pub fn tag(&self) -> TypeTag {
        match self {
            HeapObject::Pair(_) => TypeTag::Pair,
            HeapObject::String(_) => TypeTag::String,
            HeapObject::Symbol(_) => TypeTag::Symbol,
            HeapObject::Vector(_) => TypeTag::Vector,
            HeapObject::Float(_) => TypeTag::Flonum,
            HeapObject::Bignum(_) => TypeTag::Bignum,
            HeapObject::InputPort(_) => TypeTag::InputPort,
            HeapObject::OutputPort(_) => TypeTag::OutputPort,
            HeapObject::Exception(_) => TypeTag::Exception,
            HeapObject::Procedure(_) => TypeTag::Procedure,
            HeapObject::Macro(_) => TypeTag::Macro,
            HeapObject::Environment(_) => TypeTag::Environment,
            HeapObject::Bytecode(_) => TypeTag::Bytecode,
            HeapObject::Core(_) => TypeTag::Core,
            HeapObject::Opcode(_) => TypeTag::Opcode,
        }
    }
}

/// Name used in type errors for handles whose slot has been released.
const RELEASED: &str = "released object";

/// The object store of a value universe.
#[derive(Debug)]
pub struct Heap {
    allocator: Box<dyn Allocator>,
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new(Backend::default())
    }
}

impl Heap {
    pub fn new(backend: Backend) -> Self {
        Self {
            allocator: new_allocator(backend),
        }
    }

    pub fn with_allocator(allocator: Box<dyn Allocator>) -> Self {
        Self { allocator }
    }

    pub fn backend(&self) -> Backend {
        self.allocator.backend()
    }

    /// Number of live objects.
    pub fn live(&self) -> usize {
        self.allocator.live()
    }

    /// Allocates `object` and returns a pointer to it. Atomic objects go through the atomic
    /// allocation path.
    pub fn alloc(&mut self, object: HeapObject) -> Value {
        let at = if object.is_atomic() {
            self.allocator.allocate_atomic(object)
        } else {
            self.allocator.allocate(object)
        };
        Value::pointer(at)
    }

    pub(crate) fn alloc_symbol(&mut self, name: &[u8]) -> Value {
        let at = self.allocator.allocate_atomic(HeapObject::Symbol(Symbol {
            name: name.into(),
        }));
        Value::long_symbol(at)
    }

    pub fn get(&self, at: ObjRef) -> Option<&HeapObject> {
        self.allocator.get(at)
    }

    pub fn get_mut(&mut self, at: ObjRef) -> Option<&mut HeapObject> {
        self.allocator.get_mut(at)
    }

    /// The heap object behind a pointer value.
    pub fn object(&self, value: Value) -> Option<&HeapObject> {
        match value.classify() {
            Tagged::Pointer(at) => self.get(at),
            _ => None,
        }
    }

    fn object_mut(&mut self, value: Value) -> Option<&mut HeapObject> {
        match value.classify() {
            Tagged::Pointer(at) => self.get_mut(at),
            _ => None,
        }
    }

    /// Type of any value, immediate or not.
    pub fn type_of(&self, value: Value) -> TypeTag {
        match value.classify() {
            Tagged::Pointer(at) => self.get(at).map_or(TypeTag::Object, HeapObject::tag),
            Tagged::Fixnum(_) => TypeTag::Fixnum,
            Tagged::LongSymbol(_) | Tagged::ShortSymbol(_) => TypeTag::Symbol,
            Tagged::Char(_) => TypeTag::Char,
            Tagged::Immediate(_) if value.is_boolean() => TypeTag::Boolean,
            Tagged::Immediate(_) => TypeTag::Object,
        }
    }

    pub fn type_name(&self, value: Value) -> &'static str {
        match value.classify() {
            Tagged::Pointer(at) if self.get(at).is_none() => RELEASED,
            Tagged::Immediate(_) if value.is_null() => "null",
            Tagged::Immediate(_) if !value.is_boolean() => "constant",
            _ => self.type_of(value).name(),
        }
    }

    /// Is `value` a heap pointer whose discriminator is `tag`.
    pub fn is(&self, value: Value, tag: TypeTag) -> bool {
        value.is_pointer() && self.object(value).is_some_and(|object| object.tag() == tag)
    }

    pub fn is_pair(&self, value: Value) -> bool {
        self.is(value, TypeTag::Pair)
    }

    pub fn is_string(&self, value: Value) -> bool {
        self.is(value, TypeTag::String)
    }

    pub fn is_vector(&self, value: Value) -> bool {
        self.is(value, TypeTag::Vector)
    }

    pub fn is_flonum(&self, value: Value) -> bool {
        self.is(value, TypeTag::Flonum)
    }

    pub fn is_bignum(&self, value: Value) -> bool {
        self.is(value, TypeTag::Bignum)
    }

    pub fn is_environment(&self, value: Value) -> bool {
        self.is(value, TypeTag::Environment)
    }

    pub fn is_exception(&self, value: Value) -> bool {
        self.is(value, TypeTag::Exception)
    }

    pub fn is_procedure(&self, value: Value) -> bool {
        self.is(value, TypeTag::Procedure)
    }

    fn mismatch(&self, expected: TypeTag, value: Value) -> Error {
        Error::type_error(expected.name(), self.type_name(value))
    }
}

/// Generates the typed accessor pair of a heap object variant.
macro_rules! accessors {
    ($get:ident, $get_mut:ident, $variant:ident, $payload:ty, $tag:ident) => {
        impl Heap {
            pub fn $get(&self, value: Value) -> Result<&$payload> {
                match self.object(value) {
                    Some(HeapObject::$variant(payload)) => Ok(payload),
                    _ => Err(self.mismatch(TypeTag::$tag, value)),
                }
            }

            pub fn $get_mut(&mut self, value: Value) -> Result<&mut $payload> {
                if !self.is(value, TypeTag::$tag) {
                    return Err(self.mismatch(TypeTag::$tag, value));
                }
                match self.object_mut(value) {
                    Some(HeapObject::$variant(payload)) => Ok(payload),
                    _ => Err(Error::type_error(TypeTag::$tag.name(), RELEASED)),
                }
            }
        }
    };
}

accessors!(pair, pair_mut, Pair, Pair, Pair);
accessors!(string, string_mut, String, Str, String);
accessors!(vector, vector_mut, Vector, Vector, Vector);
accessors!(exception, exception_mut, Exception, Exception, Exception);
accessors!(procedure, procedure_mut, Procedure, Procedure, Procedure);
accessors!(macro_, macro_mut, Macro, Macro, Macro);
accessors!(environment, environment_mut, Environment, Environment, Environment);
accessors!(bytecode, bytecode_mut, Bytecode, Bytecode, Bytecode);
accessors!(core, core_mut, Core, CoreForm, Core);
accessors!(opcode, opcode_mut, Opcode, Opcode, Opcode);
accessors!(bignum, bignum_mut, Bignum, Bignum, Bignum);
accessors!(input_port, input_port_mut, InputPort, SharedInput, InputPort);
accessors!(output_port, output_port_mut, OutputPort, SharedOutput, OutputPort);

/// Constructors.
impl Heap {
    pub fn make_flonum(&mut self, f: f64) -> Value {
        self.alloc(HeapObject::Float(f))
    }

    pub fn flonum(&self, value: Value) -> Result<f64> {
        match self.object(value) {
            Some(HeapObject::Float(f)) => Ok(*f),
            _ => Err(self.mismatch(TypeTag::Flonum, value)),
        }
    }

    /// Boxes an arbitrary precision integer, integers that fit in a fixnum become one.
    pub fn make_bignum(&mut self, n: BigInt) -> Value {
        match i64::try_from(&n) {
            Ok(small) if (FIXNUM_MIN..=FIXNUM_MAX).contains(&small) => Value::integer(small),
            _ => self.alloc(HeapObject::Bignum(Bignum(n))),
        }
    }

    pub fn make_string(&mut self, data: impl Into<Vec<u8>>) -> Value {
        self.alloc(HeapObject::String(Str::new(data)))
    }

    pub fn make_exception(
        &mut self,
        kind: Value,
        message: Value,
        irritants: Value,
        file: Value,
        line: Value,
    ) -> Value {
        self.alloc(HeapObject::Exception(Exception {
            kind,
            message,
            irritants,
            file,
            line,
        }))
    }

    pub fn make_procedure(&mut self, flags: u8, num_args: u16, bytecode: Value, vars: Value) -> Value {
        self.alloc(HeapObject::Procedure(Procedure {
            flags,
            num_args,
            bytecode,
            vars,
        }))
    }

    pub fn make_macro(&mut self, procedure: Value, env: Value) -> Value {
        self.alloc(HeapObject::Macro(Macro { procedure, env }))
    }

    pub fn make_bytecode(&mut self, data: impl Into<Vec<u8>>) -> Value {
        self.alloc(HeapObject::Bytecode(Bytecode { data: data.into() }))
    }

    pub fn make_core(&mut self, code: CoreCode, name: &str) -> Value {
        self.alloc(HeapObject::Core(CoreForm {
            code,
            name: name.into(),
        }))
    }

    pub fn make_opcode(&mut self, opcode: Opcode) -> Value {
        self.alloc(HeapObject::Opcode(opcode))
    }

    pub fn make_input_port(&mut self, port: crate::port::InputPort) -> Value {
        self.alloc(HeapObject::InputPort(std::rc::Rc::new(port.into())))
    }

    pub fn make_output_port(&mut self, port: crate::port::OutputPort) -> Value {
        self.alloc(HeapObject::OutputPort(std::rc::Rc::new(port.into())))
    }

    /// Takes everything written so far to a string output port as a new string.
    pub fn get_output_string(&mut self, port: Value) -> Result<Value> {
        let taken = self.output_port(port)?.borrow_mut().take_string();
        match taken {
            Some(data) => Ok(self.make_string(data)),
            None => Err(Error::type_error("string port", "output-port")),
        }
    }
}

/// Symbol names.
impl Heap {
    /// Name of a symbol, decoded for short symbols and borrowed for long ones.
    pub fn symbol_name(&self, value: Value) -> Result<Cow<'_, [u8]>> {
        match value.classify() {
            Tagged::ShortSymbol(symbol) => Ok(Cow::Owned(symbol.decode())),
            Tagged::LongSymbol(at) => match self.get(at) {
                Some(HeapObject::Symbol(symbol)) => Ok(Cow::Borrowed(&symbol.name[..])),
                _ => Err(Error::type_error("symbol", RELEASED)),
            },
            _ => Err(self.mismatch(TypeTag::Symbol, value)),
        }
    }
}

/// Releasing.
impl Heap {
    /// Releases one object. A no-op under the tracing backend.
    pub fn release(&mut self, value: Value) {
        if let Tagged::Pointer(at) = value.classify() {
            self.allocator.release(at);
        }
    }

    /// Releases `value` and everything reachable from it. Each object is released once even
    /// when shared or part of a cycle. Interned symbols belong to the symbol table and are
    /// left alone.
    pub fn release_deep(&mut self, value: Value) -> usize {
        if self.backend() == Backend::Tracing {
            return 0;
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![value];
        let mut released = Vec::new();

        while let Some(value) = stack.pop() {
            let Tagged::Pointer(at) = value.classify() else {
                continue;
            };
            if !visited.insert(at) {
                continue;
            }
            if let Some(object) = self.get(at) {
                object.for_each_reference(|child| stack.push(child));
                released.push(at);
            }
        }

        for at in &released {
            self.allocator.release(*at);
        }

        log::debug!("released {} objects", released.len());
        released.len()
    }

    /// Reclaims every object not reachable from `roots`. A no-op under the manual backend.
    pub fn collect(&mut self, roots: &mut dyn Iterator<Item = Value>) -> usize {
        self.allocator.collect(roots)
    }
}
