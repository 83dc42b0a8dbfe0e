//! A universe owns one heap and one symbol table. Values from different universes must not be
//! mixed, each universe is used by a single thread.

use crate::allocator::Backend;
use crate::error::{Error, Result, SyntaxKind};
use crate::heap::Heap;
use crate::port::{InputPort, OutputPort, Sink, Source};
use crate::symbol::SymbolTable;
use crate::value::Value;
use crate::{reader, writer};

/// How a universe is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    pub backend: Backend,
    /// Short names become immediate symbols instead of heap allocated ones.
    pub compact_symbols: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            backend: Backend::Tracing,
            compact_symbols: true,
        }
    }
}

#[derive(Debug)]
pub struct Universe {
    pub heap: Heap,
    pub symbols: SymbolTable,
}

impl Default for Universe {
    fn default() -> Self {
        Universe::new()
    }
}

impl Universe {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut heap = Heap::new(options.backend);
        let symbols = SymbolTable::new(&mut heap, options.compact_symbols);

        log::debug!("new universe with {options:?}");

        Self { heap, symbols }
    }

    pub fn intern(&mut self, name: &str) -> Value {
        self.symbols.intern(&mut self.heap, name.as_bytes())
    }

    /// The symbol that stands for `.` in dotted pairs.
    pub fn dot(&self) -> Value {
        self.symbols.dot()
    }

    /// Reads the next datum of `source`, `None` once the input is exhausted.
    pub fn read(&mut self, source: &mut dyn Source) -> Result<Option<Value>> {
        reader::read(&mut self.heap, &mut self.symbols, source)
    }

    /// Reads the first datum of `text`, `#!eof` when it holds none.
    pub fn read_str(&mut self, text: &str) -> Result<Value> {
        let value = self.read(&mut InputPort::from_string(text))?;
        Ok(value.unwrap_or(Value::EOF))
    }

    /// Reads every datum of `text`.
    pub fn read_all(&mut self, text: &str) -> Result<Vec<Value>> {
        let mut port = InputPort::from_string(text);
        reader::read_all(&mut self.heap, &mut self.symbols, &mut port)
    }

    pub fn write(&self, value: Value, sink: &mut dyn Sink) -> Result<()> {
        writer::write(&self.heap, value, sink)
    }

    pub fn write_to_string(&self, value: Value) -> String {
        self.heap.display(value).to_string()
    }

    /// Reclaims everything not reachable from `roots` or from the symbol table.
    pub fn collect(&mut self, roots: &[Value]) -> usize {
        let mut roots = roots.iter().copied().chain(self.symbols.roots());
        self.heap.collect(&mut roots)
    }
}

/// Ports as values.
impl Universe {
    pub fn make_input_port(&mut self, port: InputPort) -> Value {
        self.heap.make_input_port(port)
    }

    pub fn make_output_port(&mut self, port: OutputPort) -> Value {
        self.heap.make_output_port(port)
    }

    pub fn open_input_string(&mut self, text: &str) -> Value {
        self.make_input_port(InputPort::from_string(text))
    }

    pub fn open_output_string(&mut self) -> Value {
        self.make_output_port(OutputPort::string())
    }

    pub fn get_output_string(&mut self, port: Value) -> Result<Value> {
        self.heap.get_output_string(port)
    }

    /// Reads one datum from an input port value, `None` once the port is exhausted.
    pub fn read_from(&mut self, port: Value) -> Result<Option<Value>> {
        let shared = self.heap.input_port(port)?.clone();
        let mut source = shared.borrow_mut();
        self.read(&mut *source)
    }

    /// Writes `value` to an output port value.
    pub fn write_to(&self, value: Value, port: Value) -> Result<()> {
        let shared = self.heap.output_port(port)?.clone();
        let mut sink = shared.borrow_mut();
        self.write(value, &mut *sink)
    }
}

/// Exceptions.
impl Universe {
    /// An exception object describing `error`, so it can be raised as a value.
    pub fn exception_from(&mut self, error: &Error) -> Value {
        let kind = self.intern(match error {
            Error::Syntax { .. } => "read-error",
            Error::Type { .. } => "type-error",
            Error::OutOfBounds { .. } => "range-error",
            Error::DivideByZero => "arith-error",
            Error::Io(_) => "io-error",
        });

        let (message, irritants) = match error {
            Error::Syntax { kind, .. } => (kind.to_string(), self.syntax_irritants(kind)),
            Error::OutOfBounds { index, len } => {
                let irritants = self
                    .heap
                    .list([Value::integer(*index as i64), Value::integer(*len as i64)]);
                (error.to_string(), irritants)
            }
            _ => (error.to_string(), Value::NULL),
        };

        let message = self.heap.make_string(message);
        let (file, line) = match error.location() {
            Some((port, line)) => (self.heap.make_string(port), Value::integer(line as i64)),
            None => (Value::FALSE, Value::FALSE),
        };

        self.heap.make_exception(kind, message, irritants, file, line)
    }

    fn syntax_irritants(&mut self, kind: &SyntaxKind) -> Value {
        match kind {
            SyntaxKind::InvalidNumber(text)
            | SyntaxKind::InvalidCharacter(text)
            | SyntaxKind::InvalidHashSyntax(text) => {
                let text = self.heap.make_string(text.as_bytes());
                self.heap.list([text])
            }
            _ => Value::NULL,
        }
    }
}
