//! The writer prints values back in the syntax the [reader](crate::reader) accepts. It follows the
//! structure of the value without cycle detection and never allocates values.

use crate::error::Result;
use crate::heap::{Heap, HeapObject};
use crate::port::Sink;
use crate::reader::CHAR_NAMES;
use crate::value::{Immediate, Tagged, Value};

const RELEASED: &[u8] = b"#<released>";

struct Writer<'a> {
    heap: &'a Heap,
    sink: &'a mut dyn Sink,
}

/// Pending work of a write. Nested structure is kept here instead of on the call stack.
enum Step {
    Value(Value),
    Text(&'static str),
    /// The rest of a list after its first element.
    Rest(Value),
}

impl Writer<'_> {
    fn bytes(&mut self, bytes: &[u8]) -> Result<()> {
        Ok(self.sink.write_bytes(bytes)?)
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.bytes(text.as_bytes())
    }

    fn write(&mut self, value: Value) -> Result<()> {
        let mut steps = vec![Step::Value(value)];

        while let Some(step) = steps.pop() {
            match step {
                Step::Value(value) => self.write_value(value, &mut steps)?,
                Step::Text(text) => self.text(text)?,
                Step::Rest(rest) => self.write_rest(rest, &mut steps)?,
            }
        }

        Ok(())
    }

    fn write_value(&mut self, value: Value, steps: &mut Vec<Step>) -> Result<()> {
        let heap = self.heap;

        match value.classify() {
            Tagged::Fixnum(n) => self.text(&n.to_string()),
            Tagged::Char(c) => self.write_char(c),
            Tagged::Immediate(immediate) => self.text(immediate_spelling(immediate)),
            Tagged::ShortSymbol(_) | Tagged::LongSymbol(_) => match heap.symbol_name(value) {
                Ok(name) => self.bytes(&name),
                Err(_) => self.bytes(RELEASED),
            },
            Tagged::Pointer(at) => match heap.get(at) {
                Some(object) => self.write_object(object, steps),
                None => self.bytes(RELEASED),
            },
        }
    }

    fn write_char(&mut self, c: char) -> Result<()> {
        self.text("#\\")?;

        if let Some((name, _)) = CHAR_NAMES.iter().find(|(_, named)| *named == c) {
            return self.text(name);
        }

        if c.is_control() {
            return self.text(&format!("x{:x}", c as u32));
        }

        self.text(c.encode_utf8(&mut [0; 4]))
    }

    /// Writes the opening of `object`. Its children are pushed to `steps`, last child first.
    fn write_object(&mut self, object: &HeapObject, steps: &mut Vec<Step>) -> Result<()> {
        match object {
            HeapObject::Pair(pair) => {
                steps.push(Step::Rest(pair.cdr));
                steps.push(Step::Value(pair.car));
                self.text("(")
            }
            HeapObject::String(string) => self.write_string(&string.data),
            HeapObject::Symbol(symbol) => self.bytes(&symbol.name),
            HeapObject::Vector(vector) => {
                steps.push(Step::Text(")"));
                for (i, element) in vector.data.iter().enumerate().rev() {
                    steps.push(Step::Value(*element));
                    if i > 0 {
                        steps.push(Step::Text(" "));
                    }
                }
                self.text("#(")
            }
            HeapObject::Float(f) => self.text(&format_float(*f)),
            HeapObject::Bignum(n) => self.text(&n.0.to_string()),
            HeapObject::InputPort(port) => {
                let port = port.borrow();
                self.text(&format!("#<input-port {}>", crate::port::Source::name(&*port)))
            }
            HeapObject::OutputPort(port) => {
                let port = port.borrow();
                self.text(&format!("#<output-port {}>", Sink::name(&*port)))
            }
            HeapObject::Exception(exception) => {
                steps.push(Step::Text(">"));
                steps.push(Step::Value(exception.message));
                steps.push(Step::Text(" "));
                steps.push(Step::Value(exception.kind));
                self.text("#<exception ")
            }
            HeapObject::Procedure(_) => self.text("#<procedure>"),
            HeapObject::Macro(_) => self.text("#<macro>"),
            HeapObject::Environment(_) => self.text("#<environment>"),
            HeapObject::Bytecode(bytecode) => {
                self.text(&format!("#<bytecode {}>", bytecode.data.len()))
            }
            HeapObject::Core(core) => self.text(&format!("#<core {}>", core.name)),
            HeapObject::Opcode(opcode) => self.text(&format!("#<opcode {}>", opcode.name)),
        }
    }

    /// Continues a list: the next element, a dotted tail or the closing parenthesis.
    fn write_rest(&mut self, rest: Value, steps: &mut Vec<Step>) -> Result<()> {
        if rest.is_null() {
            return self.text(")");
        }

        match self.heap.pair(rest) {
            Ok(pair) => {
                steps.push(Step::Rest(pair.cdr));
                steps.push(Step::Value(pair.car));
                self.text(" ")
            }
            Err(_) => {
                steps.push(Step::Text(")"));
                steps.push(Step::Value(rest));
                self.text(" . ")
            }
        }
    }

    fn write_string(&mut self, data: &[u8]) -> Result<()> {
        self.text("\"")?;

        let mut start = 0;
        for (i, byte) in data.iter().enumerate() {
            let escaped: &[u8] = match byte {
                b'\n' => b"\\n",
                b'\t' => b"\\t",
                b'\r' => b"\\r",
                b'\0' => b"\\0",
                b'\\' => b"\\\\",
                b'"' => b"\\\"",
                _ => continue,
            };
            self.bytes(&data[start..i])?;
            self.bytes(escaped)?;
            start = i + 1;
        }

        self.bytes(&data[start..])?;
        self.text("\"")
    }
}

fn immediate_spelling(immediate: Immediate) -> &'static str {
    match immediate {
        Immediate::Null => "()",
        Immediate::False => "#f",
        Immediate::True => "#t",
        Immediate::Eof => "#!eof",
        Immediate::Unspecified => "#!unspecified",
        Immediate::Error => "#!error",
        Immediate::Close => "#!close",
        Immediate::RawDot => "#!dot",
    }
}

/// Floats keep a fraction or an exponent so they read back as floats.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "+nan.0".into()
    } else if f == f64::INFINITY {
        "+inf.0".into()
    } else if f == f64::NEG_INFINITY {
        "-inf.0".into()
    } else {
        format!("{f:?}")
    }
}

/// Writes the external representation of `value` to `sink`.
pub fn write(heap: &Heap, value: Value, sink: &mut dyn Sink) -> Result<()> {
    Writer { heap, sink }.write(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::pointer::{CoreCode, Exception};

    fn show(heap: &Heap, value: Value) -> String {
        let mut buffer = Vec::new();
        write(heap, value, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_immediates() {
        let heap = Heap::default();

        assert_eq!(show(&heap, Value::integer(-12)), "-12");
        assert_eq!(show(&heap, Value::NULL), "()");
        assert_eq!(show(&heap, Value::TRUE), "#t");
        assert_eq!(show(&heap, Value::FALSE), "#f");
        assert_eq!(show(&heap, Value::EOF), "#!eof");
        assert_eq!(show(&heap, Value::UNSPECIFIED), "#!unspecified");
        assert_eq!(show(&heap, Value::ERROR), "#!error");
        assert_eq!(show(&heap, Value::CLOSE), "#!close");
        assert_eq!(show(&heap, Value::RAWDOT), "#!dot");
    }

    #[test]
    fn test_characters() {
        let heap = Heap::default();

        assert_eq!(show(&heap, Value::character('a')), "#\\a");
        assert_eq!(show(&heap, Value::character(' ')), "#\\space");
        assert_eq!(show(&heap, Value::character('\n')), "#\\newline");
        assert_eq!(show(&heap, Value::character('\u{7}')), "#\\x7");
        assert_eq!(show(&heap, Value::character('λ')), "#\\λ");
    }

    #[test]
    fn test_lists() {
        let mut heap = Heap::default();
        let proper = heap.list([Value::integer(1), Value::integer(2)]);
        let dotted = heap.list_with_tail([Value::integer(1)], Value::integer(2));
        let nested = heap.list([proper, Value::NULL]);

        assert_eq!(show(&heap, proper), "(1 2)");
        assert_eq!(show(&heap, dotted), "(1 . 2)");
        assert_eq!(show(&heap, nested), "((1 2) ())");
    }

    #[test]
    fn test_vectors() {
        let mut heap = Heap::default();
        let vector = heap.make_vector_from(vec![Value::integer(1), Value::TRUE]);
        let empty = heap.make_vector(0, Value::NULL);

        assert_eq!(show(&heap, vector), "#(1 #t)");
        assert_eq!(show(&heap, empty), "#()");
    }

    #[test]
    fn test_string_escapes() {
        let mut heap = Heap::default();
        let string = heap.make_string("a\nb\"c\\");

        assert_eq!(show(&heap, string), r#""a\nb\"c\\""#);
    }

    #[test]
    fn test_floats() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(1e100), "1e100");
        assert_eq!(format_float(f64::INFINITY), "+inf.0");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf.0");
        assert_eq!(format_float(f64::NAN), "+nan.0");
    }

    #[test]
    fn test_opaque_objects() {
        let mut heap = Heap::default();
        let core = heap.make_core(CoreCode::Lambda, "lambda");
        let bytecode = heap.make_bytecode(vec![0, 1, 2]);
        let procedure = heap.make_procedure(0, 1, bytecode, Value::NULL);
        let message = heap.make_string("oops");
        let exception = heap.alloc(HeapObject::Exception(Exception::new(
            Value::FALSE,
            message,
            Value::NULL,
        )));

        assert_eq!(show(&heap, core), "#<core lambda>");
        assert_eq!(show(&heap, bytecode), "#<bytecode 3>");
        assert_eq!(show(&heap, procedure), "#<procedure>");
        assert_eq!(show(&heap, exception), "#<exception #f \"oops\">");
    }

    #[test]
    fn test_deep_nesting() {
        let mut heap = Heap::default();
        let depth = 100_000;

        let mut list = Value::NULL;
        let mut vector = heap.make_vector_from(Vec::new());
        for _ in 0..depth {
            list = heap.list([list]);
            vector = heap.make_vector_from(vec![Value::integer(1), vector]);
        }

        let text = show(&heap, list);
        assert_eq!(text.len(), 2 * depth + 2);
        assert!(text.starts_with("((((") && text.ends_with("))))"));

        let text = show(&heap, vector);
        assert!(text.starts_with("#(1 #(1 #("));
        assert!(text.ends_with("#())))"));
    }

    #[test]
    fn test_released_handle() {
        let mut heap = Heap::new(crate::allocator::Backend::Manual);
        let string = heap.make_string("gone");

        heap.release(string);
        assert_eq!(show(&heap, string), "#<released>");
    }
}
