//! Ports are sequential positions over a byte source or sink. The reader and the writer only see
//! the [Source] and [Sink] traits, the physical transport behind them is supplied by whoever
//! builds the port.

use std::io::{self, BufRead, Cursor, Write};

/// A byte source with two bytes of push-back and a line counter for diagnostics.
pub trait Source {
    /// The next byte, or `None` at the end of the input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Gives a byte back, the next [Source::read_byte] returns it again. Up to two bytes can be
    /// pushed back, the last one pushed is read first.
    fn push_back(&mut self, byte: u8);

    /// Current line, starting at 1.
    fn line(&self) -> usize;

    fn name(&self) -> &str;
}

/// A byte sink.
pub trait Sink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.write_bytes(&[byte])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    fn name(&self) -> &str {
        "sink"
    }
}

/// An input port over any buffered reader. Lines are counted as newlines are consumed, pushing a
/// newline back un-counts it.
pub struct InputPort {
    name: String,
    line: usize,
    pushed: Vec<u8>,
    stream: Box<dyn BufRead>,
}

impl InputPort {
    pub fn new(name: impl Into<String>, stream: impl BufRead + 'static) -> Self {
        Self {
            name: name.into(),
            line: 1,
            pushed: Vec::with_capacity(2),
            stream: Box::new(stream),
        }
    }

    /// A port reading from a copy of `text`.
    pub fn from_string(text: impl Into<Vec<u8>>) -> Self {
        Self::new("<string>", Cursor::new(text.into()))
    }

    pub fn set_line(&mut self, line: usize) {
        self.line = line;
    }
}

impl Source for InputPort {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.pushed.pop() {
            Some(byte) => byte,
            None => {
                let buffer = self.stream.fill_buf()?;
                let Some(&byte) = buffer.first() else {
                    return Ok(None);
                };
                self.stream.consume(1);
                byte
            }
        };

        if byte == b'\n' {
            self.line += 1;
        }

        Ok(Some(byte))
    }

    fn push_back(&mut self, byte: u8) {
        debug_assert!(self.pushed.len() < 2, "two bytes of push-back at most");
        if byte == b'\n' {
            self.line -= 1;
        }
        self.pushed.push(byte);
    }

    fn line(&self) -> usize {
        self.line
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for InputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputPort")
            .field("name", &self.name)
            .field("line", &self.line)
            .finish()
    }
}

enum Backing {
    Memory(Vec<u8>),
    Stream(Box<dyn Write>),
}

/// An output port over any writer, or over an in-memory buffer whose contents can be taken back
/// with [OutputPort::take_string].
pub struct OutputPort {
    name: String,
    backing: Backing,
}

impl OutputPort {
    pub fn new(name: impl Into<String>, stream: impl Write + 'static) -> Self {
        Self {
            name: name.into(),
            backing: Backing::Stream(Box::new(stream)),
        }
    }

    pub fn string() -> Self {
        Self {
            name: "<string>".into(),
            backing: Backing::Memory(Vec::new()),
        }
    }

    pub fn is_string_port(&self) -> bool {
        matches!(self.backing, Backing::Memory(_))
    }

    /// Takes everything written so far to a string port, `None` for stream ports.
    pub fn take_string(&mut self) -> Option<Vec<u8>> {
        match &mut self.backing {
            Backing::Memory(buffer) => Some(std::mem::take(buffer)),
            Backing::Stream(_) => None,
        }
    }
}

impl Sink for OutputPort {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.backing {
            Backing::Memory(buffer) => {
                buffer.extend_from_slice(bytes);
                Ok(())
            }
            Backing::Stream(stream) => stream.write_all(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.backing {
            Backing::Memory(_) => Ok(()),
            Backing::Stream(stream) => stream.flush(),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for OutputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPort")
            .field("name", &self.name)
            .field("string", &self.is_string_port())
            .finish()
    }
}

impl Sink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
