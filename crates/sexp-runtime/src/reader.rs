//! The reader parses external S-expression text from a [Source] into values. Each call to [read]
//! produces one datum and leaves the port right after it, so reading can resume where it stopped.

use std::fmt::Display;

use num_bigint::BigInt;

use crate::error::{Error, Result, SyntaxKind};
use crate::heap::Heap;
use crate::port::Source;
use crate::symbol::SymbolTable;
use crate::value::{Value, FIXNUM_MAX, FIXNUM_MIN};

/// A prefix is a character that wraps the next datum in a two element list.
#[derive(Clone, Copy)]
enum Prefix {
    Quote,
    Quasiquote,
    Unquote,
    UnquoteSplicing,
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::Quote => write!(f, "quote"),
            Prefix::Quasiquote => write!(f, "quasiquote"),
            Prefix::Unquote => write!(f, "unquote"),
            Prefix::UnquoteSplicing => write!(f, "unquote-splicing"),
        }
    }
}

impl Prefix {
    fn syntax(self) -> &'static str {
        match self {
            Prefix::Quote => "'",
            Prefix::Quasiquote => "`",
            Prefix::Unquote => ",",
            Prefix::UnquoteSplicing => ",@",
        }
    }
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'(' | b')' | b'\'' | b'"' | b';')
}

/// Named characters, the writer uses the same table.
pub(crate) const CHAR_NAMES: [(&str, char); 5] = [
    ("space", ' '),
    ("newline", '\n'),
    ("tab", '\t'),
    ("return", '\r'),
    ("nul", '\0'),
];

/// One step of the token stream.
enum Token {
    Open,
    OpenVector,
    Close,
    Dot,
    Prefix(Prefix),
    DatumComment,
    Datum(Value),
}

/// What follows the elements of an open list.
#[derive(Clone, Copy)]
enum Tail {
    Proper,
    /// A dot was read, the tail comes next.
    Dot,
    Value(Value),
}

/// A structure that was opened and still waits for data.
enum Frame {
    List { elements: Vec<Value>, tail: Tail },
    Vector(Vec<Value>),
    Prefix(Prefix),
    Comment,
}

impl Frame {
    /// The error when the input ends inside this frame.
    fn unclosed(&self) -> SyntaxKind {
        match self {
            Frame::List { .. } => SyntaxKind::UnclosedList,
            Frame::Vector(_) => SyntaxKind::UnclosedVector,
            Frame::Prefix(prefix) => SyntaxKind::MissingDatum(prefix.syntax()),
            Frame::Comment => SyntaxKind::MissingDatum("#;"),
        }
    }
}

/// A state is the mutable context of one read: the port, the universe new values go to and the
/// structures opened so far. Nesting lives in `frames`, never on the call stack.
pub struct State<'a> {
    source: &'a mut dyn Source,
    heap: &'a mut Heap,
    symbols: &'a mut SymbolTable,
    frames: Vec<Frame>,
}

impl<'a> State<'a> {
    pub fn new(source: &'a mut dyn Source, heap: &'a mut Heap, symbols: &'a mut SymbolTable) -> Self {
        Self {
            source,
            heap,
            symbols,
            frames: Vec::new(),
        }
    }

    fn error(&self, kind: SyntaxKind) -> Error {
        log::debug!("syntax error at {}:{}: {kind}", self.source.name(), self.source.line());

        Error::Syntax {
            kind,
            port: self.source.name().to_string(),
            line: self.source.line(),
        }
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        Ok(self.source.read_byte()?)
    }

    fn accumulate_while<F>(&mut self, first: u8, mut f: F) -> Result<Vec<u8>>
    where
        F: FnMut(u8) -> bool,
    {
        let mut bytes = vec![first];

        while let Some(byte) = self.advance()? {
            if f(byte) {
                bytes.push(byte);
            } else {
                self.source.push_back(byte);
                break;
            }
        }

        Ok(bytes)
    }

    /// An atom runs up to the next delimiter or up to a `#(` that opens a vector.
    fn token(&mut self, first: u8) -> Result<Vec<u8>> {
        let mut bytes = vec![first];

        while let Some(byte) = self.advance()? {
            if is_delimiter(byte) {
                self.source.push_back(byte);
                break;
            }

            if byte == b'#' {
                match self.advance()? {
                    Some(b'(') => {
                        self.source.push_back(b'(');
                        self.source.push_back(b'#');
                        break;
                    }
                    Some(next) => self.source.push_back(next),
                    None => {}
                }
            }

            bytes.push(byte);
        }

        Ok(bytes)
    }

    /// Skips whitespace and line comments, returns the first byte of the next token.
    fn skip_atmosphere(&mut self) -> Result<Option<u8>> {
        while let Some(byte) = self.advance()? {
            match byte {
                b';' => {
                    while let Some(byte) = self.advance()? {
                        if byte == b'\n' {
                            break;
                        }
                    }
                }
                _ if byte.is_ascii_whitespace() => continue,
                _ => return Ok(Some(byte)),
            }
        }

        Ok(None)
    }

    /// The next token, `None` at the end of the input.
    fn next_token(&mut self) -> Result<Option<Token>> {
        let Some(byte) = self.skip_atmosphere()? else {
            return Ok(None);
        };

        let token = match byte {
            b'(' => Token::Open,
            b')' => Token::Close,
            b'\'' => Token::Prefix(Prefix::Quote),
            b'`' => Token::Prefix(Prefix::Quasiquote),
            b',' => match self.advance()? {
                Some(b'@') => Token::Prefix(Prefix::UnquoteSplicing),
                Some(other) => {
                    self.source.push_back(other);
                    Token::Prefix(Prefix::Unquote)
                }
                None => Token::Prefix(Prefix::Unquote),
            },
            b'"' => Token::Datum(self.read_string()?),
            b'#' => self.read_hash()?,
            _ => self.read_atom(byte)?,
        };

        Ok(Some(token))
    }

    /// Reads one top level datum. `None` means the input ended before a datum started, which
    /// tells the end of the input apart from a `#!eof` literal.
    pub fn read(&mut self) -> Result<Option<Value>> {
        loop {
            let Some(token) = self.next_token()? else {
                return match self.frames.last() {
                    Some(frame) => Err(self.error(frame.unclosed())),
                    None => Ok(None),
                };
            };

            let value = match token {
                Token::Open => {
                    self.frames.push(Frame::List {
                        elements: Vec::new(),
                        tail: Tail::Proper,
                    });
                    continue;
                }
                Token::OpenVector => {
                    self.frames.push(Frame::Vector(Vec::new()));
                    continue;
                }
                Token::Prefix(prefix) => {
                    self.frames.push(Frame::Prefix(prefix));
                    continue;
                }
                Token::DatumComment => {
                    self.frames.push(Frame::Comment);
                    continue;
                }
                Token::Dot => {
                    self.dot()?;
                    continue;
                }
                Token::Close => self.close()?,
                Token::Datum(value) => value,
            };

            if let Some(value) = self.deliver(value)? {
                return Ok(Some(value));
            }
        }
    }

    /// A dot is only valid after the first element of a list, and only once.
    fn dot(&mut self) -> Result<()> {
        if let Some(Frame::List {
            elements,
            tail: tail @ Tail::Proper,
        }) = self.frames.last_mut()
        {
            if !elements.is_empty() {
                *tail = Tail::Dot;
                return Ok(());
            }
        }

        Err(self.error(SyntaxKind::MisplacedDot))
    }

    fn close(&mut self) -> Result<Value> {
        match self.frames.pop() {
            None => Err(self.error(SyntaxKind::UnmatchedParenthesis)),
            Some(Frame::List {
                elements,
                tail: Tail::Proper,
            }) => Ok(self.heap.list(elements)),
            Some(Frame::List {
                elements,
                tail: Tail::Value(tail),
            }) => Ok(self.heap.list_with_tail(elements, tail)),
            Some(Frame::List { tail: Tail::Dot, .. }) => Err(self.error(SyntaxKind::MisplacedDot)),
            Some(Frame::Vector(elements)) => Ok(self.heap.make_vector_from(elements)),
            Some(frame) => Err(self.error(frame.unclosed())),
        }
    }

    /// Hands a finished datum to the innermost open frame. Returns it back once no frame is left
    /// to take it.
    fn deliver(&mut self, mut value: Value) -> Result<Option<Value>> {
        loop {
            match self.frames.last_mut() {
                None => return Ok(Some(value)),
                Some(Frame::Prefix(prefix)) => {
                    let name = prefix.to_string();
                    self.frames.pop();
                    let name = self.symbols.intern(self.heap, name.as_bytes());
                    value = self.heap.list([name, value]);
                }
                Some(Frame::Comment) => {
                    self.frames.pop();
                    return Ok(None);
                }
                Some(Frame::Vector(elements)) => {
                    elements.push(value);
                    return Ok(None);
                }
                Some(Frame::List { elements, tail }) => {
                    match *tail {
                        Tail::Proper => elements.push(value),
                        Tail::Dot => *tail = Tail::Value(value),
                        Tail::Value(_) => return Err(self.error(SyntaxKind::MisplacedDot)),
                    }
                    return Ok(None);
                }
            }
        }
    }

    fn read_string(&mut self) -> Result<Value> {
        let mut bytes = Vec::new();

        loop {
            let Some(byte) = self.advance()? else {
                return Err(self.error(SyntaxKind::UnterminatedString));
            };

            match byte {
                b'"' => break,
                b'\\' => {
                    let Some(escaped) = self.advance()? else {
                        return Err(self.error(SyntaxKind::UnterminatedString));
                    };
                    bytes.push(match escaped {
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'0' => b'\0',
                        other => other,
                    });
                }
                _ => bytes.push(byte),
            }
        }

        Ok(self.heap.make_string(bytes))
    }

    fn read_hash(&mut self) -> Result<Token> {
        let Some(byte) = self.advance()? else {
            return Err(self.error(SyntaxKind::InvalidHashSyntax("#".into())));
        };

        let value = match byte {
            b'(' => return Ok(Token::OpenVector),
            b';' => return Ok(Token::DatumComment),
            b'\\' => self.read_char()?,
            b'!' => {
                let token = self.accumulate_while(b'!', |byte| !is_delimiter(byte))?;
                match &token[..] {
                    b"!eof" => Value::EOF,
                    b"!unspecified" => Value::UNSPECIFIED,
                    _ => return Err(self.hash_error(&token)),
                }
            }
            b't' | b'f' | b'T' | b'F' => {
                let token = self.token(byte)?;
                match &token.to_ascii_lowercase()[..] {
                    b"t" | b"true" => Value::TRUE,
                    b"f" | b"false" => Value::FALSE,
                    _ => return Err(self.hash_error(&token)),
                }
            }
            b'b' | b'o' | b'd' | b'x' | b'B' | b'O' | b'D' | b'X' => {
                let token = self.token(byte)?;
                let radix = match byte.to_ascii_lowercase() {
                    b'b' => 2,
                    b'o' => 8,
                    b'd' => 10,
                    _ => 16,
                };
                match self.parse_number(&token[1..], radix) {
                    Some(value) => value,
                    None => {
                        let text = format!("#{}", String::from_utf8_lossy(&token));
                        return Err(self.error(SyntaxKind::InvalidNumber(text)));
                    }
                }
            }
            _ => {
                let token = self.token(byte)?;
                return Err(self.hash_error(&token));
            }
        };

        Ok(Token::Datum(value))
    }

    fn hash_error(&self, token: &[u8]) -> Error {
        let text = format!("#{}", String::from_utf8_lossy(token));
        self.error(SyntaxKind::InvalidHashSyntax(text))
    }

    fn read_char(&mut self) -> Result<Value> {
        let Some(first) = self.advance()? else {
            return Err(self.error(SyntaxKind::InvalidCharacter(String::new())));
        };

        if is_delimiter(first) {
            return Ok(Value::character(first as char));
        }

        let token = self.token(first)?;
        let text = String::from_utf8_lossy(&token);

        if let [byte] = token[..] {
            if byte.is_ascii() {
                return Ok(Value::character(byte as char));
            }
        }

        if let Some((_, c)) = CHAR_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&text))
        {
            return Ok(Value::character(*c));
        }

        if let Some(hex) = text.strip_prefix('x') {
            if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                return Ok(Value::character(c));
            }
        }

        if let Ok(decoded) = std::str::from_utf8(&token) {
            let mut chars = decoded.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(Value::character(c));
            }
        }

        Err(self.error(SyntaxKind::InvalidCharacter(text.into_owned())))
    }

    fn read_atom(&mut self, first: u8) -> Result<Token> {
        let token = self.token(first)?;

        if token == b"." {
            return Ok(Token::Dot);
        }

        let value = match &token[..] {
            b"+inf.0" => self.heap.make_flonum(f64::INFINITY),
            b"-inf.0" => self.heap.make_flonum(f64::NEG_INFINITY),
            b"+nan.0" | b"-nan.0" => self.heap.make_flonum(f64::NAN),
            _ if looks_numeric(&token) => self.parse_number(&token, 10).ok_or_else(|| {
                self.error(SyntaxKind::InvalidNumber(
                    String::from_utf8_lossy(&token).into_owned(),
                ))
            })?,
            _ => self.symbols.intern(self.heap, &token),
        };

        Ok(Token::Datum(value))
    }

    /// A fixnum, a bignum when the integer does not fit, or a float in radix 10.
    fn parse_number(&mut self, token: &[u8], radix: u32) -> Option<Value> {
        let text = std::str::from_utf8(token).ok()?;
        let digits = text.strip_prefix(['+', '-']).unwrap_or(text);

        if !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)) {
            return match i64::from_str_radix(text, radix) {
                Ok(n) if (FIXNUM_MIN..=FIXNUM_MAX).contains(&n) => Some(Value::integer(n)),
                _ => {
                    let n = BigInt::parse_bytes(digits.as_bytes(), radix)?;
                    let n = if text.starts_with('-') { -n } else { n };
                    Some(self.heap.make_bignum(n))
                }
            };
        }

        if radix == 10 && is_float(digits) {
            let f = text.parse::<f64>().ok()?;
            return Some(self.heap.make_flonum(f));
        }

        None
    }
}

/// A token that starts like a number must parse as one.
fn looks_numeric(token: &[u8]) -> bool {
    match token {
        [first, ..] if first.is_ascii_digit() => true,
        [b'+' | b'-', second, ..] if second.is_ascii_digit() => true,
        [b'+' | b'-', b'.', third, ..] if third.is_ascii_digit() => true,
        [b'.', second, ..] if second.is_ascii_digit() => true,
        _ => false,
    }
}

/// Unsigned float grammar: digits, an optional fraction, an optional exponent, with at least one
/// digit in the mantissa and either a fraction or an exponent.
fn is_float(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(at) => (&text[..at], Some(&text[at + 1..])),
        None => (text, None),
    };

    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let mantissa_ok = all_digits(whole)
        && fraction.map_or(true, all_digits)
        && whole.len() + fraction.map_or(0, str::len) > 0;

    let exponent_ok = exponent.map_or(true, |exponent| {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        !digits.is_empty() && all_digits(digits)
    });

    mantissa_ok && exponent_ok && (fraction.is_some() || exponent.is_some())
}

/// Reads one datum from `source`, `None` once the input is exhausted.
pub fn read(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    source: &mut dyn Source,
) -> Result<Option<Value>> {
    State::new(source, heap, symbols).read()
}

/// Reads every datum until the end of the input.
pub fn read_all(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    source: &mut dyn Source,
) -> Result<Vec<Value>> {
    let mut state = State::new(source, heap, symbols);
    let mut values = Vec::new();

    while let Some(value) = state.read()? {
        values.push(value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::InputPort;

    fn read_str(text: &str) -> (Heap, SymbolTable, Result<Value>) {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);
        let mut port = InputPort::from_string(text);
        let result = read(&mut heap, &mut symbols, &mut port)
            .map(|value| value.unwrap_or(Value::EOF));
        (heap, symbols, result)
    }

    fn read_every(text: &str) -> (Heap, Result<Vec<Value>>) {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);
        let mut port = InputPort::from_string(text);
        let result = read_all(&mut heap, &mut symbols, &mut port);
        (heap, result)
    }

    fn syntax_kind(result: Result<Value>) -> SyntaxKind {
        match result {
            Err(Error::Syntax { kind, .. }) => kind,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_integers() {
        assert_eq!(read_str("42").2.unwrap(), Value::integer(42));
        assert_eq!(read_str("-7").2.unwrap(), Value::integer(-7));
        assert_eq!(read_str("+7").2.unwrap(), Value::integer(7));
        assert_eq!(read_str("#xff").2.unwrap(), Value::integer(255));
        assert_eq!(read_str("#b-101").2.unwrap(), Value::integer(-5));
        assert_eq!(read_str("#o17").2.unwrap(), Value::integer(15));
    }

    #[test]
    fn test_bignum_overflow() {
        let (heap, _, result) = read_str("123456789012345678901234567890");
        let value = result.unwrap();

        assert!(heap.is_bignum(value));
    }

    #[test]
    fn test_floats() {
        let (heap, _, result) = read_str("1.5e2");
        assert_eq!(heap.flonum(result.unwrap()).unwrap(), 150.0);

        let (heap, _, result) = read_str("-.5");
        assert_eq!(heap.flonum(result.unwrap()).unwrap(), -0.5);

        let (heap, _, result) = read_str("-inf.0");
        assert_eq!(heap.flonum(result.unwrap()).unwrap(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_malformed_numbers() {
        assert!(matches!(
            syntax_kind(read_str("12abc").2),
            SyntaxKind::InvalidNumber(_)
        ));
        assert!(matches!(
            syntax_kind(read_str("1.2.3").2),
            SyntaxKind::InvalidNumber(_)
        ));
        assert!(matches!(
            syntax_kind(read_str("#xzz").2),
            SyntaxKind::InvalidNumber(_)
        ));
    }

    #[test]
    fn test_symbols() {
        let (heap, _, result) = read_str("hello-world");
        let value = result.unwrap();

        assert!(value.is_symbol());
        assert_eq!(&*heap.symbol_name(value).unwrap(), b"hello-world");

        assert!(read_str("+").2.unwrap().is_symbol());
        assert!(read_str("...").2.unwrap().is_symbol());
        assert!(read_str("->x").2.unwrap().is_symbol());
    }

    #[test]
    fn test_dotted_pairs() {
        let (heap, _, result) = read_str("(1 . 2)");
        let pair = result.unwrap();
        assert_eq!(heap.car(pair).unwrap(), Value::integer(1));
        assert_eq!(heap.cdr(pair).unwrap(), Value::integer(2));

        let (heap, _, result) = read_str("(1 2 . 3)");
        let list = result.unwrap();
        let second = heap.cdr(list).unwrap();
        assert_eq!(heap.car(second).unwrap(), Value::integer(2));
        assert_eq!(heap.cdr(second).unwrap(), Value::integer(3));
    }

    #[test]
    fn test_misplaced_dots() {
        assert_eq!(syntax_kind(read_str("(. 1)").2), SyntaxKind::MisplacedDot);
        assert_eq!(syntax_kind(read_str("(1 . 2 . 3)").2), SyntaxKind::MisplacedDot);
        assert_eq!(syntax_kind(read_str("(1 . 2 3)").2), SyntaxKind::MisplacedDot);
        assert_eq!(syntax_kind(read_str("(1 . )").2), SyntaxKind::MisplacedDot);
        assert_eq!(syntax_kind(read_str(".").2), SyntaxKind::MisplacedDot);
    }

    #[test]
    fn test_unclosed_structures() {
        assert_eq!(syntax_kind(read_str("(1 2").2), SyntaxKind::UnclosedList);
        assert_eq!(syntax_kind(read_str("#(1 2").2), SyntaxKind::UnclosedVector);
        assert_eq!(syntax_kind(read_str("\"abc").2), SyntaxKind::UnterminatedString);
        assert_eq!(syntax_kind(read_str(")").2), SyntaxKind::UnmatchedParenthesis);
    }

    #[test]
    fn test_string_escapes() {
        let (heap, _, result) = read_str(r#""a\nb\t\"\\""#);

        assert_eq!(heap.string(result.unwrap()).unwrap().data, b"a\nb\t\"\\");
    }

    #[test]
    fn test_characters() {
        assert_eq!(read_str("#\\a").2.unwrap(), Value::character('a'));
        assert_eq!(read_str("#\\space").2.unwrap(), Value::character(' '));
        assert_eq!(read_str("#\\newline").2.unwrap(), Value::character('\n'));
        assert_eq!(read_str("#\\x41").2.unwrap(), Value::character('A'));
        assert_eq!(read_str("#\\x").2.unwrap(), Value::character('x'));
        assert_eq!(read_str("#\\(").2.unwrap(), Value::character('('));
        assert_eq!(read_str("#\\λ").2.unwrap(), Value::character('λ'));
        assert!(matches!(
            syntax_kind(read_str("#\\bogus").2),
            SyntaxKind::InvalidCharacter(_)
        ));
    }

    #[test]
    fn test_hash_literals() {
        assert_eq!(read_str("#t").2.unwrap(), Value::TRUE);
        assert_eq!(read_str("#false").2.unwrap(), Value::FALSE);
        assert_eq!(read_str("#T").2.unwrap(), Value::TRUE);
        assert_eq!(read_str("#F").2.unwrap(), Value::FALSE);
        assert_eq!(read_str("#TRUE").2.unwrap(), Value::TRUE);
        assert_eq!(read_str("#False").2.unwrap(), Value::FALSE);
        assert_eq!(read_str("#!eof").2.unwrap(), Value::EOF);
        assert_eq!(read_str("#!unspecified").2.unwrap(), Value::UNSPECIFIED);
        assert!(matches!(
            syntax_kind(read_str("#!close").2),
            SyntaxKind::InvalidHashSyntax(_)
        ));
    }

    #[test]
    fn test_quote_prefix() {
        let (heap, _, result) = read_str("'x");
        let list = result.unwrap();

        assert_eq!(heap.length(list).unwrap(), 2);
        let head = heap.car(list).unwrap();
        assert_eq!(&*heap.symbol_name(head).unwrap(), b"quote");

        let (heap, _, result) = read_str(",@x");
        let head = heap.car(result.unwrap()).unwrap();
        assert_eq!(&*heap.symbol_name(head).unwrap(), b"unquote-splicing");

        assert_eq!(
            syntax_kind(read_str("'").2),
            SyntaxKind::MissingDatum("'")
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(read_str("; nothing\n 5").2.unwrap(), Value::integer(5));
        assert_eq!(read_str("#;(1 2) 6").2.unwrap(), Value::integer(6));

        let (heap, _, result) = read_str("(1 #;2 3)");
        assert_eq!(heap.length(result.unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_end_of_input() {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);

        for text in ["", "   ; comment", "#;1"] {
            let mut port = InputPort::from_string(text);
            assert_eq!(read(&mut heap, &mut symbols, &mut port).unwrap(), None);
        }
    }

    #[test]
    fn test_eof_literal_is_a_datum() {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);
        let mut port = InputPort::from_string("1 #!eof 2");
        let mut values = Vec::new();

        while let Some(value) = read(&mut heap, &mut symbols, &mut port).unwrap() {
            values.push(value);
        }

        assert_eq!(values, [Value::integer(1), Value::EOF, Value::integer(2)]);
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 100_000;

        let (heap, _, result) = read_str(&format!("{}{}", "(".repeat(depth), ")".repeat(depth)));
        let mut value = result.unwrap();
        for _ in 1..depth {
            value = heap.car(value).unwrap();
        }
        assert_eq!(value, Value::NULL);

        let (heap, _, result) = read_str(&format!("{}{}", "#(".repeat(depth), ")".repeat(depth)));
        assert!(heap.is_vector(result.unwrap()));

        let (heap, _, result) = read_str(&format!("{}x", "'".repeat(depth)));
        assert_eq!(heap.length(result.unwrap()).unwrap(), 2);

        assert_eq!(
            syntax_kind(read_str(&"(".repeat(depth)).2),
            SyntaxKind::UnclosedList
        );
    }

    #[test]
    fn test_vector_after_atom() {
        let (heap, result) = read_every("abc#(1)");
        let values = result.unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(&*heap.symbol_name(values[0]).unwrap(), b"abc");
        assert!(heap.is_vector(values[1]));

        let (heap, result) = read_every("a#b");
        let values = result.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(&*heap.symbol_name(values[0]).unwrap(), b"a#b");

        let (heap, result) = read_every("12#(3)");
        let values = result.unwrap();
        assert_eq!(values[0], Value::integer(12));
        assert!(heap.is_vector(values[1]));
    }

    #[test]
    fn test_error_line() {
        let (_, _, result) = read_str("(1\n2\n\"abc");

        match result {
            Err(error) => assert_eq!(error.location(), Some(("<string>", 3))),
            Ok(value) => panic!("expected an error, got {value:?}"),
        }
    }

    #[test]
    fn test_resumes_after_datum() {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);
        let mut port = InputPort::from_string("1 (2) 3");

        assert_eq!(
            read(&mut heap, &mut symbols, &mut port).unwrap(),
            Some(Value::integer(1))
        );
        let list = read(&mut heap, &mut symbols, &mut port).unwrap().unwrap();
        assert!(heap.is_pair(list));
        assert_eq!(
            read(&mut heap, &mut symbols, &mut port).unwrap(),
            Some(Value::integer(3))
        );
        assert_eq!(read(&mut heap, &mut symbols, &mut port).unwrap(), None);
    }

    #[test]
    fn test_read_all() {
        let mut heap = Heap::default();
        let mut symbols = SymbolTable::new(&mut heap, true);
        let mut port = InputPort::from_string("a #!eof c");

        let values = read_all(&mut heap, &mut symbols, &mut port).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], Value::EOF);
    }

    #[test]
    fn test_is_float() {
        assert!(is_float("1.5"));
        assert!(is_float("1."));
        assert!(is_float(".5"));
        assert!(is_float("1e10"));
        assert!(is_float("1.5E-3"));
        assert!(!is_float("1"));
        assert!(!is_float("."));
        assert!(!is_float("1e"));
        assert!(!is_float("1.2.3"));
    }
}
