use std::fmt::Debug;

use super::*;

/// A handle to a slot of the heap arena. Handles are what a pointer value carries instead of a
/// machine address, so a stale handle is detected by the heap instead of corrupting memory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(u32);

impl ObjRef {
    #[inline(always)]
    pub const fn new(index: u32) -> ObjRef {
        ObjRef(index)
    }

    #[inline(always)]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl Debug for ObjRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Selectors of the singleton values living under the `1110` tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum Immediate {
    Null = 0,
    False = 1,
    True = 2,
    Eof = 3,
    Unspecified = 4,
    Error = 5,
    /// Reader internal, a `)` token.
    Close = 6,
    /// Reader internal, a bare `.` token.
    RawDot = 7,
}

impl Immediate {
    pub fn from_selector(selector: u64) -> Option<Immediate> {
        Some(match selector {
            0 => Immediate::Null,
            1 => Immediate::False,
            2 => Immediate::True,
            3 => Immediate::Eof,
            4 => Immediate::Unspecified,
            5 => Immediate::Error,
            6 => Immediate::Close,
            7 => Immediate::RawDot,
            _ => return None,
        })
    }
}

/// "Fat" view of a [Value] that is easier to work with in the rust side. Exactly one variant
/// matches every word, so matching on it replaces testing the tag bits by hand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tagged {
    Pointer(ObjRef),
    Fixnum(i64),
    LongSymbol(ObjRef),
    ShortSymbol(ShortSymbol),
    Char(char),
    Immediate(Immediate),
}

impl Value {
    pub fn classify(self) -> Tagged {
        let bits = self.to_bits();

        if self.is_pointer() {
            Tagged::Pointer(ObjRef((bits >> FIXNUM_BITS) as u32))
        } else if self.is_fixnum() {
            Tagged::Fixnum(self.unbox_integer())
        } else if self.is_long_symbol() {
            Tagged::LongSymbol(ObjRef((bits >> IMMEDIATE_BITS) as u32))
        } else if self.is_immediate_symbol() {
            Tagged::ShortSymbol(ShortSymbol::from_raw(bits >> IMMEDIATE_BITS))
        } else if self.is_char() {
            // words are only built from `char` or validated by `from_bits`
            Tagged::Char(char::from_u32(self.unbox_character()).unwrap_or(char::REPLACEMENT_CHARACTER))
        } else {
            let selector = bits >> EXTENDED_BITS;
            Tagged::Immediate(Immediate::from_selector(selector).unwrap_or(Immediate::Error))
        }
    }
}

impl From<Tagged> for Value {
    fn from(tagged: Tagged) -> Self {
        match tagged {
            Tagged::Pointer(at) => Value::pointer(at),
            Tagged::Fixnum(n) => Value::integer(n),
            Tagged::LongSymbol(at) => Value::long_symbol(at),
            Tagged::ShortSymbol(symbol) => Value::short_symbol(symbol),
            Tagged::Char(c) => Value::character(c),
            Tagged::Immediate(immediate) => Value::immediate(immediate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Value::integer(-3).classify(), Tagged::Fixnum(-3));
        assert_eq!(Value::character('x').classify(), Tagged::Char('x'));
        assert_eq!(Value::NULL.classify(), Tagged::Immediate(Immediate::Null));
        assert_eq!(Value::RAWDOT.classify(), Tagged::Immediate(Immediate::RawDot));
        assert_eq!(
            Value::pointer(ObjRef::new(9)).classify(),
            Tagged::Pointer(ObjRef::new(9))
        );
    }

    #[test]
    fn test_classify_round_trip() {
        let symbol = ShortSymbol::encode(b"car").unwrap();

        for tagged in [
            Tagged::Fixnum(FIXNUM_MIN),
            Tagged::Char('\u{10FFFF}'),
            Tagged::LongSymbol(ObjRef::new(u32::MAX)),
            Tagged::ShortSymbol(symbol),
            Tagged::Immediate(Immediate::Unspecified),
        ] {
            assert_eq!(Value::from(tagged).classify(), tagged);
        }
    }
}
