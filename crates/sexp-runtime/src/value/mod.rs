//! This module describes the values that the runtime manipulates. A [Value] is a single 64 bit
//! word that is either a handle to a heap object or an immediate value whose payload lives in the
//! high bits of the word. The low bits form a prefix code instead of a fixed width tag, so the two
//! most frequent cases (pointers and integers) keep 62 bits of payload:
//!
//! ```text
//!   ..00    heap pointer, the object carries its own type tag
//!   ..01    fixnum
//!   .011    long symbol, heap allocated and interned
//!   .111    short symbol, name packed in the high bits
//!   0110    character
//!   1110    other immediate (null, booleans, eof, ...)
//! ```
//!
//! The bit layout is an internal detail, use [Value::classify] to get the closed [Tagged] view.

use std::fmt::Debug;

pub mod arith;
pub mod display;
pub mod pointer;
pub mod tagged;
pub mod trace;

pub use tagged::{Immediate, ObjRef, Tagged};

use crate::symbol::compact::ShortSymbol;

pub(crate) const FIXNUM_BITS: u32 = 2;
pub(crate) const IMMEDIATE_BITS: u32 = 3;
pub(crate) const EXTENDED_BITS: u32 = 4;

pub(crate) const FIXNUM_MASK: u64 = 0b11;
pub(crate) const IMMEDIATE_MASK: u64 = 0b111;
pub(crate) const EXTENDED_MASK: u64 = 0b1111;

pub(crate) const POINTER_TAG: u64 = 0b00;
pub(crate) const FIXNUM_TAG: u64 = 0b01;
pub(crate) const LSYMBOL_TAG: u64 = 0b011;
pub(crate) const ISYMBOL_TAG: u64 = 0b111;
pub(crate) const CHAR_TAG: u64 = 0b0110;
pub(crate) const EXTENDED_TAG: u64 = 0b1110;

/// Smallest integer that fits in a fixnum.
pub const FIXNUM_MIN: i64 = i64::MIN >> FIXNUM_BITS;

/// Largest integer that fits in a fixnum.
pub const FIXNUM_MAX: i64 = i64::MAX >> FIXNUM_BITS;

const fn make_immediate(selector: u64) -> u64 {
    (selector << EXTENDED_BITS) | EXTENDED_TAG
}

/// A tagged machine word. Two values are the same object if and only if their bits are equal,
/// which is what makes `eq?`, `memq` and interned symbols O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Value(u64);

impl Value {
    pub const NULL: Value = Value(make_immediate(Immediate::Null as u64));
    pub const FALSE: Value = Value(make_immediate(Immediate::False as u64));
    pub const TRUE: Value = Value(make_immediate(Immediate::True as u64));
    pub const EOF: Value = Value(make_immediate(Immediate::Eof as u64));
    pub const UNSPECIFIED: Value = Value(make_immediate(Immediate::Unspecified as u64));
    pub const ERROR: Value = Value(make_immediate(Immediate::Error as u64));

    /// Reader sentinel for a `)` token.
    pub(crate) const CLOSE: Value = Value(make_immediate(Immediate::Close as u64));

    /// Reader sentinel for a bare `.` token.
    pub(crate) const RAWDOT: Value = Value(make_immediate(Immediate::RawDot as u64));

    /// Boxes an integer. This is a plain shift: the two high bits of `n` are lost if it is
    /// outside of [FIXNUM_MIN]..=[FIXNUM_MAX], checking that is up to the caller.
    #[inline(always)]
    pub const fn integer(n: i64) -> Value {
        Value(((n as u64) << FIXNUM_BITS) | FIXNUM_TAG)
    }

    /// Boxes a character, the code point lives above the extended tag.
    #[inline(always)]
    pub const fn character(c: char) -> Value {
        Value(((c as u64) << EXTENDED_BITS) | CHAR_TAG)
    }

    #[inline(always)]
    pub const fn boolean(b: bool) -> Value {
        if b {
            Value::TRUE
        } else {
            Value::FALSE
        }
    }

    #[inline(always)]
    pub const fn immediate(immediate: Immediate) -> Value {
        Value(make_immediate(immediate as u64))
    }

    #[inline(always)]
    pub(crate) const fn pointer(at: ObjRef) -> Value {
        Value((at.index() as u64) << FIXNUM_BITS)
    }

    #[inline(always)]
    pub(crate) const fn long_symbol(at: ObjRef) -> Value {
        Value(((at.index() as u64) << IMMEDIATE_BITS) | LSYMBOL_TAG)
    }

    #[inline(always)]
    pub(crate) const fn short_symbol(symbol: ShortSymbol) -> Value {
        Value((symbol.bits() << IMMEDIATE_BITS) | ISYMBOL_TAG)
    }

    /// Unboxes an integer with an arithmetic shift, without looking at the tag.
    #[inline(always)]
    pub const fn unbox_integer(self) -> i64 {
        (self.0 as i64) >> FIXNUM_BITS
    }

    /// Unboxes a character code point, without looking at the tag.
    #[inline(always)]
    pub const fn unbox_character(self) -> u32 {
        (self.0 >> EXTENDED_BITS) as u32
    }

    /// The raw machine word, for foreign value marshalling.
    #[inline(always)]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a value from a raw word, rejecting words that no constructor produces.
    pub fn from_bits(bits: u64) -> Option<Value> {
        let value = Value(bits);
        let valid = if value.is_pointer() {
            bits >> FIXNUM_BITS <= u32::MAX as u64
        } else if value.is_long_symbol() {
            bits >> IMMEDIATE_BITS <= u32::MAX as u64
        } else if value.is_immediate_symbol() {
            ShortSymbol::from_bits(bits >> IMMEDIATE_BITS).is_some()
        } else if value.is_char() {
            bits >> 32 == 0 && char::from_u32(value.unbox_character()).is_some()
        } else if value.is_immediate() {
            Immediate::from_selector(bits >> EXTENDED_BITS).is_some()
        } else {
            value.is_fixnum()
        };
        valid.then_some(value)
    }
}

/// Tag predicates, exactly one of the six prefix patterns holds for every value.
impl Value {
    #[inline(always)]
    pub const fn is_pointer(self) -> bool {
        self.0 & FIXNUM_MASK == POINTER_TAG
    }

    #[inline(always)]
    pub const fn is_fixnum(self) -> bool {
        self.0 & FIXNUM_MASK == FIXNUM_TAG
    }

    #[inline(always)]
    pub const fn is_long_symbol(self) -> bool {
        self.0 & IMMEDIATE_MASK == LSYMBOL_TAG
    }

    #[inline(always)]
    pub const fn is_immediate_symbol(self) -> bool {
        self.0 & IMMEDIATE_MASK == ISYMBOL_TAG
    }

    #[inline(always)]
    pub const fn is_char(self) -> bool {
        self.0 & EXTENDED_MASK == CHAR_TAG
    }

    #[inline(always)]
    pub const fn is_immediate(self) -> bool {
        self.0 & EXTENDED_MASK == EXTENDED_TAG
    }

    #[inline(always)]
    pub const fn is_symbol(self) -> bool {
        self.is_long_symbol() || self.is_immediate_symbol()
    }

    #[inline(always)]
    pub const fn is_null(self) -> bool {
        self.0 == Value::NULL.0
    }

    #[inline(always)]
    pub const fn is_boolean(self) -> bool {
        self.0 == Value::TRUE.0 || self.0 == Value::FALSE.0
    }

    #[inline(always)]
    pub const fn is_eof(self) -> bool {
        self.0 == Value::EOF.0
    }

    /// Scheme truthiness, everything but `#f` is true.
    #[inline(always)]
    pub const fn is_true(self) -> bool {
        self.0 != Value::FALSE.0
    }
}

/// Checked accessors.
impl Value {
    pub fn as_integer(self) -> Option<i64> {
        self.is_fixnum().then(|| self.unbox_integer())
    }

    pub fn as_char(self) -> Option<char> {
        if self.is_char() {
            char::from_u32(self.unbox_character())
        } else {
            None
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        self.is_boolean().then_some(self == Value::TRUE)
    }

    /// The heap handle behind a pointer or a long symbol.
    pub fn heap_ref(self) -> Option<ObjRef> {
        match self.classify() {
            Tagged::Pointer(at) | Tagged::LongSymbol(at) => Some(at),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::integer(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::character(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::boolean(value)
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.classify())
    }
}
