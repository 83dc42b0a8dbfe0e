//! Compact symbol encoding. Short identifier names are packed straight into the high bits of a
//! value so that they never touch the heap or the symbol table:
//!
//! ```text
//!   63                           7 6    3 2   0
//!   [ payload: 57 bits of codes   ][ len ][ 111 ]
//! ```
//!
//! Each character is a 5 bit code taken least significant first. Codes `0..30` are the most
//! common identifier characters, code `30` escapes to a second page of 24 characters using one
//! more 5 bit code, code `31` is never produced. Names that do not fit fall back to long symbols.

use std::fmt::Debug;

const CODE_BITS: u32 = 5;
const CODE_MASK: u64 = 0b11111;
const ESCAPE: u64 = 30;

const LENGTH_BITS: u32 = 4;
const LENGTH_MASK: u64 = 0b1111;
const PAYLOAD_BITS: u32 = 64 - crate::value::IMMEDIATE_BITS - LENGTH_BITS;

/// Longest name the length field can describe.
pub const MAX_LENGTH: usize = LENGTH_MASK as usize;

const PAGE0: &[u8; 30] = b"abcdefghijklmnopqrstuvwxyz-!?*";
const PAGE1: &[u8; 24] = b"0123456789+/<=>._%&$^~:@";

/// A symbol name packed in 61 bits, the tag is added by [crate::Value].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortSymbol(u64);

fn code_of(byte: u8) -> Option<(u64, u32)> {
    if let Some(index) = PAGE0.iter().position(|&c| c == byte) {
        Some((index as u64, CODE_BITS))
    } else {
        let index = PAGE1.iter().position(|&c| c == byte)?;
        Some((ESCAPE | ((index as u64) << CODE_BITS), CODE_BITS * 2))
    }
}

impl ShortSymbol {
    /// Packs `name`, or returns `None` when it is empty, too long, or uses a character outside of
    /// the two code pages.
    pub fn encode(name: &[u8]) -> Option<ShortSymbol> {
        if name.is_empty() || name.len() > MAX_LENGTH {
            return None;
        }

        let mut payload = 0u64;
        let mut used = 0u32;

        for &byte in name {
            let (code, width) = code_of(byte)?;
            if used + width > PAYLOAD_BITS {
                return None;
            }
            payload |= code << used;
            used += width;
        }

        Some(ShortSymbol((payload << LENGTH_BITS) | name.len() as u64))
    }

    /// Unpacks the name. Only words built by [ShortSymbol::encode] are ever decoded, the
    /// validation lives in [ShortSymbol::from_bits].
    pub fn decode(self) -> Vec<u8> {
        self.try_decode().unwrap_or_default()
    }

    fn try_decode(self) -> Option<Vec<u8>> {
        let length = (self.0 & LENGTH_MASK) as usize;
        let mut payload = self.0 >> LENGTH_BITS;
        let mut name = Vec::with_capacity(length);

        for _ in 0..length {
            let code = payload & CODE_MASK;
            payload >>= CODE_BITS;

            if code == ESCAPE {
                let index = (payload & CODE_MASK) as usize;
                payload >>= CODE_BITS;
                name.push(*PAGE1.get(index)?);
            } else {
                name.push(*PAGE0.get(code as usize)?);
            }
        }

        (payload == 0 && length > 0).then_some(name)
    }

    pub fn len(self) -> usize {
        (self.0 & LENGTH_MASK) as usize
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub(crate) const fn bits(self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub(crate) const fn from_raw(bits: u64) -> ShortSymbol {
        ShortSymbol(bits)
    }

    /// Accepts only the canonical packing of some name.
    pub(crate) fn from_bits(bits: u64) -> Option<ShortSymbol> {
        let symbol = ShortSymbol(bits);
        let name = symbol.try_decode()?;
        (ShortSymbol::encode(&name)? == symbol).then_some(symbol)
    }
}

impl Debug for ShortSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.decode()))
    }
}
