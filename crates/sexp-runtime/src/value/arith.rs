//! Fixnum arithmetic straight on the tagged words. The tag is shifted or subtracted out, the
//! operation is done on the machine word and the tag is put back. Overflow wraps like the host
//! word does, promotion to bignums is left to the evaluator.

use crate::error::{Error, Result};

use super::*;

impl Value {
    #[inline(always)]
    fn fixnum_bits(self) -> i64 {
        debug_assert!(self.is_fixnum(), "fixnum arithmetic on {self:?}");
        self.to_bits() as i64
    }

    #[inline(always)]
    fn from_fixnum_bits(bits: i64) -> Value {
        Value(bits as u64)
    }

    /// `(a << 2 | 1) + (b << 2 | 1) - 1`
    pub fn fixnum_add(self, other: Value) -> Value {
        let bits = self.fixnum_bits().wrapping_add(other.fixnum_bits()) - FIXNUM_TAG as i64;
        Value::from_fixnum_bits(bits)
    }

    /// `(a << 2 | 1) - (b << 2 | 1) + 1`
    pub fn fixnum_sub(self, other: Value) -> Value {
        let bits = self.fixnum_bits().wrapping_sub(other.fixnum_bits()) + FIXNUM_TAG as i64;
        Value::from_fixnum_bits(bits)
    }

    /// `(a << 2) * b + 1`, only one side needs to be untagged.
    pub fn fixnum_mul(self, other: Value) -> Value {
        let lhs = self.fixnum_bits() - FIXNUM_TAG as i64;
        let rhs = other.fixnum_bits() >> FIXNUM_BITS;
        Value::from_fixnum_bits(lhs.wrapping_mul(rhs) | FIXNUM_TAG as i64)
    }

    /// Truncating division.
    pub fn fixnum_div(self, other: Value) -> Result<Value> {
        let (lhs, rhs) = self.fixnum_operands(other)?;
        Ok(Value::integer(lhs.wrapping_div(rhs)))
    }

    /// Remainder with the sign of the dividend.
    pub fn fixnum_rem(self, other: Value) -> Result<Value> {
        let (lhs, rhs) = self.fixnum_operands(other)?;
        Ok(Value::integer(lhs.wrapping_rem(rhs)))
    }

    fn fixnum_operands(self, other: Value) -> Result<(i64, i64)> {
        let lhs = self.fixnum_bits() >> FIXNUM_BITS;
        let rhs = other.fixnum_bits() >> FIXNUM_BITS;

        if rhs == 0 {
            return Err(Error::DivideByZero);
        }

        Ok((lhs, rhs))
    }

    /// Tagging is monotonic, so fixnums compare as raw words.
    pub fn fixnum_cmp(self, other: Value) -> std::cmp::Ordering {
        self.fixnum_bits().cmp(&other.fixnum_bits())
    }
}
