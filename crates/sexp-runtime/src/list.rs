//! List, vector and string primitives. Lists are chains of [Pair]s ending in `()`, everything
//! here compares elements by identity.

use crate::error::{Error, Result};
use crate::heap::{Heap, HeapObject};
use crate::value::pointer::{Pair, Vector};
use crate::value::Value;

/// Pairs.
impl Heap {
    /// Allocates a new pair, never touching its arguments.
    pub fn cons(&mut self, car: Value, cdr: Value) -> Value {
        self.alloc(HeapObject::Pair(Pair::new(car, cdr)))
    }

    pub fn car(&self, pair: Value) -> Result<Value> {
        Ok(self.pair(pair)?.car)
    }

    pub fn cdr(&self, pair: Value) -> Result<Value> {
        Ok(self.pair(pair)?.cdr)
    }

    pub fn set_car(&mut self, pair: Value, value: Value) -> Result<()> {
        self.pair_mut(pair)?.car = value;
        Ok(())
    }

    pub fn set_cdr(&mut self, pair: Value, value: Value) -> Result<()> {
        self.pair_mut(pair)?.cdr = value;
        Ok(())
    }

    /// Builds a proper list out of the elements of an iterator.
    pub fn list<I>(&mut self, elements: I) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.list_with_tail(elements, Value::NULL)
    }

    /// Builds a list whose last cdr is `tail`.
    pub fn list_with_tail<I>(&mut self, elements: I, tail: Value) -> Value
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: DoubleEndedIterator,
    {
        elements
            .into_iter()
            .rev()
            .fold(tail, |acc, element| self.cons(element, acc))
    }

    /// Iterates over the cars of a list, stopping at the first cdr that is not a pair.
    pub fn iter_list(&self, list: Value) -> ListIter<'_> {
        ListIter { heap: self, rest: list }
    }
}

/// Iterator returned by [Heap::iter_list].
pub struct ListIter<'a> {
    heap: &'a Heap,
    rest: Value,
}

impl ListIter<'_> {
    /// What is left of the list, `()` for a proper list that was fully consumed.
    pub fn rest(&self) -> Value {
        self.rest
    }
}

impl Iterator for ListIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let pair = self.heap.pair(self.rest).ok()?;
        self.rest = pair.cdr;
        Some(pair.car)
    }
}

/// List algorithms.
impl Heap {
    /// Is `value` a proper list. Cyclic lists are not.
    pub fn is_list(&self, value: Value) -> bool {
        self.proper_length(value).is_some()
    }

    /// Floyd's cycle detection over the cdr chain.
    fn proper_length(&self, value: Value) -> Option<usize> {
        let mut slow = value;
        let mut fast = value;
        let mut length = 0;

        loop {
            if fast.is_null() {
                return Some(length);
            }
            fast = self.pair(fast).ok()?.cdr;
            length += 1;

            if fast.is_null() {
                return Some(length);
            }
            fast = self.pair(fast).ok()?.cdr;
            length += 1;

            slow = self.pair(slow).ok()?.cdr;
            if fast == slow {
                return None;
            }
        }
    }

    /// Number of pairs in a proper list.
    pub fn length(&self, list: Value) -> Result<usize> {
        self.proper_length(list)
            .ok_or_else(|| Error::type_error("list", self.type_name(list)))
    }

    /// A new list with the elements of `list` in reverse order.
    pub fn reverse(&mut self, list: Value) -> Result<Value> {
        self.length(list)?;

        let mut acc = Value::NULL;
        let mut rest = list;
        while !rest.is_null() {
            let Pair { car, cdr } = *self.pair(rest)?;
            acc = self.cons(car, acc);
            rest = cdr;
        }

        Ok(acc)
    }

    /// Reverses `list` by relinking its own pairs, the argument is destroyed.
    pub fn reverse_in_place(&mut self, list: Value) -> Result<Value> {
        self.length(list)?;

        let mut acc = Value::NULL;
        let mut rest = list;
        while !rest.is_null() {
            let pair = self.pair_mut(rest)?;
            let next = pair.cdr;
            pair.cdr = acc;
            acc = rest;
            rest = next;
        }

        Ok(acc)
    }

    /// Copies the spine of `a` and makes `b` its tail, `b` itself is shared.
    pub fn append(&mut self, a: Value, b: Value) -> Result<Value> {
        self.length(a)?;

        let elements: Vec<Value> = self.iter_list(a).collect();
        Ok(self.list_with_tail(elements, b))
    }

    /// The first sublist of `list` whose car is `value`.
    pub fn memq(&self, value: Value, list: Value) -> Option<Value> {
        let mut rest = list;

        while let Ok(pair) = self.pair(rest) {
            if pair.car == value {
                return Some(rest);
            }
            rest = pair.cdr;
        }

        None
    }

    /// The first pair of an association list whose car is `key`. Entries that are not pairs are
    /// skipped.
    pub fn assq(&self, key: Value, alist: Value) -> Option<Value> {
        self.iter_list(alist)
            .find(|entry| self.pair(*entry).is_ok_and(|pair| pair.car == key))
    }

    /// Position of `value` in `list`.
    pub fn list_index(&self, value: Value, list: Value) -> Option<usize> {
        self.iter_list(list).position(|element| element == value)
    }

    /// The elements of `a` that are not in `b`, in their original order.
    pub fn lset_diff(&mut self, a: Value, b: Value) -> Result<Value> {
        self.length(a)?;

        let kept: Vec<Value> = self
            .iter_list(a)
            .filter(|element| self.memq(*element, b).is_none())
            .collect();

        Ok(self.list(kept))
    }
}

/// Vectors.
impl Heap {
    /// A vector of `len` slots all holding `fill`.
    pub fn make_vector(&mut self, len: usize, fill: Value) -> Value {
        self.alloc(HeapObject::Vector(Vector::filled(len, fill)))
    }

    pub fn make_vector_from(&mut self, elements: Vec<Value>) -> Value {
        self.alloc(HeapObject::Vector(Vector::new(elements)))
    }

    pub fn list_to_vector(&mut self, list: Value) -> Result<Value> {
        self.length(list)?;

        let elements = self.iter_list(list).collect();
        Ok(self.make_vector_from(elements))
    }

    pub fn vector_to_list(&mut self, vector: Value) -> Result<Value> {
        let elements = self.vector(vector)?.data.to_vec();
        Ok(self.list(elements))
    }

    pub fn vector_length(&self, vector: Value) -> Result<usize> {
        Ok(self.vector(vector)?.data.len())
    }

    pub fn vector_ref(&self, vector: Value, index: usize) -> Result<Value> {
        let data = &self.vector(vector)?.data;
        data.get(index).copied().ok_or(Error::OutOfBounds {
            index,
            len: data.len(),
        })
    }

    pub fn vector_set(&mut self, vector: Value, index: usize, value: Value) -> Result<()> {
        let data = &mut self.vector_mut(vector)?.data;
        let len = data.len();
        let slot = data.get_mut(index).ok_or(Error::OutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }
}

/// Strings are byte buffers.
impl Heap {
    pub fn string_length(&self, string: Value) -> Result<usize> {
        Ok(self.string(string)?.data.len())
    }

    pub fn string_ref(&self, string: Value, index: usize) -> Result<u8> {
        let data = &self.string(string)?.data;
        data.get(index).copied().ok_or(Error::OutOfBounds {
            index,
            len: data.len(),
        })
    }

    pub fn string_set(&mut self, string: Value, index: usize, byte: u8) -> Result<()> {
        let data = &mut self.string_mut(string)?.data;
        let len = data.len();
        let slot = data.get_mut(index).ok_or(Error::OutOfBounds { index, len })?;
        *slot = byte;
        Ok(())
    }
}
