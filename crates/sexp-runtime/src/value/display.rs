use std::fmt::{Debug, Display};

use super::Value;
use crate::heap::Heap;

/// A value paired with the heap it lives in, printed in external syntax.
pub struct Printed<'a> {
    heap: &'a Heap,
    value: Value,
}

impl Heap {
    pub fn display(&self, value: Value) -> Printed<'_> {
        Printed { heap: self, value }
    }
}

impl Display for Printed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buffer = Vec::new();
        crate::writer::write(self.heap, self.value, &mut buffer).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", String::from_utf8_lossy(&buffer))
    }
}

impl Debug for Printed<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
