//! Symbol interning. Every name maps to exactly one [Value] inside a universe: short names are
//! packed into an immediate word when compact symbols are enabled, everything else becomes a long
//! symbol stored once in the heap and found again through a hash bucketed table.

use crate::heap::Heap;
use crate::value::Value;

pub mod compact;

use compact::ShortSymbol;

/// Number of hash buckets, a prime keeps the fx hash spread over all of them.
const BUCKETS: usize = 389;

/// The name of the dotted pair symbol.
pub const DOT: &[u8] = b".";

/// Hash of a symbol name.
pub fn string_hash(name: &[u8]) -> u64 {
    fxhash::hash64(name)
}

#[derive(Debug)]
pub struct SymbolTable {
    buckets: Vec<Vec<(u64, Value)>>,
    compact: bool,
    dot: Value,
    len: usize,
}

impl SymbolTable {
    /// Creates the table and registers the dot symbol in `heap`.
    pub fn new(heap: &mut Heap, compact: bool) -> Self {
        let mut table = Self {
            buckets: vec![Vec::new(); BUCKETS],
            compact,
            dot: Value::NULL,
            len: 0,
        };
        table.dot = table.insert_long(heap, DOT);
        table
    }

    /// Whether short names become immediate symbols.
    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// The symbol of the dotted pair syntax.
    pub fn dot(&self) -> Value {
        self.dot
    }

    /// Number of long symbols.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The symbol named `name`, allocating it the first time the name is seen.
    pub fn intern(&mut self, heap: &mut Heap, name: &[u8]) -> Value {
        match self.lookup(heap, name) {
            Some(symbol) => symbol,
            None => self.insert_long(heap, name),
        }
    }

    /// The symbol named `name` if interning it would not allocate: it was seen before, or it packs
    /// into an immediate word.
    pub fn lookup(&self, heap: &Heap, name: &[u8]) -> Option<Value> {
        if name == DOT {
            return Some(self.dot);
        }

        if self.compact {
            if let Some(symbol) = ShortSymbol::encode(name) {
                return Some(Value::short_symbol(symbol));
            }
        }

        self.lookup_long(heap, name)
    }

    fn lookup_long(&self, heap: &Heap, name: &[u8]) -> Option<Value> {
        let hash = string_hash(name);
        self.buckets[bucket_of(hash)]
            .iter()
            .filter(|(entry, _)| *entry == hash)
            .map(|(_, symbol)| *symbol)
            .find(|symbol| {
                heap.symbol_name(*symbol)
                    .is_ok_and(|existing| *existing == *name)
            })
    }

    fn insert_long(&mut self, heap: &mut Heap, name: &[u8]) -> Value {
        let hash = string_hash(name);
        let symbol = heap.alloc_symbol(name);

        log::trace!(
            "interned long symbol {:?} as {symbol:?}",
            String::from_utf8_lossy(name)
        );

        self.buckets[bucket_of(hash)].push((hash, symbol));
        self.len += 1;
        symbol
    }

    /// Every long symbol. The table keeps them alive, so they are roots of a collection.
    pub fn roots(&self) -> impl Iterator<Item = Value> + '_ {
        self.buckets.iter().flatten().map(|(_, symbol)| *symbol)
    }
}

fn bucket_of(hash: u64) -> usize {
    (hash % BUCKETS as u64) as usize
}
