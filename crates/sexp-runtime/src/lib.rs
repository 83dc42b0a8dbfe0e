//! The value core of the runtime: a tagged 64 bit [Value] word, the heap objects it points to, the
//! symbol table, list primitives and the reader and writer for the external S-expression syntax.
//!
//! Everything lives inside a [Universe], which owns one heap and one symbol table:
//!
//! ```
//! use sexp_runtime::Universe;
//!
//! let mut universe = Universe::new();
//! let value = universe.read_str("(define (f x) #(x \"y\" #\\z))").unwrap();
//!
//! assert_eq!(universe.write_to_string(value), "(define (f x) #(x \"y\" #\\z))");
//! ```

pub mod allocator;
pub mod env;
pub mod error;
pub mod heap;
pub mod list;
pub mod port;
pub mod reader;
pub mod symbol;
pub mod universe;
pub mod value;
pub mod writer;

pub use allocator::Backend;
pub use error::{Error, Result, SyntaxKind};
pub use heap::{Heap, HeapObject, TypeTag};
pub use port::{InputPort, OutputPort, Sink, Source};
pub use symbol::SymbolTable;
pub use universe::{Options, Universe};
pub use value::{Immediate, ObjRef, Tagged, Value, FIXNUM_MAX, FIXNUM_MIN};
