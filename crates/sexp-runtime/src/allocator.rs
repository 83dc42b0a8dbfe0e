// This module defines a trait called [Allocator] that is used as the heap of a value universe.
// Objects live in slots of an [Arena] and are reached through [ObjRef] handles. Two backends
// share the arena: [Tracing], where reachability alone decides when a slot is reused, and
// [Manual], where the owner releases objects explicitly.

use std::alloc::{handle_alloc_error, Layout};
use std::fmt::Debug;

use crate::heap::HeapObject;
use crate::value::{ObjRef, Value};

/// Which allocator backs a heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Backend {
    /// Objects are reclaimed by [Allocator::collect], `release` does nothing.
    #[default]
    Tracing,
    /// Objects are reclaimed by `release`, `collect` does nothing.
    Manual,
}

#[derive(Debug)]
struct Slot {
    object: Option<HeapObject>,
    /// The object holds no values, the marker does not look inside of it.
    atomic: bool,
    marked: bool,
}

/// Slot storage shared by the backends.
#[derive(Debug, Default)]
pub struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

/// Allocation failure is fatal, the language has nothing to fall back to without a heap.
fn out_of_memory() -> ! {
    log::error!("heap exhausted, aborting");
    handle_alloc_error(Layout::new::<Slot>())
}

impl Arena {
    fn insert(&mut self, object: HeapObject, atomic: bool) -> ObjRef {
        debug_assert!(
            !atomic || object.is_atomic(),
            "atomic allocation of an object with references"
        );

        let slot = Slot {
            object: Some(object),
            atomic,
            marked: false,
        };

        self.live += 1;

        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = slot;
            return ObjRef::new(index);
        }

        let Ok(index) = u32::try_from(self.slots.len()) else {
            out_of_memory()
        };

        if self.slots.try_reserve(1).is_err() {
            out_of_memory()
        }

        self.slots.push(slot);
        ObjRef::new(index)
    }

    fn remove(&mut self, at: ObjRef) -> Option<HeapObject> {
        let slot = self.slots.get_mut(at.index() as usize)?;
        let object = slot.object.take()?;
        self.free.push(at.index());
        self.live -= 1;
        Some(object)
    }

    fn get(&self, at: ObjRef) -> Option<&HeapObject> {
        self.slots.get(at.index() as usize)?.object.as_ref()
    }

    fn get_mut(&mut self, at: ObjRef) -> Option<&mut HeapObject> {
        self.slots.get_mut(at.index() as usize)?.object.as_mut()
    }

    fn replace(&mut self, at: ObjRef, object: HeapObject) -> Option<ObjRef> {
        let slot = self.slots.get_mut(at.index() as usize)?;
        slot.object.as_ref()?;
        slot.atomic = object.is_atomic();
        slot.object = Some(object);
        Some(at)
    }

    /// Mark and sweep from `roots`, returns how many objects were reclaimed.
    fn mark_and_sweep(&mut self, roots: &mut dyn Iterator<Item = Value>) -> usize {
        let mut stack: Vec<ObjRef> = roots.filter_map(Value::heap_ref).collect();

        while let Some(at) = stack.pop() {
            let Some(slot) = self.slots.get_mut(at.index() as usize) else {
                continue;
            };
            if slot.marked || slot.object.is_none() {
                continue;
            }
            slot.marked = true;
            if slot.atomic {
                continue;
            }
            if let Some(object) = &slot.object {
                object.for_each_reference(|value| {
                    if let Some(child) = value.heap_ref() {
                        stack.push(child);
                    }
                });
            }
        }

        let mut reclaimed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.object.is_some() && !slot.marked {
                slot.object = None;
                self.free.push(index as u32);
                reclaimed += 1;
            }
            slot.marked = false;
        }

        self.live -= reclaimed;
        reclaimed
    }
}

/// The allocation contract every heap object constructor goes through.
pub trait Allocator: Debug {
    fn backend(&self) -> Backend;

    fn arena(&self) -> &Arena;

    fn arena_mut(&mut self) -> &mut Arena;

    fn allocate(&mut self, object: HeapObject) -> ObjRef {
        self.arena_mut().insert(object, false)
    }

    /// Allocation hint for objects that hold no values (strings, floats, bytecode, ...).
    fn allocate_atomic(&mut self, object: HeapObject) -> ObjRef {
        self.arena_mut().insert(object, true)
    }

    /// Replaces the payload behind `at`, handles stay valid across a reallocation.
    fn reallocate(&mut self, at: ObjRef, object: HeapObject) -> Option<ObjRef> {
        self.arena_mut().replace(at, object)
    }

    fn release(&mut self, at: ObjRef);

    /// Reclaims everything not reachable from `roots`.
    fn collect(&mut self, roots: &mut dyn Iterator<Item = Value>) -> usize;

    fn get(&self, at: ObjRef) -> Option<&HeapObject> {
        self.arena().get(at)
    }

    fn get_mut(&mut self, at: ObjRef) -> Option<&mut HeapObject> {
        self.arena_mut().get_mut(at)
    }

    /// Number of live objects.
    fn live(&self) -> usize {
        self.arena().live
    }
}

#[derive(Debug, Default)]
pub struct Tracing {
    arena: Arena,
}

impl Allocator for Tracing {
    fn backend(&self) -> Backend {
        Backend::Tracing
    }

    fn arena(&self) -> &Arena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    fn release(&mut self, _: ObjRef) {}

    fn collect(&mut self, roots: &mut dyn Iterator<Item = Value>) -> usize {
        let reclaimed = self.arena.mark_and_sweep(roots);
        log::debug!("collected {reclaimed} objects, {} live", self.arena.live);
        reclaimed
    }
}

#[derive(Debug, Default)]
pub struct Manual {
    arena: Arena,
}

impl Allocator for Manual {
    fn backend(&self) -> Backend {
        Backend::Manual
    }

    fn arena(&self) -> &Arena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    fn release(&mut self, at: ObjRef) {
        self.arena.remove(at);
    }

    fn collect(&mut self, _: &mut dyn Iterator<Item = Value>) -> usize {
        log::warn!("collection requested from the manual allocator, ignoring");
        0
    }
}

pub fn new_allocator(backend: Backend) -> Box<dyn Allocator> {
    match backend {
        Backend::Tracing => Box::<Tracing>::default(),
        Backend::Manual => Box::<Manual>::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::pointer::{Pair, Str};

    #[test]
    fn test_manual_release_reuses_slot() {
        let mut allocator = Manual::default();
        let a = allocator.allocate_atomic(HeapObject::Float(1.0));

        allocator.release(a);
        assert!(allocator.get(a).is_none());
        assert_eq!(allocator.live(), 0);

        let b = allocator.allocate_atomic(HeapObject::Float(2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_tracing_release_is_noop() {
        let mut allocator = Tracing::default();
        let a = allocator.allocate_atomic(HeapObject::Float(1.0));

        allocator.release(a);
        assert!(allocator.get(a).is_some());
    }

    #[test]
    fn test_tracing_collect() {
        let mut allocator = Tracing::default();
        let string = allocator.allocate_atomic(HeapObject::String(Str::new("kept")));
        let pair = allocator.allocate(HeapObject::Pair(Pair::new(
            Value::pointer(string),
            Value::NULL,
        )));
        let garbage = allocator.allocate_atomic(HeapObject::Float(0.5));

        let reclaimed = allocator.collect(&mut std::iter::once(Value::pointer(pair)));

        assert_eq!(reclaimed, 1);
        assert!(allocator.get(garbage).is_none());
        assert!(allocator.get(string).is_some());
        assert_eq!(allocator.live(), 2);
    }

    #[test]
    fn test_collect_handles_cycles() {
        let mut allocator = Tracing::default();
        let pair = allocator.allocate(HeapObject::Pair(Pair::new(Value::NULL, Value::NULL)));
        allocator.reallocate(
            pair,
            HeapObject::Pair(Pair::new(Value::pointer(pair), Value::pointer(pair))),
        );

        assert_eq!(allocator.collect(&mut std::iter::once(Value::pointer(pair))), 0);
        assert_eq!(allocator.collect(&mut std::iter::empty()), 1);
    }

    #[test]
    fn test_manual_collect_is_noop() {
        let mut allocator = Manual::default();
        allocator.allocate_atomic(HeapObject::Float(1.0));

        assert_eq!(allocator.collect(&mut std::iter::empty()), 0);
        assert_eq!(allocator.live(), 1);
    }
}
