//! Which values a heap object refers to. The collector and the deep release both walk the object
//! graph through [HeapObject::for_each_reference].

use crate::heap::HeapObject;

use super::Value;

impl HeapObject {
    /// The object holds no values, so a collection never looks inside of it.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            HeapObject::String(_)
                | HeapObject::Symbol(_)
                | HeapObject::Float(_)
                | HeapObject::Bignum(_)
                | HeapObject::InputPort(_)
                | HeapObject::OutputPort(_)
                | HeapObject::Bytecode(_)
                | HeapObject::Core(_)
        )
    }

    /// Calls `visit` on every value stored in the object, immediates included.
    pub fn for_each_reference(&self, mut visit: impl FnMut(Value)) {
        match self {
            HeapObject::Pair(pair) => {
                visit(pair.car);
                visit(pair.cdr);
            }
            HeapObject::Vector(vector) => vector.data.iter().copied().for_each(visit),
            HeapObject::Exception(exception) => {
                visit(exception.kind);
                visit(exception.message);
                visit(exception.irritants);
                visit(exception.file);
                visit(exception.line);
            }
            HeapObject::Procedure(procedure) => {
                visit(procedure.bytecode);
                visit(procedure.vars);
            }
            HeapObject::Macro(macro_) => {
                visit(macro_.procedure);
                visit(macro_.env);
            }
            HeapObject::Environment(env) => {
                if let Some(parent) = env.parent {
                    visit(Value::pointer(parent));
                }
                for (name, value) in env.bindings.iter() {
                    visit(*name);
                    visit(*value);
                }
            }
            HeapObject::Opcode(opcode) => {
                visit(opcode.data);
                visit(opcode.procedure);
            }
            HeapObject::String(_)
            | HeapObject::Symbol(_)
            | HeapObject::Float(_)
            | HeapObject::Bignum(_)
            | HeapObject::InputPort(_)
            | HeapObject::OutputPort(_)
            | HeapObject::Bytecode(_)
            | HeapObject::Core(_) => {}
        }
    }
}
