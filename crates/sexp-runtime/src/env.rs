//! Environment frames. The evaluator creates one frame per scope, this module only defines how a
//! name is found by walking the parent chain.

use crate::error::{Error, Result};
use crate::heap::{Heap, HeapObject};
use crate::value::pointer::{Bindings, Environment};
use crate::value::{Tagged, Value};

impl Heap {
    /// A new empty frame, global when it has no parent.
    pub fn make_environment(&mut self, parent: Option<Value>) -> Result<Value> {
        let parent = match parent {
            Some(parent) => {
                self.environment(parent)?;
                match parent.classify() {
                    Tagged::Pointer(at) => Some(at),
                    _ => return Err(Error::type_error("environment", self.type_name(parent))),
                }
            }
            None => None,
        };

        Ok(self.alloc(HeapObject::Environment(Environment {
            flags: 0,
            parent,
            bindings: Bindings::default(),
        })))
    }

    pub fn env_parent(&self, env: Value) -> Result<Option<Value>> {
        Ok(self.environment(env)?.parent.map(Value::pointer))
    }

    pub fn env_is_global(&self, env: Value) -> Result<bool> {
        Ok(self.environment(env)?.is_global())
    }

    /// Binds `name` in this frame, shadowing any binding of a parent.
    pub fn env_define(&mut self, env: Value, name: Value, value: Value) -> Result<()> {
        self.environment_mut(env)?.bindings.insert(name, value);
        Ok(())
    }

    /// The value bound to `name` in the nearest frame that binds it.
    pub fn env_lookup(&self, env: Value, name: Value) -> Result<Option<Value>> {
        let mut frame = Some(env);

        while let Some(current) = frame {
            let environment = self.environment(current)?;
            if let Some(value) = environment.bindings.get(&name) {
                return Ok(Some(*value));
            }
            frame = environment.parent.map(Value::pointer);
        }

        Ok(None)
    }

    /// Assigns the nearest existing binding of `name`, returns false when no frame binds it.
    pub fn env_set(&mut self, env: Value, name: Value, value: Value) -> Result<bool> {
        let mut frame = Some(env);

        while let Some(current) = frame {
            let environment = self.environment_mut(current)?;
            if let Some(slot) = environment.bindings.get_mut(&name) {
                *slot = value;
                return Ok(true);
            }
            frame = environment.parent.map(Value::pointer);
        }

        Ok(false)
    }
}
