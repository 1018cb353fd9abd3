//! Registry of declared types.

use rustc_hash::FxHashMap;

use super::{TypeDef, ValueType};
use crate::base::{Heap, Object, ObjectId, Record, TypeName, Value};
use crate::error::{TranslateError, TranslateResult};

/// All types known to a translator. Immutable once handed to a
/// [`Translator`](crate::Translator).
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: FxHashMap<TypeName, TypeDef>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, replacing any previous definition with the same name.
    pub fn register(&mut self, def: TypeDef) -> &mut Self {
        self.types.insert(def.name().clone(), def);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, def: TypeDef) -> Self {
        self.register(def);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// The type and its registered ancestors, root first.
    ///
    /// A supertype that is not registered ends the chain. A supertype cycle is
    /// reported as an instantiation error.
    pub fn lineage(&self, name: &str) -> TranslateResult<Vec<&TypeDef>> {
        let mut chain = Vec::new();
        let mut current = self
            .get(name)
            .ok_or_else(|| TranslateError::instantiation(name, "type is not registered"))?;
        loop {
            if chain.len() > self.types.len() {
                return Err(TranslateError::instantiation(
                    name,
                    "supertype chain contains a cycle",
                ));
            }
            chain.push(current);
            match current.supertype().and_then(|s| self.get(s)) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        chain.reverse();
        Ok(chain)
    }

    /// Whether `candidate` is `required` or one of its subtypes.
    ///
    /// Walks declared supertypes; an unregistered candidate is only a subtype
    /// of itself.
    pub fn is_subtype(&self, candidate: &str, required: &str) -> bool {
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(name) = current {
            if name == required {
                return true;
            }
            steps += 1;
            if steps > self.types.len() {
                return false;
            }
            current = self
                .get(name)
                .and_then(|def| def.supertype())
                .map(TypeName::as_str);
        }
        false
    }

    /// Whether a slot of type `ty` may hold `value`. Null is always accepted
    /// here; nullability is a property of the slot.
    pub fn accepts(&self, heap: &Heap, ty: &ValueType, value: &Value) -> bool {
        let Value::Ref(id) = value else {
            return ty.accepts_scalar(value);
        };
        match (ty, heap.get(*id)) {
            (ValueType::Any, Some(_)) => true,
            (ValueType::Object(required), Some(Object::Record(record))) => {
                self.is_subtype(record.type_name(), required)
            }
            (ValueType::List(_), Some(Object::List(_))) => true,
            (ValueType::Map(_, _), Some(Object::Map(_))) => true,
            _ => false,
        }
    }

    /// The concrete type to construct when translating a source of runtime
    /// type `source_type` into `requested`.
    ///
    /// The source type and then its supertypes are looked up in the requested
    /// type's variant table; the nearest match wins. Variants must name a
    /// subtype of `requested`; anything else is ignored.
    pub fn concrete_type<'a>(&'a self, requested: &'a TypeName, source_type: &str) -> &'a TypeName {
        let Some(def) = self.get(requested) else {
            return requested;
        };
        let mut current = Some(source_type);
        let mut steps = 0;
        while let Some(name) = current {
            if let Some(variant) = def.variant_for(name) {
                if self.is_subtype(variant, requested) {
                    return variant;
                }
            }
            steps += 1;
            if steps > self.types.len() {
                break;
            }
            current = self
                .get(name)
                .and_then(|d| d.supertype())
                .map(TypeName::as_str);
        }
        requested
    }

    /// Construct a new record of `type_name` with every declared slot
    /// (inherited ones included) set to null.
    pub fn instantiate(&self, heap: &mut Heap, type_name: &str) -> TranslateResult<ObjectId> {
        let lineage = self.lineage(type_name)?;
        let Some(def) = lineage.last() else {
            return Err(TranslateError::instantiation(type_name, "type is not registered"));
        };
        if !def.is_constructible() {
            return Err(TranslateError::instantiation(
                type_name,
                "type has no usable constructor",
            ));
        }
        let mut record = Record::new(def.name().clone());
        for field in lineage.iter().flat_map(|d| d.fields()) {
            record.set(field.name.clone(), Value::Null);
        }
        Ok(heap.try_alloc(Object::Record(record))?)
    }
}
