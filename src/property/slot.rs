//! Slot access variants.
//!
//! A [`Slot`] is how a destination type exposes one value. The variant is
//! chosen when the descriptor is built; each one implements read, write and
//! null support on its own terms.

use std::fmt;
use std::sync::Arc;

use crate::base::{Heap, Key, Name, ObjectId, Value};

/// Reads a value from an instance.
pub type Getter = Arc<dyn Fn(&Heap, ObjectId) -> Result<Value, String> + Send + Sync>;

/// Writes a value to an instance.
pub type Setter = Arc<dyn Fn(&mut Heap, ObjectId, Value) -> Result<(), String> + Send + Sync>;

/// A getter/setter pair. Either half may be missing.
#[derive(Clone)]
pub struct Accessors {
    getter: Option<Getter>,
    setter: Option<Setter>,
    nullable: bool,
}

impl Accessors {
    pub fn new() -> Self {
        Self {
            getter: None,
            setter: None,
            nullable: true,
        }
    }

    pub fn getter(
        mut self,
        getter: impl Fn(&Heap, ObjectId) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn setter(
        mut self,
        setter: impl Fn(&mut Heap, ObjectId, Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    /// Whether the setter accepts null (default `true`).
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

impl Default for Accessors {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Accessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessors")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// How one destination value is stored.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A record field, read and written directly.
    Field { field: Name },
    /// A record field that must never hold null (constructor-bound values).
    Bound { field: Name },
    /// Getter/setter closures.
    Accessors(Accessors),
    /// The entry under `key` in the map held by `field`.
    MapEntry { field: Name, key: Key },
    /// The element at `index` in the list held by `field`. Writing at
    /// `index == len` appends.
    Element { field: Name, index: usize },
}

impl Slot {
    pub fn field(field: impl Into<Name>) -> Self {
        Slot::Field {
            field: field.into(),
        }
    }

    pub fn can_read(&self) -> bool {
        match self {
            Slot::Accessors(accessors) => accessors.getter.is_some(),
            _ => true,
        }
    }

    pub fn can_write(&self) -> bool {
        match self {
            Slot::Accessors(accessors) => accessors.setter.is_some(),
            _ => true,
        }
    }

    pub fn supports_null(&self) -> bool {
        match self {
            Slot::Field { .. } | Slot::MapEntry { .. } | Slot::Element { .. } => true,
            Slot::Bound { .. } => false,
            Slot::Accessors(accessors) => accessors.nullable,
        }
    }

    pub fn read(&self, heap: &Heap, instance: ObjectId) -> Result<Value, String> {
        match self {
            Slot::Field { field } | Slot::Bound { field } => {
                Ok(record_field(heap, instance, field)?.clone())
            }
            Slot::Accessors(accessors) => match &accessors.getter {
                Some(getter) => getter(heap, instance),
                None => Err("slot has no getter".to_string()),
            },
            Slot::MapEntry { field, key } => {
                let map = container(heap, instance, field)?;
                let entries = heap
                    .map(map)
                    .ok_or_else(|| format!("field `{field}` does not hold a map"))?;
                Ok(entries.get(key).cloned().unwrap_or_default())
            }
            Slot::Element { field, index } => {
                let list = container(heap, instance, field)?;
                let values = heap
                    .list(list)
                    .ok_or_else(|| format!("field `{field}` does not hold a list"))?;
                values
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| format!("index {index} out of bounds ({})", values.len()))
            }
        }
    }

    pub fn write(&self, heap: &mut Heap, instance: ObjectId, value: Value) -> Result<(), String> {
        if value.is_null() && !self.supports_null() {
            return Err("slot does not accept null".to_string());
        }
        match self {
            Slot::Field { field } | Slot::Bound { field } => {
                if heap.set_field(instance, field.clone(), value) {
                    Ok(())
                } else {
                    Err(format!("{instance} is not a record"))
                }
            }
            Slot::Accessors(accessors) => match &accessors.setter {
                Some(setter) => setter(heap, instance, value),
                None => Err("slot has no setter".to_string()),
            },
            Slot::MapEntry { field, key } => {
                let map = container(heap, instance, field)?;
                let entries = heap
                    .map_mut(map)
                    .ok_or_else(|| format!("field `{field}` does not hold a map"))?;
                entries.insert(key.clone(), value);
                Ok(())
            }
            Slot::Element { field, index } => {
                let list = container(heap, instance, field)?;
                let values = heap
                    .list_mut(list)
                    .ok_or_else(|| format!("field `{field}` does not hold a list"))?;
                match (*index).cmp(&values.len()) {
                    std::cmp::Ordering::Less => values[*index] = value,
                    std::cmp::Ordering::Equal => values.push(value),
                    std::cmp::Ordering::Greater => {
                        return Err(format!(
                            "index {index} out of bounds ({})",
                            values.len()
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

fn record_field<'h>(heap: &'h Heap, instance: ObjectId, field: &str) -> Result<&'h Value, String> {
    static NULL: Value = Value::Null;
    let record = heap
        .record(instance)
        .ok_or_else(|| format!("{instance} is not a record"))?;
    Ok(record.get(field).unwrap_or(&NULL))
}

/// Handle of the container held in `field`.
fn container(heap: &Heap, instance: ObjectId, field: &str) -> Result<ObjectId, String> {
    match record_field(heap, instance, field)? {
        Value::Ref(id) => Ok(*id),
        Value::Null => Err(format!("field `{field}` is null")),
        other => Err(format!("field `{field}` holds {}", other.kind_name())),
    }
}
