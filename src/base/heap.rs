//! Arena storage for object graphs.
//!
//! Every record, list and map lives in a [`Heap`] and is addressed by an
//! [`ObjectId`]. The handle is the object's identity: the translation engine
//! keys its identity cache by handle, so two structurally equal objects stored
//! under different handles are always distinct.

use indexmap::IndexMap;
use thiserror::Error;

use super::value::{Key, Name, ObjectId, TypeName, Value};

/// An instance of a declared type: a type name plus named slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: TypeName,
    fields: IndexMap<Name, Value>,
}

impl Record {
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Value of a slot, or `None` if the record has no such slot.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Set a slot, returning the previous value.
    pub fn set(&mut self, field: impl Into<Name>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Slots in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.fields.iter()
    }
}

/// The body of a heap object.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Record(Record),
    List(Vec<Value>),
    /// Insertion-ordered; a key may be present with a `Null` value.
    Map(IndexMap<Key, Value>),
}

impl Object {
    /// Short description of the object's kind, for diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            Object::Record(record) => record.type_name(),
            Object::List(_) => "list",
            Object::Map(_) => "map",
        }
    }
}

/// Every handle a heap can issue is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("heap is full: object {index} has no addressable handle")]
pub struct HeapFull {
    pub index: usize,
}

/// Arena of objects addressed by [`ObjectId`].
///
/// Objects are never freed while the heap lives, so handles never dangle
/// within the heap that issued them.
#[derive(Debug, Default, Clone)]
pub struct Heap {
    objects: Vec<Object>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects allocated.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Store an object, returning its handle, or fail once every handle
    /// is taken.
    pub fn try_alloc(&mut self, object: Object) -> Result<ObjectId, HeapFull> {
        let index = self.objects.len();
        let id = ObjectId::from_index(index).ok_or(HeapFull { index })?;
        self.objects.push(object);
        Ok(id)
    }

    /// Store an object, returning its handle.
    ///
    /// # Panics
    ///
    /// When the heap is full. The translation engine allocates through
    /// [`Heap::try_alloc`] and reports [`HeapFull`] as an error instead.
    pub fn alloc(&mut self, object: Object) -> ObjectId {
        match self.try_alloc(object) {
            Ok(id) => id,
            Err(err) => panic!("{err}"),
        }
    }

    /// Allocate a record of `type_name` with the given slots.
    pub fn new_record<N, V>(
        &mut self,
        type_name: impl Into<TypeName>,
        fields: impl IntoIterator<Item = (N, V)>,
    ) -> ObjectId
    where
        N: Into<Name>,
        V: Into<Value>,
    {
        let mut record = Record::new(type_name);
        for (name, value) in fields {
            record.set(name, value.into());
        }
        self.alloc(Object::Record(record))
    }

    /// Allocate a record with no slots.
    pub fn empty_record(&mut self, type_name: impl Into<TypeName>) -> ObjectId {
        self.alloc(Object::Record(Record::new(type_name)))
    }

    /// Allocate a list holding `values` in order.
    pub fn new_list<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> ObjectId {
        self.alloc(Object::List(values.into_iter().map(Into::into).collect()))
    }

    /// Allocate a map holding `entries` in order.
    pub fn new_map<K, V>(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> ObjectId
    where
        K: Into<Key>,
        V: Into<Value>,
    {
        self.alloc(Object::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    pub fn record(&self, id: ObjectId) -> Option<&Record> {
        match self.get(id)? {
            Object::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn record_mut(&mut self, id: ObjectId) -> Option<&mut Record> {
        match self.get_mut(id)? {
            Object::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn list(&self, id: ObjectId) -> Option<&Vec<Value>> {
        match self.get(id)? {
            Object::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, id: ObjectId) -> Option<&mut Vec<Value>> {
        match self.get_mut(id)? {
            Object::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn map(&self, id: ObjectId) -> Option<&IndexMap<Key, Value>> {
        match self.get(id)? {
            Object::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn map_mut(&mut self, id: ObjectId) -> Option<&mut IndexMap<Key, Value>> {
        match self.get_mut(id)? {
            Object::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Runtime type of a record; `None` for lists, maps and unknown handles.
    pub fn type_of(&self, id: ObjectId) -> Option<&TypeName> {
        self.record(id).map(Record::type_name)
    }

    /// Read a record slot. `None` if `id` is not a record or lacks the slot.
    pub fn field(&self, id: ObjectId, field: &str) -> Option<&Value> {
        self.record(id)?.get(field)
    }

    /// Write a record slot. Returns `false` if `id` is not a record.
    pub fn set_field(&mut self, id: ObjectId, field: impl Into<Name>, value: Value) -> bool {
        match self.record_mut(id) {
            Some(record) => {
                record.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Human-readable rendering of a value for diagnostics: references show
    /// the kind of object they point at.
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Ref(id) => match self.get(*id) {
                Some(object) => format!("{}{}", object.kind_name(), id),
                None => format!("dangling{id}"),
            },
            other => other.to_string(),
        }
    }
}
