//! Declared types and per-slot configuration.
//!
//! A [`TypeDef`] is the static description of a destination (or source) type:
//! its supertype, its slots, and for each slot the configuration options an
//! author chose. The engine never reads `TypeDef`s directly while translating;
//! the [`DescriptorTable`](crate::property::DescriptorTable) turns them into
//! frozen [`Property`](crate::property::Property) lists once per type.

mod registry;

pub use registry::TypeRegistry;

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::{Key, Name, TypeName, Value};
use crate::property::{Accessors, Slot};

// ============================================================================
// VALUE TYPES
// ============================================================================

/// The declared type of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// A record of this type or one of its subtypes.
    Object(TypeName),
    /// A list whose elements have the given type.
    List(Box<ValueType>),
    /// A map with the given key and value types.
    Map(Box<ValueType>, Box<ValueType>),
}

impl ValueType {
    pub fn object(type_name: impl Into<TypeName>) -> Self {
        ValueType::Object(type_name.into())
    }

    pub fn list(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    /// The record type named by `Object`, if any.
    pub fn object_type(&self) -> Option<&TypeName> {
        match self {
            ValueType::Object(name) => Some(name),
            _ => None,
        }
    }

    /// Whether `key` is usable as a key of this (key) type.
    pub fn accepts_key(&self, key: &Key) -> bool {
        matches!(
            (self, key),
            (ValueType::Any, _)
                | (ValueType::Bool, Key::Bool(_))
                | (ValueType::Int, Key::Int(_))
                | (ValueType::Str, Key::Str(_))
        )
    }

    /// Scalar compatibility; object, list and map checks need the heap and
    /// live in [`TypeRegistry::accepts`].
    pub(crate) fn accepts_scalar(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueType::Any, _)
                | (_, Value::Null)
                | (ValueType::Bool, Value::Bool(_))
                | (ValueType::Int, Value::Int(_))
                | (ValueType::Float, Value::Float(_) | Value::Int(_))
                | (ValueType::Str, Value::Str(_))
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => f.write_str("any"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Int => f.write_str("int"),
            ValueType::Float => f.write_str("float"),
            ValueType::Str => f.write_str("string"),
            ValueType::Object(name) => f.write_str(name),
            ValueType::List(element) => write!(f, "list<{element}>"),
            ValueType::Map(key, value) => write!(f, "map<{key}, {value}>"),
        }
    }
}

// ============================================================================
// CONFIGURATION OPTIONS
// ============================================================================

/// Names a translation target factory registered with a
/// [`FactoryRegistry`](crate::factory::FactoryRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryKey(SmolStr);

impl FactoryKey {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactoryKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for FactoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How elements of an updated collection are paired with existing
/// destination elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ElementMatcher {
    /// Pair a source element with the destination element whose
    /// `destination` slot equals the value of the `source` expression.
    ById { source: SmolStr, destination: Name },
    /// Pair elements at the same index.
    #[default]
    Positional,
    /// Pair a source element with the very same instance in the destination.
    Identity,
    /// Never pair; every source element is appended.
    Never,
}

impl ElementMatcher {
    pub fn by_id(source: impl Into<SmolStr>, destination: impl Into<Name>) -> Self {
        ElementMatcher::ById {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Author-specified options for one slot.
///
/// A slot with a `PropertyConfig` is explicit; a slot without one is inferred
/// by name-matching against the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyConfig {
    pub ignore: bool,
    /// `None` leaves the decision to the slot's kind.
    pub translate: Option<bool>,
    pub factory: Option<FactoryKey>,
    pub expression: Option<SmolStr>,
    pub update: bool,
    pub remove_orphans: bool,
    pub matcher: Option<ElementMatcher>,
    pub element_type: Option<ValueType>,
    pub key_type: Option<ValueType>,
    pub value_type: Option<ValueType>,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            ignore: false,
            translate: None,
            factory: None,
            expression: None,
            update: false,
            remove_orphans: true,
            matcher: None,
            element_type: None,
            key_type: None,
            value_type: None,
        }
    }
}

// ============================================================================
// FIELDS AND TYPES
// ============================================================================

/// One slot of a declared type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: Name,
    pub value_type: ValueType,
    pub slot: Slot,
    pub config: Option<PropertyConfig>,
}

impl FieldDef {
    /// A directly stored slot with no explicit configuration.
    pub fn new(name: impl Into<Name>, value_type: ValueType) -> Self {
        let name = name.into();
        Self {
            slot: Slot::field(name.clone()),
            name,
            value_type,
            config: None,
        }
    }

    fn config_mut(&mut self) -> &mut PropertyConfig {
        self.config.get_or_insert_with(PropertyConfig::default)
    }

    /// Mark the slot explicit without changing any option.
    pub fn explicit(mut self) -> Self {
        self.config_mut();
        self
    }

    pub fn ignore(mut self) -> Self {
        self.config_mut().ignore = true;
        self
    }

    pub fn translate(mut self, translate: bool) -> Self {
        self.config_mut().translate = Some(translate);
        self
    }

    pub fn factory(mut self, key: impl Into<FactoryKey>) -> Self {
        self.config_mut().factory = Some(key.into());
        self
    }

    pub fn expression(mut self, expression: impl Into<SmolStr>) -> Self {
        self.config_mut().expression = Some(expression.into());
        self
    }

    pub fn update(mut self, update: bool) -> Self {
        self.config_mut().update = update;
        self
    }

    pub fn remove_orphans(mut self, remove: bool) -> Self {
        self.config_mut().remove_orphans = remove;
        self
    }

    pub fn matcher(mut self, matcher: ElementMatcher) -> Self {
        self.config_mut().matcher = Some(matcher);
        self
    }

    pub fn element_type(mut self, element_type: ValueType) -> Self {
        self.config_mut().element_type = Some(element_type);
        self
    }

    pub fn key_type(mut self, key_type: ValueType) -> Self {
        self.config_mut().key_type = Some(key_type);
        self
    }

    pub fn entry_value_type(mut self, value_type: ValueType) -> Self {
        self.config_mut().value_type = Some(value_type);
        self
    }

    /// Expose the slot through a getter/setter pair.
    pub fn accessors(mut self, accessors: Accessors) -> Self {
        self.slot = Slot::Accessors(accessors);
        self
    }

    /// Store the slot directly but reject null, like a constructor-bound value.
    pub fn bound(mut self) -> Self {
        self.slot = Slot::Bound {
            field: self.name.clone(),
        };
        self
    }

    /// Address one entry of the map held in `field`.
    pub fn map_entry(mut self, field: impl Into<Name>, key: impl Into<Key>) -> Self {
        self.slot = Slot::MapEntry {
            field: field.into(),
            key: key.into(),
        };
        self
    }

    /// Address one element of the list held in `field`.
    pub fn element(mut self, field: impl Into<Name>, index: usize) -> Self {
        self.slot = Slot::Element {
            field: field.into(),
            index,
        };
        self
    }
}

/// A declared type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: TypeName,
    supertype: Option<TypeName>,
    constructible: bool,
    fields: Vec<FieldDef>,
    /// Source runtime type -> destination subtype to construct instead of this type.
    variants: IndexMap<TypeName, TypeName>,
}

impl TypeDef {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            supertype: None,
            constructible: true,
            fields: Vec::new(),
            variants: IndexMap::new(),
        }
    }

    pub fn extends(mut self, supertype: impl Into<TypeName>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    /// The type has no usable constructor; instances must come from a factory.
    pub fn abstract_type(mut self) -> Self {
        self.constructible = false;
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// When translating a `source_type` (or a subtype of it) into this type,
    /// construct `destination_type` instead.
    pub fn variant(
        mut self,
        source_type: impl Into<TypeName>,
        destination_type: impl Into<TypeName>,
    ) -> Self {
        self.variants
            .insert(source_type.into(), destination_type.into());
        self
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    pub fn supertype(&self) -> Option<&TypeName> {
        self.supertype.as_ref()
    }

    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Slots declared directly on this type (not inherited).
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub(crate) fn variant_for(&self, source_type: &str) -> Option<&TypeName> {
        self.variants.get(source_type)
    }
}
