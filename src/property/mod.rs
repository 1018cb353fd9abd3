//! Property descriptors: one destination slot plus how to fill it.
//!
//! ## Key Types
//!
//! - [`Property`] - resolved, immutable descriptor for one destination slot
//! - [`PropertyKind`] - scalar, collection-valued or map-valued
//! - [`Slot`] - the access variant the destination type exposes
//! - [`DescriptorTable`] - per-type cache of frozen descriptor lists

mod slot;
mod table;

pub use slot::{Accessors, Getter, Setter, Slot};
pub use table::DescriptorTable;

use smol_str::SmolStr;

use crate::base::{Heap, Name, ObjectId, TypeName, Value};
use crate::error::{TranslateError, TranslateResult};
use crate::schema::{ElementMatcher, FactoryKey, FieldDef, PropertyConfig, TypeRegistry, ValueType};

/// Options of a collection-valued property.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionOptions {
    pub element_type: ValueType,
    pub update: bool,
    pub remove_orphans: bool,
    /// `None` defers to the session configuration.
    pub matcher: Option<ElementMatcher>,
}

/// Options of a map-valued property.
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub key_type: ValueType,
    pub value_type: ValueType,
    pub update: bool,
    pub remove_orphans: bool,
}

/// What kind of value a property holds.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Scalar,
    Collection(CollectionOptions),
    Map(MapOptions),
}

/// One destination slot, fully resolved from configuration.
///
/// Built once per destination type and shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Property {
    name: Name,
    declaring_type: TypeName,
    value_type: ValueType,
    explicit: bool,
    ignored: bool,
    translate: bool,
    factory: Option<FactoryKey>,
    source_expression: SmolStr,
    kind: PropertyKind,
    slot: Slot,
}

impl Property {
    /// Resolve a declared field into a descriptor.
    ///
    /// A field with configuration is explicit. Without configuration the
    /// source expression is the field's own name. Collection and map slots
    /// whose element (value) type is a record type translate their contents
    /// by default; every other slot copies unless told otherwise.
    pub fn from_field(declaring_type: &TypeName, field: &FieldDef) -> Self {
        let explicit = field.config.is_some();
        let config = field.config.clone().unwrap_or_default();

        let value_type = match &field.value_type {
            ValueType::List(element) => {
                ValueType::list(config.element_type.clone().unwrap_or_else(|| (**element).clone()))
            }
            ValueType::Map(key, value) => ValueType::map(
                config.key_type.clone().unwrap_or_else(|| (**key).clone()),
                config.value_type.clone().unwrap_or_else(|| (**value).clone()),
            ),
            other => other.clone(),
        };
        let kind = kind_for(&value_type, &config);
        let contents_are_records = match &kind {
            PropertyKind::Collection(options) => options.element_type.object_type().is_some(),
            PropertyKind::Map(options) => options.value_type.object_type().is_some(),
            PropertyKind::Scalar => false,
        };

        Self {
            name: field.name.clone(),
            declaring_type: declaring_type.clone(),
            explicit,
            ignored: config.ignore,
            translate: config.translate.unwrap_or(contents_are_records),
            factory: config.factory,
            source_expression: config.expression.unwrap_or_else(|| field.name.clone()),
            value_type,
            kind,
            slot: field.slot.clone(),
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn declaring_type(&self) -> &TypeName {
        &self.declaring_type
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Author-specified rather than inferred by name-matching.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Recurse into the value (or, for collections and maps, its contents)
    /// instead of copying it verbatim.
    pub fn translates(&self) -> bool {
        self.translate
    }

    pub fn factory(&self) -> Option<&FactoryKey> {
        self.factory.as_ref()
    }

    pub fn source_expression(&self) -> &str {
        &self.source_expression
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    pub fn supports_null(&self) -> bool {
        self.slot.supports_null()
    }

    pub fn can_read(&self) -> bool {
        self.slot.can_read()
    }

    pub fn can_write(&self) -> bool {
        self.slot.can_write()
    }

    /// Read the current destination value of this slot.
    pub fn read(&self, heap: &Heap, instance: ObjectId) -> TranslateResult<Value> {
        self.slot
            .read(heap, instance)
            .map_err(|reason| TranslateError::read(self.name.clone(), self.declaring_type.clone(), reason))
    }

    /// Write `value` to this slot after checking it against the declared type.
    pub fn write(
        &self,
        heap: &mut Heap,
        registry: &TypeRegistry,
        instance: ObjectId,
        value: Value,
    ) -> TranslateResult<()> {
        if !registry.accepts(heap, &self.value_type, &value) {
            let reason = format!("expected {}", self.value_type);
            return Err(self.write_error(heap, &value, reason));
        }
        let rendered = heap.describe(&value);
        self.slot.write(heap, instance, value).map_err(|reason| {
            TranslateError::write(
                self.name.clone(),
                self.declaring_type.clone(),
                rendered,
                reason,
            )
        })
    }

    pub(crate) fn write_error(&self, heap: &Heap, value: &Value, reason: impl Into<String>) -> TranslateError {
        TranslateError::write(
            self.name.clone(),
            self.declaring_type.clone(),
            heap.describe(value),
            reason,
        )
    }

    pub(crate) fn read_error(&self, reason: impl Into<String>) -> TranslateError {
        TranslateError::read(self.name.clone(), self.declaring_type.clone(), reason)
    }
}

fn kind_for(value_type: &ValueType, config: &PropertyConfig) -> PropertyKind {
    match value_type {
        ValueType::List(element) => PropertyKind::Collection(CollectionOptions {
            element_type: (**element).clone(),
            update: config.update,
            remove_orphans: config.remove_orphans,
            matcher: config.matcher.clone(),
        }),
        ValueType::Map(key, value) => PropertyKind::Map(MapOptions {
            key_type: (**key).clone(),
            value_type: (**value).clone(),
            update: config.update,
            remove_orphans: config.remove_orphans,
        }),
        _ => PropertyKind::Scalar,
    }
}
