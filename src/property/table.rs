//! Per-type descriptor cache.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::Property;
use crate::base::{Name, TypeName};
use crate::error::TranslateResult;
use crate::schema::{FieldDef, TypeRegistry};

/// Frozen descriptor lists, built at most once per type and then shared by
/// every session.
///
/// Readers take the read lock only; a miss upgrades to the write lock and
/// re-checks before building, so concurrent first uses of a type build it once.
#[derive(Debug, Default)]
pub struct DescriptorTable {
    cache: RwLock<FxHashMap<TypeName, Arc<[Property]>>>,
}

impl DescriptorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptors for `type_name`, including inherited slots.
    ///
    /// Inherited slots come first; a subtype slot with the same name as an
    /// inherited one replaces it in place.
    pub fn descriptors(
        &self,
        registry: &TypeRegistry,
        type_name: &str,
    ) -> TranslateResult<Arc<[Property]>> {
        if let Some(found) = self.cache.read().get(type_name) {
            return Ok(Arc::clone(found));
        }

        let mut cache = self.cache.write();
        if let Some(found) = cache.get(type_name) {
            return Ok(Arc::clone(found));
        }
        let built = build(registry, type_name)?;
        tracing::trace!(
            "[DESCRIPTORS] built {} properties for `{}`",
            built.len(),
            type_name
        );
        cache.insert(TypeName::new(type_name), Arc::clone(&built));
        Ok(built)
    }

    /// Number of types built so far.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

fn build(registry: &TypeRegistry, type_name: &str) -> TranslateResult<Arc<[Property]>> {
    let mut fields: IndexMap<Name, (&TypeName, &FieldDef)> = IndexMap::new();
    for def in registry.lineage(type_name)? {
        for field in def.fields() {
            fields.insert(field.name.clone(), (def.name(), field));
        }
    }
    Ok(fields
        .values()
        .map(|(declaring, field)| Property::from_field(declaring, field))
        .collect())
}
