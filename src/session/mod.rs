//! Translation sessions.
//!
//! A [`TranslationSession`] runs one top-level translate or update call and
//! everything it recursively triggers. It owns two caches that live exactly as
//! long as the call:
//!
//! - the identity cache, `(source handle, destination type) -> destination
//!   handle`, which makes shared references stay shared and cycles terminate;
//! - the factory cache, one factory instance per key.
//!
//! ## Resolution of one property
//!
//! ```text
//! ignored? ──yes──▶ skip
//!    │
//! read source expression ──fails──▶ PropertyRead (or skip, for inferred
//!    │                              properties when sources are optional)
//! null? ──yes──▶ write null if the slot allows it, else PropertyWrite
//!    │
//! scalar ─────▶ translate (identity cache / factory / construct) or copy
//! collection ─▶ reconcile in place (update) or build a fresh list
//! map ────────▶ reconcile in place (update) or build a fresh map
//!    │
//! write through the slot
//! ```

mod collection;
mod map;
mod matcher;

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::Translator;
use crate::base::{Heap, Name, ObjectId, TypeName, Value};
use crate::error::{PropertyPath, TranslateError, TranslateResult};
use crate::factory::{FactoryCache, TranslationTargetFactory};
use crate::property::{Property, PropertyKind};
use crate::schema::{FactoryKey, ValueType};

/// Identity cache key: source handle and requested destination type.
type IdentityKey = (ObjectId, TypeName);

/// One translate or update call. Single-use and single-threaded; discard it
/// once the top-level call returns.
pub struct TranslationSession<'a> {
    translator: &'a Translator,
    heap: &'a mut Heap,
    factories: FactoryCache,
    identities: FxHashMap<IdentityKey, ObjectId>,
    /// Property names from the root to the property being resolved.
    path: Vec<Name>,
    depth: usize,
    /// The current top-level call is an update.
    updating: bool,
}

impl<'a> TranslationSession<'a> {
    pub fn new(translator: &'a Translator, heap: &'a mut Heap) -> Self {
        Self {
            translator,
            heap,
            factories: FactoryCache::new(),
            identities: FxHashMap::default(),
            path: Vec::new(),
            depth: 0,
            updating: false,
        }
    }

    /// Use a caller-built factory for `key` instead of constructing one.
    pub fn preset_factory(
        &mut self,
        key: impl Into<FactoryKey>,
        factory: impl TranslationTargetFactory + 'static,
    ) {
        self.factories.preset(key.into(), Box::new(factory));
    }

    pub fn heap(&self) -> &Heap {
        self.heap
    }

    /// The destination already produced for `source` as `destination_type`.
    pub fn cached(&self, source: ObjectId, destination_type: &str) -> Option<ObjectId> {
        self.identities
            .get(&(source, TypeName::new(destination_type)))
            .copied()
    }

    /// Number of entries in the identity cache.
    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// Translate `source` into a new (or cached, or factory-supplied)
    /// instance of `destination_type`. A null source translates to null.
    pub fn translate(&mut self, source: &Value, destination_type: &str) -> TranslateResult<Value> {
        tracing::debug!(
            "[SESSION] translate {} -> `{}`",
            self.heap.describe(source),
            destination_type
        );
        self.updating = false;
        self.translate_object(source, &TypeName::new(destination_type), None)
    }

    /// Translate every source into `destination_type` within this session.
    pub fn translate_each(
        &mut self,
        sources: &[Value],
        destination_type: &str,
    ) -> TranslateResult<Vec<Value>> {
        sources
            .iter()
            .map(|source| self.translate(source, destination_type))
            .collect()
    }

    /// Overwrite the properties of the existing record `destination` from
    /// `source`. A null source leaves the destination untouched.
    pub fn update(&mut self, source: &Value, destination: ObjectId) -> TranslateResult<()> {
        let Some(type_name) = self.heap.type_of(destination).cloned() else {
            return Err(TranslateError::InvalidDestination(
                self.heap.describe(&Value::Ref(destination)),
            ));
        };
        let described = self.heap.describe(&Value::Ref(destination));
        tracing::debug!(
            "[SESSION] update {} from {}",
            described,
            self.heap.describe(source)
        );
        if source.is_null() {
            return Ok(());
        }
        self.updating = true;
        self.update_object(source, destination, &type_name)
    }

    // ========================================================================
    // OBJECTS
    // ========================================================================

    /// Resolve the destination for `(source, requested)`: the cached one, a
    /// factory substitute, or a newly constructed instance. New destinations
    /// are cached before their own properties are resolved.
    fn translate_object(
        &mut self,
        source: &Value,
        requested: &TypeName,
        factory: Option<&FactoryKey>,
    ) -> TranslateResult<Value> {
        let source_id = match source {
            Value::Null => return Ok(Value::Null),
            Value::Ref(id) if self.heap.record(*id).is_some() => *id,
            other => {
                return Err(TranslateError::instantiation(
                    requested.clone(),
                    format!("cannot translate {} into a record", self.heap.describe(other)),
                ));
            }
        };

        let key = (source_id, requested.clone());
        if let Some(&existing) = self.identities.get(&key) {
            tracing::trace!(
                "[SESSION] reusing {} for {} as `{}`",
                existing,
                source_id,
                requested
            );
            return Ok(Value::Ref(existing));
        }

        let supplied = match factory {
            Some(factory) => self.supply(factory, source, requested)?,
            None => None,
        };
        let destination = match supplied {
            Some(id) => id,
            None => {
                let source_type = self.heap.type_of(source_id).cloned().unwrap_or_default();
                let registry = &self.translator.registry;
                let concrete = registry.concrete_type(requested, &source_type);
                registry.instantiate(self.heap, concrete)?
            }
        };

        self.identities.insert(key, destination);
        self.populate(source, destination)?;
        Ok(Value::Ref(destination))
    }

    /// Update `destination` in place, registering it as the translation of
    /// `source` as `as_type` first. A pair already registered to this very
    /// destination is not visited again.
    fn update_object(
        &mut self,
        source: &Value,
        destination: ObjectId,
        as_type: &TypeName,
    ) -> TranslateResult<()> {
        if let Some(source_id) = source.as_object() {
            match self.identities.entry((source_id, as_type.clone())) {
                Entry::Occupied(entry) if *entry.get() == destination => {
                    tracing::trace!("[SESSION] {} already updated from {}", destination, source_id);
                    return Ok(());
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(destination);
                }
            }
        }
        self.populate(source, destination)
    }

    /// Ask the factory for `key` for a destination instance.
    ///
    /// `Ok(None)` when the factory declines. A substitute must be a record of
    /// `requested` or a subtype.
    fn supply(
        &mut self,
        key: &FactoryKey,
        source: &Value,
        requested: &TypeName,
    ) -> TranslateResult<Option<ObjectId>> {
        let factory = self
            .factories
            .get_or_create(&self.translator.factories, key)?;
        let supplied = factory
            .target_instance(self.heap, source, requested)
            .map_err(|err| {
                TranslateError::instantiation(requested.clone(), format!("factory `{key}` failed: {err}"))
            })?;

        match supplied {
            None => Ok(None),
            Some(Value::Ref(id))
                if self
                    .heap
                    .type_of(id)
                    .is_some_and(|t| self.translator.registry.is_subtype(t, requested)) =>
            {
                tracing::trace!("[SESSION] factory `{}` supplied {}", key, id);
                Ok(Some(id))
            }
            Some(other) => Err(TranslateError::instantiation(
                requested.clone(),
                format!(
                    "factory `{key}` returned {}, which is not a `{requested}`",
                    self.heap.describe(&other)
                ),
            )),
        }
    }

    // ========================================================================
    // PROPERTIES
    // ========================================================================

    /// Resolve every property of `destination` against `source`.
    fn populate(&mut self, source: &Value, destination: ObjectId) -> TranslateResult<()> {
        let Some(type_name) = self.heap.type_of(destination).cloned() else {
            return Err(TranslateError::InvalidDestination(
                self.heap.describe(&Value::Ref(destination)),
            ));
        };
        let limit = self.translator.config.max_depth;
        if self.depth >= limit {
            return Err(TranslateError::DepthExceeded { limit });
        }
        let properties = self
            .translator
            .descriptors
            .descriptors(&self.translator.registry, &type_name)?;

        self.depth += 1;
        let mut result = Ok(());
        for property in properties.iter() {
            self.path.push(property.name().clone());
            result = self
                .apply(property, source, destination)
                .map_err(|err| self.wrap(err, source, &type_name));
            self.path.pop();
            if result.is_err() {
                break;
            }
        }
        self.depth -= 1;
        result
    }

    fn apply(
        &mut self,
        property: &Property,
        source: &Value,
        destination: ObjectId,
    ) -> TranslateResult<()> {
        if property.is_ignored() {
            return Ok(());
        }
        let Some(value) = self.read_source(property, source)? else {
            tracing::trace!("[SESSION] skipping `{}`: no source value", property.name());
            return Ok(());
        };

        if value.is_null() {
            if !property.supports_null() {
                return Err(property.write_error(self.heap, &value, "slot does not accept null"));
            }
            return self.write(property, destination, Value::Null);
        }

        let resolved = match property.kind() {
            PropertyKind::Scalar => self.resolve_scalar(property, &value, destination)?,
            PropertyKind::Collection(options) => {
                self.resolve_collection(property, options, &value, destination)?
            }
            PropertyKind::Map(options) => self.resolve_map(property, options, &value, destination)?,
        };
        self.write(property, destination, resolved)
    }

    /// The source value for `property`; `None` when an inferred property has
    /// no source and sources are optional.
    fn read_source(&self, property: &Property, source: &Value) -> TranslateResult<Option<Value>> {
        let expression = property.source_expression();
        match self.translator.resolver.resolve(self.heap, source, expression) {
            Ok(value) => Ok(Some(value)),
            Err(_)
                if !property.is_explicit()
                    && !self.translator.config.source_properties_required =>
            {
                Ok(None)
            }
            Err(err) => Err(property.read_error(format!("source expression `{expression}`: {err}"))),
        }
    }

    /// In update mode a translated slot that already holds a record of the
    /// target type is updated in place, unless the source has already been
    /// translated to that type in this session.
    fn resolve_scalar(
        &mut self,
        property: &Property,
        value: &Value,
        destination: ObjectId,
    ) -> TranslateResult<Value> {
        let in_place = match (property.value_type().object_type(), value.as_object()) {
            (Some(target), Some(source_id))
                if self.updating
                    && property.translates()
                    && property.can_read()
                    && !self.identities.contains_key(&(source_id, target.clone())) =>
            {
                match property.read(self.heap, destination)? {
                    Value::Ref(existing) if self.holds_record_of(existing, target) => {
                        Some((existing, target))
                    }
                    _ => None,
                }
            }
            _ => None,
        };
        match in_place {
            Some((existing, target)) => {
                self.update_object(value, existing, target)?;
                Ok(Value::Ref(existing))
            }
            None => self.resolve_value(property, property.value_type(), value),
        }
    }

    /// Translate, substitute or copy one value destined for a slot (or a
    /// collection element / map value) of type `ty`.
    fn resolve_value(
        &mut self,
        property: &Property,
        ty: &ValueType,
        value: &Value,
    ) -> TranslateResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if property.translates() {
            let target = object_target(ty)?;
            return self.translate_object(value, target, property.factory());
        }
        if let Some(factory) = property.factory() {
            let target = object_target(ty)?;
            if let Some(substitute) = self.supply(factory, value, target)? {
                return Ok(Value::Ref(substitute));
            }
        }
        Ok(value.clone())
    }

    fn write(&mut self, property: &Property, destination: ObjectId, value: Value) -> TranslateResult<()> {
        if !property.can_write() {
            return Err(property.write_error(self.heap, &value, "slot has no write capability"));
        }
        property.write(self.heap, &self.translator.registry, destination, value)
    }

    /// True when `id` is a record of `ty` or of one of its subtypes.
    fn holds_record_of(&self, id: ObjectId, ty: &TypeName) -> bool {
        self.heap
            .type_of(id)
            .is_some_and(|t| self.translator.registry.is_subtype(t, ty))
    }

    /// The container currently held by a collection or map slot, if it is
    /// readable and holds the right kind of object.
    fn existing_container(
        &self,
        property: &Property,
        destination: ObjectId,
        is_kind: fn(&Heap, ObjectId) -> bool,
    ) -> TranslateResult<Option<ObjectId>> {
        if !property.can_read() {
            return Ok(None);
        }
        Ok(match property.read(self.heap, destination)? {
            Value::Ref(id) if is_kind(self.heap, id) => Some(id),
            _ => None,
        })
    }

    /// Attach translation context to an error, once, at the deepest failure.
    fn wrap(&self, err: TranslateError, source: &Value, destination_type: &TypeName) -> TranslateError {
        match err {
            wrapped @ TranslateError::Translation { .. } => wrapped,
            cause => TranslateError::Translation {
                source_type: self.heap.describe(source),
                destination_type: destination_type.clone(),
                path: PropertyPath::new(self.path.clone()),
                cause: Box::new(cause),
            },
        }
    }
}

fn object_target(ty: &ValueType) -> TranslateResult<&TypeName> {
    ty.object_type().ok_or_else(|| {
        TranslateError::instantiation(ty.to_string(), "only record types can be translated")
    })
}
