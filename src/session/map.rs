//! Map update engine.
//!
//! Reconciles an existing destination map against a source map, key by key.
//! Keys match by equality; values are never matched by content.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use super::TranslationSession;
use crate::base::{Key, Object, ObjectId, Value};
use crate::error::TranslateResult;
use crate::property::{MapOptions, Property};

impl TranslationSession<'_> {
    pub(super) fn resolve_map(
        &mut self,
        property: &Property,
        options: &MapOptions,
        value: &Value,
        destination: ObjectId,
    ) -> TranslateResult<Value> {
        let entries = self.source_entries(property, options, value)?;

        if options.update {
            let existing =
                self.existing_container(property, destination, |heap, id| heap.map(id).is_some())?;
            if let Some(existing) = existing {
                self.reconcile_map(property, options, &entries, existing)?;
                return Ok(Value::Ref(existing));
            }
        }

        let mut translated = IndexMap::with_capacity(entries.len());
        for (key, entry) in entries {
            let resolved = self.resolve_value(property, &options.value_type, &entry)?;
            translated.insert(key, resolved);
        }
        Ok(Value::Ref(self.heap.try_alloc(Object::Map(translated))?))
    }

    /// Snapshot of the source entries, with keys checked against the
    /// declared key type.
    fn source_entries(
        &self,
        property: &Property,
        options: &MapOptions,
        value: &Value,
    ) -> TranslateResult<Vec<(Key, Value)>> {
        let entries = value
            .as_object()
            .and_then(|id| self.heap.map(id))
            .ok_or_else(|| {
                property.read_error(format!("expected a map, found {}", self.heap.describe(value)))
            })?;
        if let Some(key) = entries.keys().find(|k| !options.key_type.accepts_key(k)) {
            return Err(property.write_error(
                self.heap,
                &Value::from(key.clone()),
                format!("map key is not a {}", options.key_type),
            ));
        }
        Ok(entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn reconcile_map(
        &mut self,
        property: &Property,
        options: &MapOptions,
        entries: &[(Key, Value)],
        target: ObjectId,
    ) -> TranslateResult<()> {
        let (mut updated, mut inserted, mut nulled) = (0usize, 0usize, 0usize);

        for (key, source) in entries {
            let current = self.heap.map(target).and_then(|m| m.get(key)).cloned();
            let in_place = match (&current, options.value_type.object_type()) {
                (Some(Value::Ref(id)), Some(value_type))
                    if property.translates() && self.holds_record_of(*id, value_type) =>
                {
                    Some((*id, value_type.clone()))
                }
                _ => None,
            };

            let next = if source.is_null() {
                nulled += 1;
                Value::Null
            } else if let Some((existing, value_type)) = in_place {
                updated += 1;
                self.update_object(source, existing, &value_type)?;
                Value::Ref(existing)
            } else {
                if current.is_none() {
                    inserted += 1;
                } else {
                    updated += 1;
                }
                self.resolve_value(property, &options.value_type, source)?
            };

            if let Some(map) = self.heap.map_mut(target) {
                map.insert(key.clone(), next);
            }
        }

        let mut removed = 0;
        if options.remove_orphans {
            let present: FxHashSet<&Key> = entries.iter().map(|(k, _)| k).collect();
            if let Some(map) = self.heap.map_mut(target) {
                let before = map.len();
                map.retain(|k, _| present.contains(k));
                removed = before - map.len();
            }
        }

        tracing::trace!(
            "[MAP] `{}`: {} updated, {} inserted, {} nulled, {} orphans removed",
            property.name(),
            updated,
            inserted,
            nulled,
            removed
        );
        Ok(())
    }
}
