//! Collection update engine.
//!
//! Reconciles an existing destination list against a source list: matched
//! elements are updated in place (their identity is kept), unmatched source
//! elements are appended, and unmatched destination elements are removed or
//! kept according to `remove_orphans`.

use super::TranslationSession;
use crate::base::{Object, ObjectId, Value};
use crate::error::TranslateResult;
use crate::property::{CollectionOptions, Property};

impl TranslationSession<'_> {
    pub(super) fn resolve_collection(
        &mut self,
        property: &Property,
        options: &CollectionOptions,
        value: &Value,
        destination: ObjectId,
    ) -> TranslateResult<Value> {
        let sources = self.source_list(property, value)?;

        if options.update {
            let existing =
                self.existing_container(property, destination, |heap, id| heap.list(id).is_some())?;
            if let Some(existing) = existing {
                self.reconcile_collection(property, options, &sources, existing)?;
                return Ok(Value::Ref(existing));
            }
        }

        let mut translated = Vec::with_capacity(sources.len());
        for element in &sources {
            translated.push(self.resolve_value(property, &options.element_type, element)?);
        }
        Ok(Value::Ref(self.heap.try_alloc(Object::List(translated))?))
    }

    /// Snapshot of the source list; the source may alias the destination.
    fn source_list(&self, property: &Property, value: &Value) -> TranslateResult<Vec<Value>> {
        value
            .as_object()
            .and_then(|id| self.heap.list(id))
            .cloned()
            .ok_or_else(|| {
                property.read_error(format!("expected a list, found {}", self.heap.describe(value)))
            })
    }

    fn reconcile_collection(
        &mut self,
        property: &Property,
        options: &CollectionOptions,
        sources: &[Value],
        target: ObjectId,
    ) -> TranslateResult<()> {
        let existing = self.heap.list(target).cloned().unwrap_or_default();
        let matcher = options
            .matcher
            .clone()
            .unwrap_or_else(|| self.translator.config.default_matcher.clone());

        let mut kept = existing.clone();
        let mut claimed = vec![false; existing.len()];
        let mut appended = Vec::new();

        for (index, element) in sources.iter().enumerate() {
            match self.find_match(property, &matcher, index, element, &existing, &claimed)? {
                Some(position) => {
                    claimed[position] = true;
                    kept[position] =
                        self.update_element(property, options, element, &existing[position])?;
                }
                None => {
                    appended.push(self.resolve_value(property, &options.element_type, element)?);
                }
            }
        }

        let matched = claimed.iter().filter(|c| **c).count();
        let orphans = existing.len() - matched;
        let mut result: Vec<Value> = if options.remove_orphans {
            kept.into_iter()
                .zip(&claimed)
                .filter_map(|(value, claimed)| claimed.then_some(value))
                .collect()
        } else {
            kept
        };
        tracing::trace!(
            "[COLLECTION] `{}`: {} matched, {} appended, {} orphans {}",
            property.name(),
            matched,
            appended.len(),
            orphans,
            if options.remove_orphans { "removed" } else { "retained" }
        );
        result.extend(appended);

        if let Some(list) = self.heap.list_mut(target) {
            *list = result;
        }
        Ok(())
    }

    /// Update one matched destination element from its source element.
    ///
    /// Record elements of a translated collection are updated in place when
    /// they are of the element type; anything else is replaced by the
    /// resolved source element.
    fn update_element(
        &mut self,
        property: &Property,
        options: &CollectionOptions,
        source: &Value,
        existing: &Value,
    ) -> TranslateResult<Value> {
        if let (Value::Ref(id), Some(element_type)) = (existing, options.element_type.object_type())
        {
            if property.translates()
                && !source.is_null()
                && self.holds_record_of(*id, element_type)
            {
                self.update_object(source, *id, element_type)?;
                return Ok(existing.clone());
            }
        }
        self.resolve_value(property, &options.element_type, source)
    }
}
