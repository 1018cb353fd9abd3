//! The shared translation entry point.
//!
//! A [`Translator`] owns everything that outlives a single call: the type
//! registry, the descriptor table, the factory constructors, the source
//! resolver and the configuration. It is `Send + Sync`; share it (for example
//! behind an `Arc`) and call it from any thread. Every call runs in a fresh
//! [`TranslationSession`] over the caller's heap.
//!
//! ## Usage
//!
//! ```ignore
//! let translator = Translator::new(registry);
//! let dto = translator.translate(&mut heap, &Value::Ref(person), "PersonDto")?;
//! translator.update(&mut heap, &Value::Ref(changed), person_entity)?;
//! ```

use std::sync::Arc;

use crate::base::{Heap, ObjectId, Value};
use crate::config::Configuration;
use crate::error::TranslateResult;
use crate::factory::{FactoryRegistry, TranslationTargetFactory};
use crate::property::{DescriptorTable, Property};
use crate::schema::{FactoryKey, TypeRegistry};
use crate::session::TranslationSession;
use crate::source::{PathResolver, SourceResolver};

/// Translates and updates object graphs.
pub struct Translator {
    pub(crate) registry: TypeRegistry,
    pub(crate) descriptors: DescriptorTable,
    pub(crate) factories: FactoryRegistry,
    pub(crate) resolver: Box<dyn SourceResolver>,
    pub(crate) config: Configuration,
}

impl Translator {
    /// A translator over `registry` with default configuration, no factories
    /// and dotted-path source expressions.
    pub fn new(registry: TypeRegistry) -> Self {
        Self {
            registry,
            descriptors: DescriptorTable::new(),
            factories: FactoryRegistry::new(),
            resolver: Box::new(PathResolver),
            config: Configuration::default(),
        }
    }

    pub fn with_configuration(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    pub fn with_factories(mut self, factories: FactoryRegistry) -> Self {
        self.factories = factories;
        self
    }

    pub fn with_resolver(mut self, resolver: impl SourceResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// The frozen descriptors of `type_name`, built on first use.
    pub fn descriptors(&self, type_name: &str) -> TranslateResult<Arc<[Property]>> {
        self.descriptors.descriptors(&self.registry, type_name)
    }

    /// Open a session for callers that need several operations to share one
    /// identity cache.
    pub fn session<'a>(&'a self, heap: &'a mut Heap) -> TranslationSession<'a> {
        TranslationSession::new(self, heap)
    }

    /// Translate `source` into a new `destination_type` graph.
    pub fn translate(
        &self,
        heap: &mut Heap,
        source: &Value,
        destination_type: &str,
    ) -> TranslateResult<Value> {
        self.session(heap).translate(source, destination_type)
    }

    /// Like [`translate`](Self::translate), with `factory` used for `key`
    /// instead of a registry-constructed instance.
    pub fn translate_with_factory(
        &self,
        heap: &mut Heap,
        source: &Value,
        destination_type: &str,
        key: impl Into<FactoryKey>,
        factory: impl TranslationTargetFactory + 'static,
    ) -> TranslateResult<Value> {
        let mut session = self.session(heap);
        session.preset_factory(key, factory);
        session.translate(source, destination_type)
    }

    /// Translate each source within one session, so references shared
    /// between sources stay shared in the results.
    pub fn translate_each(
        &self,
        heap: &mut Heap,
        sources: &[Value],
        destination_type: &str,
    ) -> TranslateResult<Vec<Value>> {
        self.session(heap).translate_each(sources, destination_type)
    }

    /// Update the existing record `destination` from `source` in place.
    pub fn update(&self, heap: &mut Heap, source: &Value, destination: ObjectId) -> TranslateResult<()> {
        self.session(heap).update(source, destination)
    }

    /// Like [`update`](Self::update), with `factory` used for `key`.
    pub fn update_with_factory(
        &self,
        heap: &mut Heap,
        source: &Value,
        destination: ObjectId,
        key: impl Into<FactoryKey>,
        factory: impl TranslationTargetFactory + 'static,
    ) -> TranslateResult<()> {
        let mut session = self.session(heap);
        session.preset_factory(key, factory);
        session.update(source, destination)
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("types", &self.registry.len())
            .field("descriptors", &self.descriptors.len())
            .field("factories", &self.factories)
            .field("config", &self.config)
            .finish()
    }
}
