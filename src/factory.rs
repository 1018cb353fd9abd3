//! Translation target factories.
//!
//! A factory supplies the destination instance for a source value, possibly
//! of a subtype of the requested type. Factory *constructors* are registered
//! once with a [`FactoryRegistry`] shared by all sessions; each session keeps
//! its own [`FactoryCache`] so a factory is constructed at most once per
//! session and never shared between sessions.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::base::{Heap, TypeName, Value};
use crate::error::{TranslateError, TranslateResult};
use crate::schema::FactoryKey;

/// Failure reported by a factory or a factory constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FactoryError(String);

impl FactoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Supplies destination instances.
pub trait TranslationTargetFactory {
    /// The instance to use when translating `source` into `requested`.
    ///
    /// `Ok(None)` declines: the session falls back to its default behaviour.
    /// A returned value must reference a record whose type is `requested` or
    /// one of its subtypes.
    fn target_instance(
        &self,
        heap: &mut Heap,
        source: &Value,
        requested: &TypeName,
    ) -> Result<Option<Value>, FactoryError>;
}

impl<F> TranslationTargetFactory for F
where
    F: Fn(&mut Heap, &Value, &TypeName) -> Result<Option<Value>, FactoryError>,
{
    fn target_instance(
        &self,
        heap: &mut Heap,
        source: &Value,
        requested: &TypeName,
    ) -> Result<Option<Value>, FactoryError> {
        self(heap, source, requested)
    }
}

/// Builds a factory instance for a session.
pub type FactoryConstructor =
    Arc<dyn Fn() -> Result<Box<dyn TranslationTargetFactory>, FactoryError> + Send + Sync>;

/// Factory constructors by key. Immutable once handed to a translator.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    constructors: FxHashMap<FactoryKey, FactoryConstructor>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `key`.
    pub fn register(
        &mut self,
        key: impl Into<FactoryKey>,
        constructor: impl Fn() -> Result<Box<dyn TranslationTargetFactory>, FactoryError>
        + Send
        + Sync
        + 'static,
    ) -> &mut Self {
        self.constructors.insert(key.into(), Arc::new(constructor));
        self
    }

    /// Register a factory type built with `Default`.
    pub fn register_default<F>(&mut self, key: impl Into<FactoryKey>) -> &mut Self
    where
        F: TranslationTargetFactory + Default + 'static,
    {
        self.register(key, || Ok(Box::new(F::default()) as Box<dyn TranslationTargetFactory>))
    }

    pub fn contains(&self, key: &FactoryKey) -> bool {
        self.constructors.contains_key(key)
    }

    fn construct(&self, key: &FactoryKey) -> TranslateResult<Box<dyn TranslationTargetFactory>> {
        let constructor = self.constructors.get(key).ok_or_else(|| {
            TranslateError::instantiation(key.as_str(), "no factory registered under this key")
        })?;
        constructor().map_err(|err| {
            TranslateError::instantiation(key.as_str(), format!("factory construction failed: {err}"))
        })
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

/// Session-scoped factory instances.
#[derive(Default)]
pub struct FactoryCache {
    instances: FxHashMap<FactoryKey, Rc<dyn TranslationTargetFactory>>,
}

impl FactoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `factory` for `key` instead of constructing one from the registry.
    pub fn preset(&mut self, key: FactoryKey, factory: Box<dyn TranslationTargetFactory>) {
        self.instances.insert(key, Rc::from(factory));
    }

    /// The session's instance for `key`, constructing it on first use.
    ///
    /// Construction failure is fatal to the session.
    pub fn get_or_create(
        &mut self,
        registry: &FactoryRegistry,
        key: &FactoryKey,
    ) -> TranslateResult<Rc<dyn TranslationTargetFactory>> {
        if let Some(found) = self.instances.get(key) {
            return Ok(Rc::clone(found));
        }
        let factory: Rc<dyn TranslationTargetFactory> = Rc::from(registry.construct(key)?);
        tracing::trace!("[FACTORY] constructed `{}`", key);
        self.instances.insert(key.clone(), Rc::clone(&factory));
        Ok(factory)
    }

    /// Number of factory instances held.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
