//! # graft-base
//!
//! Core engine for copying and updating values between two independently
//! defined object graphs according to per-property configuration.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! translator → Shared entry point: translate / update / preset factories
//!   ↓
//! session    → One call: identity cache, collection + map reconciliation
//!   ↓
//! factory    → Translation target factories and their per-session cache
//!   ↓
//! property   → Frozen per-type descriptors and slot access variants
//!   ↓
//! source     → Source expression resolution
//!   ↓
//! schema     → Declared types, slot configuration, subtype checks
//!   ↓
//! base       → Object handles, values, the heap
//! ```

// ============================================================================
// MODULES (dependency order: base → schema → source → property → factory → session)
// ============================================================================

/// Foundation types: ObjectId, Value, Key, Heap
pub mod base;

/// Declared types, configuration options, type registry
pub mod schema;

/// Source expression resolution
pub mod source;

/// Property descriptors, slots, descriptor table
pub mod property;

/// Translation target factories
pub mod factory;

/// Translation sessions and the update engines
pub mod session;

/// Translator configuration
pub mod config;

/// Error types
pub mod error;

mod translator;

pub use translator::Translator;

// Re-export commonly needed items
pub use base::{Heap, HeapFull, Key, Name, Object, ObjectId, Record, TypeName, Value};
pub use config::{Configuration, DEFAULT_MAX_DEPTH};
pub use error::{PropertyPath, TranslateError, TranslateResult};
pub use factory::{FactoryError, FactoryRegistry, TranslationTargetFactory};
pub use property::{Accessors, Property, PropertyKind, Slot};
pub use schema::{ElementMatcher, FactoryKey, FieldDef, TypeDef, TypeRegistry, ValueType};
pub use session::TranslationSession;
pub use source::{PathResolver, ResolveError, SourceResolver};
