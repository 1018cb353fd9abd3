//! Foundation types for the graft engine.
//!
//! This module provides the object graph both sides of a translation live in:
//! - [`ObjectId`] - Opaque handle; the identity of an object in a [`Heap`]
//! - [`Value`] - A slot value (scalar, null, or reference)
//! - [`Key`] - A hashable scalar used to key maps
//! - [`Heap`], [`Object`], [`Record`] - Arena storage for records, lists and maps
//!
//! This module has NO dependencies on other graft modules.

mod heap;
mod value;

pub use heap::{Heap, HeapFull, Object, Record};
pub use value::{Key, Name, ObjectId, TypeName, Value};

// Re-export smol_str for callers building names
pub use smol_str;
