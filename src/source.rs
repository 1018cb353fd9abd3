//! Source expressions: finding the source value for a destination slot.
//!
//! The engine only needs "resolve this expression against that node"; how
//! expressions are written is up to the [`SourceResolver`]. The default
//! [`PathResolver`] understands dotted field paths.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{Heap, Value};

/// Why a source expression could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("empty expression")]
    Empty,

    #[error("no field `{segment}` on `{type_name}`")]
    MissingField { segment: SmolStr, type_name: SmolStr },

    #[error("cannot read `{segment}` from {found}")]
    NotARecord { segment: SmolStr, found: String },
}

impl ResolveError {
    /// True when the expression named something the source does not have,
    /// as opposed to being malformed.
    pub fn is_missing(&self) -> bool {
        matches!(self, ResolveError::MissingField { .. })
    }
}

/// Resolves source expressions against source values.
pub trait SourceResolver: Send + Sync {
    fn resolve(&self, heap: &Heap, source: &Value, expression: &str) -> Result<Value, ResolveError>;
}

/// Dotted field paths: `owner.address.city`.
///
/// `this` and `self` denote the current node. A null intermediate ends the
/// walk with null.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl SourceResolver for PathResolver {
    fn resolve(&self, heap: &Heap, source: &Value, expression: &str) -> Result<Value, ResolveError> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(ResolveError::Empty);
        }

        let mut current = source.clone();
        for segment in expression.split('.').map(str::trim) {
            if segment.is_empty() {
                return Err(ResolveError::Empty);
            }
            if segment == "this" || segment == "self" {
                continue;
            }
            let id = match &current {
                Value::Null => return Ok(Value::Null),
                Value::Ref(id) => *id,
                other => {
                    return Err(ResolveError::NotARecord {
                        segment: segment.into(),
                        found: other.kind_name().to_string(),
                    });
                }
            };
            let record = heap.record(id).ok_or_else(|| ResolveError::NotARecord {
                segment: segment.into(),
                found: heap.describe(&current),
            })?;
            current = record
                .get(segment)
                .cloned()
                .ok_or_else(|| ResolveError::MissingField {
                    segment: segment.into(),
                    type_name: record.type_name().clone(),
                })?;
        }
        Ok(current)
    }
}
