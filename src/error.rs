//! Error types for translation and update operations.

use std::fmt;

use thiserror::Error;

use crate::base::{HeapFull, Name, TypeName};

/// Result alias used throughout the engine.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Chain of property names leading from the session root to a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyPath(Vec<Name>);

impl PropertyPath {
    pub fn new(segments: Vec<Name>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Name] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Errors that abort a translate or update call.
///
/// Every error is fatal to the enclosing top-level call. Destination state
/// already written by earlier properties is left as it is.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The source value for a property could not be resolved, or a slot
    /// without read capability was queried.
    #[error("cannot read property `{property}` of `{declaring_type}`: {reason}")]
    PropertyRead {
        property: Name,
        declaring_type: TypeName,
        reason: String,
    },

    /// A destination slot rejected a value.
    #[error("cannot write {value} to property `{property}` of `{declaring_type}`: {reason}")]
    PropertyWrite {
        property: Name,
        declaring_type: TypeName,
        value: String,
        reason: String,
    },

    /// No usable constructor, or a factory failed or returned an unusable instance.
    #[error("cannot instantiate `{type_name}`: {reason}")]
    Instantiation { type_name: TypeName, reason: String },

    /// A new destination object could not be stored.
    #[error(transparent)]
    HeapFull(#[from] HeapFull),

    /// The destination handed to `update` is not a record.
    #[error("invalid update destination {0}")]
    InvalidDestination(String),

    /// Nesting went deeper than the configured limit.
    #[error("translation exceeded the maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Wraps a failure with the translation path it occurred on.
    #[error("translating {source_type} to `{destination_type}` at `{path}`: {cause}")]
    Translation {
        source_type: String,
        destination_type: TypeName,
        path: PropertyPath,
        #[source]
        cause: Box<TranslateError>,
    },
}

impl TranslateError {
    /// Create a property read error.
    pub fn read(
        property: impl Into<Name>,
        declaring_type: impl Into<TypeName>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PropertyRead {
            property: property.into(),
            declaring_type: declaring_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a property write error.
    pub fn write(
        property: impl Into<Name>,
        declaring_type: impl Into<TypeName>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::PropertyWrite {
            property: property.into(),
            declaring_type: declaring_type.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an instantiation error.
    pub fn instantiation(type_name: impl Into<TypeName>, reason: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// The innermost error, with translation context stripped.
    pub fn root_cause(&self) -> &TranslateError {
        match self {
            Self::Translation { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// True when the root cause is a property read or write failure.
    pub fn is_property_access(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::PropertyRead { .. } | Self::PropertyWrite { .. }
        )
    }

    /// The property chain recorded by the translation wrapper, if any.
    pub fn path(&self) -> Option<&PropertyPath> {
        match self {
            Self::Translation { path, .. } => Some(path),
            _ => None,
        }
    }
}
