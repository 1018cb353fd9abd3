//! Translator configuration

use crate::schema::ElementMatcher;

/// Default for [`Configuration::max_depth`].
///
/// Each nested record costs several stack frames, so the limit is kept well
/// inside a 2 MiB thread stack, the size Rust gives spawned threads. Raise it
/// only for sessions run on threads with larger stacks.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options that apply to every session a translator runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Fail when the source expression of an inferred property cannot be
    /// resolved. When `false` such properties are skipped; explicit
    /// properties always fail.
    pub source_properties_required: bool,
    /// Matcher for updated collections that do not configure one.
    pub default_matcher: ElementMatcher,
    /// Maximum nesting of object translations within one session. Deeper
    /// graphs fail with `DepthExceeded` instead of exhausting the stack.
    pub max_depth: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            source_properties_required: true,
            default_matcher: ElementMatcher::Positional,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Configuration {
    pub fn with_source_properties_required(mut self, required: bool) -> Self {
        self.source_properties_required = required;
        self
    }

    pub fn with_default_matcher(mut self, matcher: ElementMatcher) -> Self {
        self.default_matcher = matcher;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
