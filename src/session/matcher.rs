//! Pairing source elements with existing destination elements.

use super::TranslationSession;
use crate::base::Value;
use crate::error::TranslateResult;
use crate::property::Property;
use crate::schema::ElementMatcher;

impl TranslationSession<'_> {
    /// Position of the unclaimed destination element `element` pairs with.
    pub(super) fn find_match(
        &self,
        property: &Property,
        matcher: &ElementMatcher,
        index: usize,
        element: &Value,
        existing: &[Value],
        claimed: &[bool],
    ) -> TranslateResult<Option<usize>> {
        let open = |position: &usize| !claimed[*position];
        Ok(match matcher {
            ElementMatcher::Positional => Some(index).filter(|i| *i < existing.len() && open(i)),
            ElementMatcher::Identity => {
                if element.is_null() {
                    None
                } else {
                    (0..existing.len()).filter(open).find(|&i| existing[i] == *element)
                }
            }
            ElementMatcher::ById {
                source,
                destination,
            } => {
                let id = self
                    .translator
                    .resolver
                    .resolve(self.heap, element, source)
                    .map_err(|err| property.read_error(format!("element identifier `{source}`: {err}")))?;
                if id.is_null() {
                    None
                } else {
                    (0..existing.len()).filter(open).find(|&i| {
                        existing[i]
                            .as_object()
                            .and_then(|candidate| self.heap.field(candidate, destination))
                            .is_some_and(|value| *value == id)
                    })
                }
            }
            ElementMatcher::Never => None,
        })
    }
}
