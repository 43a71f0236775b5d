pub(crate) mod aggregate;
pub(crate) mod compile;
pub(crate) mod materialize;
pub(crate) mod relation;
mod scalar;
pub(crate) mod selection;
mod suggest;
pub(crate) mod validate;

use crate::Config;

use quarry_core::Schema;

/// Read-only state shared by the engine passes of one call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cx<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) config: &'a Config,
}

impl Cx<'_> {
    /// Suggests the candidate closest to `provided`, when suggestions are on.
    pub(crate) fn suggest<'c>(
        &self,
        provided: &str,
        candidates: impl IntoIterator<Item = &'c str>,
    ) -> Option<String> {
        if !self.config.suggestions {
            return None;
        }

        suggest::closest(provided, candidates).map(str::to_string)
    }
}
