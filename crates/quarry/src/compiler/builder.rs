use super::Compiler;
use crate::Config;

use quarry_core::schema::Manifest;
use quarry_core::{Result, Schema};

use std::sync::Arc;

/// Configures a [`Compiler`].
#[derive(Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Replaces the whole configuration.
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Maximum nesting depth accepted in argument and selection trees.
    pub fn max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Whether unknown field errors carry a did-you-mean suggestion.
    pub fn suggestions(&mut self, enabled: bool) -> &mut Self {
        self.config.suggestions = enabled;
        self
    }

    pub fn default_selection_includes_enums(&mut self, enabled: bool) -> &mut Self {
        self.config.default_selection_includes_enums = enabled;
        self
    }

    pub fn build(&self, schema: impl Into<Arc<Schema>>) -> Compiler {
        Compiler {
            schema: schema.into(),
            config: self.config.clone(),
        }
    }

    /// Loads `manifest` and builds a compiler over it.
    pub fn load(&self, manifest: &Manifest) -> Result<Compiler> {
        Ok(self.build(Schema::load(manifest)?))
    }
}
