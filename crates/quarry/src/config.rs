use serde::Deserialize;

/// Settings shared by every call made through a [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nested input objects deeper than this are rejected with
    /// `DepthLimitExceeded`.
    pub max_depth: usize,

    /// Attach a "did you mean" hint to unknown-field errors
    pub suggestions: bool,

    /// Whether enum fields are part of the selection used when a request
    /// carries no `select`
    pub default_selection_includes_enums: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: 100,
            suggestions: true,
            default_selection_includes_enums: true,
        }
    }
}
