use super::Error;

/// Error when a schema manifest cannot be loaded.
///
/// This occurs when:
/// - A type reference names a model, enum, or input/output type that does not exist
/// - A relation field has no counterpart, or both sides claim the foreign key
/// - A model has no identifying field
/// - An operation mapping points at a missing root field or is declared twice
///
/// These errors are raised once, while the registry is built.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
