use super::Error;

/// Error when a raw result does not have the shape the schema promises.
#[derive(Debug)]
pub(super) struct MaterializationError {
    message: Box<str>,
}

impl std::error::Error for MaterializationError {}

impl core::fmt::Display for MaterializationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "result materialization failed: {}", self.message)
    }
}

impl Error {
    /// Creates a result materialization error.
    pub fn materialization(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Materialization(MaterializationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a result materialization error.
    pub fn is_materialization(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Materialization(_))
    }
}
