use super::Error;

/// Error when a request names an operation the schema does not map.
#[derive(Debug)]
pub(super) struct UnknownOperation {
    name: Box<str>,
}

impl std::error::Error for UnknownOperation {}

impl core::fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unknown operation: {}", self.name)
    }
}

impl Error {
    /// Creates an unknown operation error.
    pub fn unknown_operation(name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnknownOperation(UnknownOperation {
            name: name.into().into(),
        }))
    }

    /// Returns `true` if this error is an unknown operation error.
    pub fn is_unknown_operation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnknownOperation(_))
    }
}
