use super::Error;

/// Error when a validated request cannot be turned into a query document.
///
/// Validation already rejects malformed input, so this signals that an
/// internal invariant did not hold: an argument the operation does not
/// declare, or a relation whose target model has no read mapping.
#[derive(Debug)]
pub(super) struct CompilationError {
    message: Box<str>,
}

impl std::error::Error for CompilationError {}

impl core::fmt::Display for CompilationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "compilation failed: {}", self.message)
    }
}

impl Error {
    /// Creates a compilation error.
    pub fn compilation(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Compilation(CompilationError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a compilation error.
    pub fn is_compilation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Compilation(_))
    }
}
