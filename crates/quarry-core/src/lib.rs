mod error;
pub use error::{Error, IntoError, ValidationError, ValidationErrorKind, ValidationErrors, VariantMismatch};

mod path;
pub use path::{Path, PathSegment};

pub mod schema;
pub use schema::Schema;

pub mod value;
pub use value::{Record, Value};

/// A Result type alias that uses Quarry's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
