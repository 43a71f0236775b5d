use super::Error;
use crate::Path;

use std::ops::Deref;

/// A single problem found while checking caller input against the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Location of the offending value, starting at the argument root.
    pub path: Path,

    pub kind: ValidationErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorKind {
    /// A key not declared by the input type.
    UnknownField {
        name: String,
        type_name: String,
        suggestion: Option<String>,
    },

    /// A required key was absent.
    MissingRequiredField { name: String, type_name: String },

    /// The value matched none of the field's alternatives.
    NoMatchingUnionVariant { attempts: Vec<VariantMismatch> },

    TooFewFields {
        type_name: String,
        min: usize,
        present: usize,
    },

    TooManyFields {
        type_name: String,
        max: usize,
        present: Vec<String>,
    },

    /// An aggregate function was requested for a field its output type does not list.
    FieldNotAggregable {
        function: String,
        field: String,
        model: String,
    },

    /// A required relation was given no operation.
    MissingRequiredRelation { model: String, field: String },

    /// Mutually exclusive relation operations were combined.
    AmbiguousRelationOperation {
        model: String,
        field: String,
        operations: Vec<String>,
    },

    EmptySelection { type_name: String },

    NoTruthySelection { type_name: String },

    IncludeAndSelect { type_name: String },

    IncludeScalarField { name: String, type_name: String },

    DepthLimitExceeded { limit: usize },
}

/// One alternative the validator tried, and why it did not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantMismatch {
    /// Printable form of the alternative, e.g. `Int`, `List<Tag>`, `Null`.
    pub alternative: String,

    pub reasons: Vec<String>,
}

/// Every validation problem found in one request.
///
/// Validation keeps going after the first problem, so callers see the whole
/// list at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(path: Path, kind: ValidationErrorKind) -> ValidationError {
        ValidationError { path, kind }
    }

    pub fn is_relation(&self) -> bool {
        self.kind.is_relation()
    }
}

impl ValidationErrorKind {
    /// Returns `true` for problems with nested relation writes.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            ValidationErrorKind::MissingRequiredRelation { .. }
                | ValidationErrorKind::AmbiguousRelationOperation { .. }
        )
    }

    pub fn is_unknown_field(&self) -> bool {
        matches!(self, ValidationErrorKind::UnknownField { .. })
    }

    pub fn is_no_matching_union_variant(&self) -> bool {
        matches!(self, ValidationErrorKind::NoMatchingUnionVariant { .. })
    }
}

impl ValidationErrors {
    pub fn new() -> ValidationErrors {
        ValidationErrors::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn append(&mut self, other: &mut ValidationErrors) {
        self.errors.append(&mut other.errors);
    }

    /// Returns `Ok(())` when nothing was collected.
    pub fn into_result(self) -> crate::Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(self))
        }
    }
}

impl Deref for ValidationErrors {
    type Target = [ValidationError];

    fn deref(&self) -> &[ValidationError] {
        &self.errors
    }
}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<T: IntoIterator<Item = ValidationError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> ValidationErrors {
        ValidationErrors {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl std::error::Error for ValidationErrors {}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("validation failed: ")?;

        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            core::fmt::Display::fmt(error, f)?;
        }

        Ok(())
    }
}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.path.is_root() {
            core::fmt::Display::fmt(&self.kind, f)
        } else {
            write!(f, "`{}`: {}", self.path, self.kind)
        }
    }
}

impl core::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use ValidationErrorKind::*;

        match self {
            UnknownField {
                name,
                type_name,
                suggestion,
            } => {
                write!(f, "unknown field `{name}` on `{type_name}`")?;
                if let Some(suggestion) = suggestion {
                    write!(f, ", did you mean `{suggestion}`?")?;
                }
                Ok(())
            }
            MissingRequiredField { name, type_name } => {
                write!(f, "missing required field `{name}` on `{type_name}`")
            }
            NoMatchingUnionVariant { attempts } => {
                f.write_str("value matches none of the accepted types: ")?;
                for (i, attempt) in attempts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    core::fmt::Display::fmt(attempt, f)?;
                }
                Ok(())
            }
            TooFewFields {
                type_name,
                min,
                present,
            } => write!(
                f,
                "`{type_name}` needs at least {min} field(s), found {present}"
            ),
            TooManyFields {
                type_name,
                max,
                present,
            } => {
                write!(
                    f,
                    "`{type_name}` accepts at most {max} field(s), found {}:",
                    present.len()
                )?;
                for name in present {
                    write!(f, " `{name}`")?;
                }
                Ok(())
            }
            FieldNotAggregable {
                function,
                field,
                model,
            } => write!(
                f,
                "field `{model}.{field}` cannot be used with `{function}`"
            ),
            MissingRequiredRelation { model, field } => {
                write!(f, "required relation `{model}.{field}` has no operation")
            }
            AmbiguousRelationOperation {
                model,
                field,
                operations,
            } => {
                write!(f, "relation `{model}.{field}` cannot combine")?;
                for (i, op) in operations.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" and")?;
                    }
                    write!(f, " `{op}`")?;
                }
                Ok(())
            }
            EmptySelection { type_name } => {
                write!(f, "`select` on `{type_name}` must not be empty")
            }
            NoTruthySelection { type_name } => {
                write!(f, "`select` on `{type_name}` must set at least one field to true")
            }
            IncludeAndSelect { type_name } => {
                write!(f, "`select` and `include` cannot be combined on `{type_name}`")
            }
            IncludeScalarField { name, type_name } => {
                write!(f, "`include` on `{type_name}` only accepts relations, `{name}` is not one")
            }
            DepthLimitExceeded { limit } => {
                write!(f, "input is nested deeper than {limit} levels")
            }
        }
    }
}

impl core::fmt::Display for VariantMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "`{}`", self.alternative)?;
        if !self.reasons.is_empty() {
            write!(f, " ({})", self.reasons.join("; "))?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a validation error carrying every problem found in a request.
    pub fn validation(errors: impl Into<ValidationErrors>) -> Error {
        Error::from(super::ErrorKind::Validation(errors.into()))
    }

    /// Returns `true` if this error, or one of its causes, is a validation error.
    pub fn is_validation(&self) -> bool {
        self.as_validation().is_some()
    }

    /// Returns the collected validation problems, searching through any added context.
    pub fn as_validation(&self) -> Option<&ValidationErrors> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::Validation(errors) => Some(errors),
            _ => None,
        })
    }
}
