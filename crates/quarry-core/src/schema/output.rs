use super::{AggregateFunction, EnumId, InputField, ScalarKind};

use indexmap::IndexMap;

/// A named result shape.
#[derive(Debug, Clone)]
pub struct OutputType {
    pub id: OutputTypeId,

    pub name: String,

    pub fields: IndexMap<String, OutputField>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputTypeId(pub usize);

#[derive(Debug, Clone)]
pub struct OutputField {
    pub name: String,

    pub ty: OutputTy,

    pub list: bool,

    pub required: bool,

    pub nullable: bool,

    /// Arguments accepted when the field is selected, e.g. `where` on a
    /// to-many relation or on a root operation.
    pub args: IndexMap<String, InputField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTy {
    Scalar(ScalarKind),
    Enum(EnumId),
    Object(OutputTypeId),
}

impl OutputType {
    pub fn field(&self, name: &str) -> Option<&OutputField> {
        self.fields.get(name)
    }

    /// The field carrying `function` results, under whichever spelling
    /// (`_avg` or `avg`) this type declares.
    pub fn aggregate_field(&self, function: AggregateFunction) -> Option<&OutputField> {
        self.field(function.key())
            .or_else(|| self.field(function.name()))
    }
}

impl OutputField {
    /// Lists are never null; other fields are when nullable or optional.
    pub fn accepts_null(&self) -> bool {
        !self.list && (self.nullable || !self.required)
    }

    pub fn is_object(&self) -> bool {
        matches!(self.ty, OutputTy::Object(_))
    }

    pub fn as_object(&self) -> Option<OutputTypeId> {
        match self.ty {
            OutputTy::Object(id) => Some(id),
            _ => None,
        }
    }
}
