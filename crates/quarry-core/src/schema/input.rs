use super::{EnumId, ScalarKind, Schema};

use indexmap::IndexMap;

/// A named argument shape.
#[derive(Debug, Clone)]
pub struct InputType {
    pub id: InputTypeId,

    pub name: String,

    pub fields: IndexMap<String, InputField>,

    pub constraints: FieldCount,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputTypeId(pub usize);

/// Bounds on how many keys an object may carry, counted over present keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldCount {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct InputField {
    pub name: String,

    pub required: bool,

    /// Accepted shapes, tried in order.
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub ty: InputTy,

    pub list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTy {
    Scalar(ScalarKind),
    Enum(EnumId),
    Object(InputTypeId),

    /// The explicit `null` sentinel
    Null,
}

impl InputType {
    pub fn field(&self, name: &str) -> Option<&InputField> {
        self.fields.get(name)
    }
}

impl FieldCount {
    /// True for unique-lookup shapes: exactly one key must be present.
    pub fn is_exactly_one(&self) -> bool {
        self.min == Some(1) && self.max == Some(1)
    }
}

impl InputField {
    pub fn accepts_null(&self) -> bool {
        self.alternatives.iter().any(Alternative::is_null)
    }

    /// Alternatives a non-null value can match.
    pub fn non_null_alternatives(&self) -> impl Iterator<Item = &Alternative> + '_ {
        self.alternatives.iter().filter(|alt| !alt.is_null())
    }
}

impl Alternative {
    pub fn is_null(&self) -> bool {
        matches!(self.ty, InputTy::Null)
    }

    /// Printable form, e.g. `Int`, `List<PostWhereInput>`, `Null`.
    pub fn describe(&self, schema: &Schema) -> String {
        let name: &str = match self.ty {
            InputTy::Scalar(kind) => kind.name(),
            InputTy::Enum(id) => &schema[id].name,
            InputTy::Object(id) => &schema[id].name,
            InputTy::Null => "Null",
        };

        if self.list {
            format!("List<{name}>")
        } else {
            name.to_string()
        }
    }
}
