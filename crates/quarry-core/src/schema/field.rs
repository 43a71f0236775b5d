use super::{EnumId, ModelId, Relation, ScalarKind, Schema};

use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The field name
    pub name: String,

    /// Scalar, enum, or relation
    pub ty: FieldTy,

    /// True if the field holds a list
    pub list: bool,

    /// True if the field must hold a value. Optional non-list fields are nullable.
    pub required: bool,

    /// True if the field is (part of) the primary key
    pub primary_key: bool,

    pub unique: bool,

    /// True if the storage layer fills the field when it is omitted
    pub has_default: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Scalar(ScalarKind),
    Enum(EnumId),
    Relation(Relation),
}

impl Field {
    pub fn is_relation(&self) -> bool {
        self.ty.is_relation()
    }

    pub fn nullable(&self) -> bool {
        !self.required && !self.list
    }

    pub fn relation(&self) -> Option<&Relation> {
        self.ty.as_relation()
    }

    /// Returns a fully qualified name for the field.
    pub fn full_name(&self, schema: &Schema) -> String {
        format!("{}.{}", schema[self.id.model].name, self.name)
    }
}

impl FieldTy {
    pub fn is_relation(&self) -> bool {
        matches!(self, Self::Relation(..))
    }

    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            Self::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&Relation> {
        match self {
            Self::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_relation(&self) -> &Relation {
        match self {
            Self::Relation(relation) => relation,
            _ => panic!("expected relation; actual={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_relation_mut(&mut self) -> &mut Relation {
        match self {
            Self::Relation(relation) => relation,
            _ => panic!("expected relation; actual={self:#?}"),
        }
    }
}

impl FieldId {
    pub(crate) const fn placeholder() -> Self {
        Self {
            model: ModelId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
