use super::{Field, FieldId, ForeignKey, Model, ModelId, Schema};

/// A link from one model field to another model.
#[derive(Debug, Clone)]
pub struct Relation {
    /// Relation name shared by both sides
    pub name: String,

    pub target: ModelId,

    /// The field on the target model that describes the other side
    pub pair: FieldId,

    pub kind: RelationKind,
}

/// Which side of a relation stores the link.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationKind {
    /// This model carries the foreign key scalars.
    Owning(ForeignKey),

    /// The pair carries the foreign key; writes through this side never set
    /// a key on this model.
    BackReference,

    /// Neither side carries a key; links live in an external join table.
    Join,
}

impl Relation {
    pub fn target<'a>(&self, schema: &'a Schema) -> &'a Model {
        &schema[self.target]
    }

    pub fn pair<'a>(&self, schema: &'a Schema) -> &'a Field {
        &schema[self.pair]
    }

    pub fn is_owning(&self) -> bool {
        matches!(self.kind, RelationKind::Owning(_))
    }

    pub fn is_back_reference(&self) -> bool {
        matches!(self.kind, RelationKind::BackReference)
    }

    pub fn is_join(&self) -> bool {
        matches!(self.kind, RelationKind::Join)
    }

    pub fn foreign_key(&self) -> Option<&ForeignKey> {
        match &self.kind {
            RelationKind::Owning(fk) => Some(fk),
            _ => None,
        }
    }
}
