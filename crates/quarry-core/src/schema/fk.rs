use super::{Field, FieldId, Schema};

/// Scalar fields on the owning model that reference key fields of the
/// related model.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub fields: Vec<ForeignKeyField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyField {
    /// The field on the source model that is acting as the foreign key
    pub source: FieldId,

    /// The field on the target model that this FK field maps to.
    pub target: FieldId,
}

impl ForeignKey {
    /// Source fields in declaration order.
    pub fn sources(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().map(|field| field.source)
    }
}

impl ForeignKeyField {
    pub fn source<'a>(&self, schema: &'a Schema) -> &'a Field {
        &schema[self.source]
    }

    pub fn target<'a>(&self, schema: &'a Schema) -> &'a Field {
        &schema[self.target]
    }
}
