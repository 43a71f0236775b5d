use super::{Field, FieldId};

use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct Model {
    /// Uniquely identifies the model within the schema
    pub id: ModelId,

    pub name: String,

    /// Fields keyed by name, in declaration order. A field's position is
    /// its `FieldId::index`.
    pub fields: IndexMap<String, Field>,

    /// Fields of the (possibly compound) primary key
    pub primary_key: Vec<FieldId>,

    /// Declared unique field sets, including single-field `unique` fields
    pub unique_keys: Vec<Vec<FieldId>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

impl Model {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Scalar and enum fields, in declaration order.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.values().filter(|field| !field.is_relation())
    }

    pub fn relation_fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.values().filter(|field| field.is_relation())
    }

    /// Every field set that identifies a single row: the primary key first,
    /// then each unique key.
    pub fn identifying_keys(&self) -> impl Iterator<Item = &[FieldId]> + '_ {
        Some(&self.primary_key[..])
            .filter(|pk| !pk.is_empty())
            .into_iter()
            .chain(self.unique_keys.iter().map(|key| &key[..]))
    }

    pub fn has_identifier(&self) -> bool {
        self.identifying_keys().next().is_some()
    }
}

impl ModelId {
    /// Create a `FieldId` representing the current model's field at index
    /// `index`.
    pub const fn field(self, index: usize) -> FieldId {
        FieldId { model: self, index }
    }

    pub(crate) const fn placeholder() -> Self {
        Self(usize::MAX)
    }
}

impl From<&Model> for ModelId {
    fn from(value: &Model) -> Self {
        value.id
    }
}
