use super::Args;

use quarry_core::Value;
use serde::Serialize;

/// A nested write through one relation field, e.g. `author: { connect: .. }`
/// inside a `createOnePost` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationOp {
    /// Model declaring the relation field
    pub model: String,

    pub field: String,

    /// Model on the other side of the relation
    pub target: String,

    /// Where the link between the two rows is stored
    pub link: Link,

    /// The field holds many related rows
    pub many: bool,

    /// Writes in the order they were supplied
    pub actions: Vec<RelationAction>,
}

/// Storage of a relation link, as seen from the field being written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Link {
    /// The writing model stores the foreign key scalars
    ForeignKeyOnSource { fields: Vec<LinkField> },

    /// Related rows store a foreign key pointing back at the writing model
    ForeignKeyOnTarget { fields: Vec<LinkField> },

    /// Neither model stores the link; rows are paired in an external join
    JoinTable { relation: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkField {
    /// Scalar field holding the foreign key
    pub foreign_key: String,

    /// Key field on the referenced model
    pub references: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationAction {
    Create(Args),

    Connect(Connect),

    ConnectOrCreate {
        selector: Args,
        create: Args,
    },

    /// Update a related row. To-one relations carry no selector; the row
    /// currently linked is updated.
    Update {
        selector: Option<Args>,
        data: Args,
    },

    Upsert {
        selector: Option<Args>,
        create: Args,
        update: Args,
    },

    /// Replace every link with the listed rows
    Set(Vec<Args>),

    /// `None` unlinks the row currently linked through a to-one relation
    Disconnect(Option<Args>),

    Delete(Option<Args>),

    UpdateMany {
        filter: Args,
        data: Args,
    },

    DeleteMany(Args),
}

/// Link an existing row found through a unique selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connect {
    pub selector: Args,

    /// Foreign key values known without a lookup. Empty when the related
    /// row must be fetched first.
    pub assignments: Vec<Assignment>,
}

/// `field = value` on the owning row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

impl RelationOp {
    /// Actions with the given input key, e.g. `connect`.
    pub fn actions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RelationAction> + 'a {
        self.actions.iter().filter(move |action| action.name() == name)
    }
}

impl RelationAction {
    /// The input key this action was written under.
    pub fn name(&self) -> &'static str {
        match self {
            RelationAction::Create(_) => "create",
            RelationAction::Connect(_) => "connect",
            RelationAction::ConnectOrCreate { .. } => "connectOrCreate",
            RelationAction::Update { .. } => "update",
            RelationAction::Upsert { .. } => "upsert",
            RelationAction::Set(_) => "set",
            RelationAction::Disconnect(_) => "disconnect",
            RelationAction::Delete(_) => "delete",
            RelationAction::UpdateMany { .. } => "updateMany",
            RelationAction::DeleteMany(_) => "deleteMany",
        }
    }
}

impl Connect {
    /// True when the foreign key is assigned directly from the selector.
    pub fn is_direct(&self) -> bool {
        !self.assignments.is_empty()
    }
}
