use super::{InputField, ModelId, OutputField, OutputTypeId};

use indexmap::IndexMap;
use std::fmt;

/// A root field bound to a model and an action.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,

    /// Root field name, e.g. `findManyPost`
    pub name: String,

    pub kind: OperationKind,

    pub model: ModelId,

    pub root: RootKind,

    /// The root field, carrying the argument list and result shape
    pub field: OutputField,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    FindUnique,
    FindFirst,
    FindMany,
    Create,
    Update,
    Upsert,
    Delete,
    UpdateMany,
    DeleteMany,
    Aggregate,
    GroupBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Query,
    Mutation,
}

impl Operation {
    pub fn args(&self) -> &IndexMap<String, InputField> {
        &self.field.args
    }

    pub fn output_type(&self) -> Option<OutputTypeId> {
        self.field.as_object()
    }

    pub fn returns_list(&self) -> bool {
        self.field.list
    }

    pub fn returns_nullable(&self) -> bool {
        self.field.accepts_null()
    }
}

impl OperationKind {
    pub const ALL: [OperationKind; 11] = [
        OperationKind::FindUnique,
        OperationKind::FindFirst,
        OperationKind::FindMany,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Upsert,
        OperationKind::Delete,
        OperationKind::UpdateMany,
        OperationKind::DeleteMany,
        OperationKind::Aggregate,
        OperationKind::GroupBy,
    ];

    /// The action name used by operation mappings.
    pub fn as_str(self) -> &'static str {
        match self {
            OperationKind::FindUnique => "findUnique",
            OperationKind::FindFirst => "findFirst",
            OperationKind::FindMany => "findMany",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
            OperationKind::UpdateMany => "updateMany",
            OperationKind::DeleteMany => "deleteMany",
            OperationKind::Aggregate => "aggregate",
            OperationKind::GroupBy => "groupBy",
        }
    }

    pub fn is_write(self) -> bool {
        !matches!(
            self,
            OperationKind::FindUnique
                | OperationKind::FindFirst
                | OperationKind::FindMany
                | OperationKind::Aggregate
                | OperationKind::GroupBy
        )
    }

    /// The root type that declares operations of this kind.
    pub fn root(self) -> RootKind {
        if self.is_write() {
            RootKind::Mutation
        } else {
            RootKind::Query
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RootKind::Query => "query",
            RootKind::Mutation => "mutation",
        })
    }
}
