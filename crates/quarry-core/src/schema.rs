mod aggregate;
pub use aggregate::AggregateFunction;

mod builder;

mod enumeration;
pub use enumeration::{Enum, EnumId};

mod field;
pub use field::{Field, FieldId, FieldTy};

mod fk;
pub use fk::{ForeignKey, ForeignKeyField};

mod input;
pub use input::{Alternative, FieldCount, InputField, InputTy, InputType, InputTypeId};

pub mod manifest;
pub use manifest::Manifest;

mod model;
pub use model::{Model, ModelId};

mod operation;
pub use operation::{Operation, OperationId, OperationKind, RootKind};

mod output;
pub use output::{OutputField, OutputTy, OutputType, OutputTypeId};

mod relation;
pub use relation::{Relation, RelationKind};

mod scalar;
pub use scalar::ScalarKind;

mod verify;

use crate::Result;

use indexmap::IndexMap;
use std::collections::HashMap;
use std::ops::Index;

/// The loaded, immutable registry.
///
/// Every table is keyed by name; the position of an entry in its table is
/// its id, so cross references stored as ids never dangle.
#[derive(Debug)]
pub struct Schema {
    pub models: IndexMap<String, Model>,

    pub enums: IndexMap<String, Enum>,

    pub input_types: IndexMap<String, InputType>,

    pub output_types: IndexMap<String, OutputType>,

    /// Mapped operations, keyed by root field name
    pub operations: IndexMap<String, Operation>,

    pub root_query: OutputTypeId,

    pub root_mutation: Option<OutputTypeId>,

    operations_by_model: HashMap<(ModelId, OperationKind), OperationId>,
}

impl Schema {
    /// Indexes a manifest, resolving every type reference and relation.
    pub fn load(manifest: &Manifest) -> Result<Schema> {
        builder::Builder::new(manifest).build()
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn input_type(&self, name: &str) -> Option<&InputType> {
        self.input_types.get(name)
    }

    pub fn output_type(&self, name: &str) -> Option<&OutputType> {
        self.output_types.get(name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&Enum> {
        self.enums.get(name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Finds the operation mapped for `kind` on `model`.
    pub fn operation_for(&self, model: ModelId, kind: OperationKind) -> Option<&Operation> {
        self.operations_by_model
            .get(&(model, kind))
            .map(|id| &self[*id])
    }

    /// The output type describing `function` results for `model`, e.g.
    /// `PostAvgAggregateOutputType`.
    pub fn aggregate_output(
        &self,
        model: ModelId,
        function: AggregateFunction,
    ) -> Option<&OutputType> {
        let operation = self.operation_for(model, OperationKind::Aggregate)?;
        let output = &self[operation.output_type()?];
        let field = output.aggregate_field(function)?;
        field.as_object().map(|id| &self[id])
    }
}

impl Index<ModelId> for Schema {
    type Output = Model;

    #[track_caller]
    fn index(&self, id: ModelId) -> &Model {
        self.models.get_index(id.0).expect("invalid model ID").1
    }
}

impl Index<FieldId> for Schema {
    type Output = Field;

    #[track_caller]
    fn index(&self, id: FieldId) -> &Field {
        self[id.model]
            .fields
            .get_index(id.index)
            .expect("invalid field ID")
            .1
    }
}

impl Index<EnumId> for Schema {
    type Output = Enum;

    #[track_caller]
    fn index(&self, id: EnumId) -> &Enum {
        self.enums.get_index(id.0).expect("invalid enum ID").1
    }
}

impl Index<InputTypeId> for Schema {
    type Output = InputType;

    #[track_caller]
    fn index(&self, id: InputTypeId) -> &InputType {
        self.input_types
            .get_index(id.0)
            .expect("invalid input type ID")
            .1
    }
}

impl Index<OutputTypeId> for Schema {
    type Output = OutputType;

    #[track_caller]
    fn index(&self, id: OutputTypeId) -> &OutputType {
        self.output_types
            .get_index(id.0)
            .expect("invalid output type ID")
            .1
    }
}

impl Index<OperationId> for Schema {
    type Output = Operation;

    #[track_caller]
    fn index(&self, id: OperationId) -> &Operation {
        self.operations
            .get_index(id.0)
            .expect("invalid operation ID")
            .1
    }
}
