//! Serde shape of a schema manifest.
//!
//! The manifest is produced outside of Quarry, read with
//! [`Manifest::from_json`] or any serde format, and handed to
//! [`Schema::load`](super::Schema::load).

use super::OperationKind;
use crate::Result;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub datamodel: Datamodel,

    #[serde(default)]
    pub schema: SchemaDef,

    #[serde(default)]
    pub mappings: Mappings,
}

impl Manifest {
    pub fn from_json(src: &str) -> Result<Manifest> {
        Ok(serde_json::from_str(src)?)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Datamodel {
    #[serde(default)]
    pub models: Vec<ModelDef>,

    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDef {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<FieldDef>,

    /// Compound primary key
    #[serde(default)]
    pub id_fields: Vec<String>,

    /// Compound unique keys
    #[serde(default)]
    pub unique_fields: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,

    pub kind: FieldKindDef,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub is_list: bool,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_id: bool,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub is_read_only: bool,

    #[serde(default)]
    pub is_updated_at: bool,

    #[serde(default)]
    pub has_default_value: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,

    #[serde(default)]
    pub relation_from_fields: Vec<String>,

    #[serde(default)]
    pub relation_to_fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKindDef {
    Scalar,
    Enum,
    Object,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,

    pub values: Vec<EnumValueDef>,
}

/// Enum members appear either as bare strings or as `{ "name": ... }` objects.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum EnumValueDef {
    Name(String),
    Object { name: String },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDef {
    #[serde(default)]
    pub input_object_types: Vec<InputTypeDef>,

    #[serde(default)]
    pub output_object_types: Vec<OutputTypeDef>,

    #[serde(default)]
    pub enum_types: Vec<EnumDef>,

    #[serde(default = "default_root_query_type")]
    pub root_query_type: String,

    #[serde(default = "default_root_mutation_type")]
    pub root_mutation_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTypeDef {
    pub name: String,

    #[serde(default)]
    pub constraints: ConstraintsDef,

    #[serde(default)]
    pub fields: Vec<InputFieldDef>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintsDef {
    #[serde(default)]
    pub min_num_fields: Option<usize>,

    #[serde(default)]
    pub max_num_fields: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFieldDef {
    pub name: String,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_nullable: bool,

    pub input_types: Vec<TypeRefDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTypeDef {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<OutputFieldDef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFieldDef {
    pub name: String,

    #[serde(default)]
    pub args: Vec<InputFieldDef>,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub is_nullable: bool,

    pub output_type: TypeRefDef,
}

/// Reference to a type by name, qualified by where the name is declared.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRefDef {
    #[serde(rename = "type")]
    pub ty: String,

    pub location: Location,

    #[serde(default)]
    pub is_list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Location {
    Scalar,
    EnumTypes,
    InputObjectTypes,
    OutputObjectTypes,

    /// Used for the explicit `null` alternative
    Null,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mappings {
    #[serde(default)]
    pub model_operations: Vec<ModelMappingDef>,
}

/// Root field names bound to one model, one per action.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMappingDef {
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_unique: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_first: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_many: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_many: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_many: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
}

impl Default for SchemaDef {
    fn default() -> Self {
        SchemaDef {
            input_object_types: vec![],
            output_object_types: vec![],
            enum_types: vec![],
            root_query_type: default_root_query_type(),
            root_mutation_type: default_root_mutation_type(),
        }
    }
}

impl EnumDef {
    pub fn value_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.iter().map(|value| match value {
            EnumValueDef::Name(name) | EnumValueDef::Object { name } => &name[..],
        })
    }
}

impl ModelMappingDef {
    /// Every mapped action with its root field name.
    pub fn actions(&self) -> impl Iterator<Item = (OperationKind, &str)> + '_ {
        OperationKind::ALL
            .into_iter()
            .filter_map(move |kind| self.action(kind).map(|name| (kind, name)))
    }

    pub fn action(&self, kind: OperationKind) -> Option<&str> {
        let name = match kind {
            OperationKind::FindUnique => &self.find_unique,
            OperationKind::FindFirst => &self.find_first,
            OperationKind::FindMany => &self.find_many,
            OperationKind::Create => &self.create,
            OperationKind::Update => &self.update,
            OperationKind::Upsert => &self.upsert,
            OperationKind::Delete => &self.delete,
            OperationKind::UpdateMany => &self.update_many,
            OperationKind::DeleteMany => &self.delete_many,
            OperationKind::Aggregate => &self.aggregate,
            OperationKind::GroupBy => &self.group_by,
        };
        name.as_deref()
    }
}

fn default_root_query_type() -> String {
    "Query".to_string()
}

fn default_root_mutation_type() -> String {
    "Mutation".to_string()
}
