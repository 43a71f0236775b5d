use super::manifest::{FieldDef, FieldKindDef, InputFieldDef, Location, Manifest, TypeRefDef};
use super::{
    Alternative, Enum, EnumId, Field, FieldCount, FieldId, FieldTy, ForeignKey, ForeignKeyField,
    InputField, InputTy, InputType, InputTypeId, Model, ModelId, Operation, OperationId,
    OperationKind, OutputField, OutputTy, OutputType, OutputTypeId, Relation, RelationKind,
    RootKind, ScalarKind, Schema,
};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::collections::HashMap;

/// Used to track state while a manifest is indexed.
pub(super) struct Builder<'a> {
    manifest: &'a Manifest,

    models: IndexMap<String, Model>,

    enums: IndexMap<String, Enum>,

    /// Input and output types are reserved by name before their fields are
    /// built, so recursive shapes can refer to themselves.
    input_types: IndexMap<String, InputType>,

    output_types: IndexMap<String, OutputType>,

    operations: IndexMap<String, Operation>,

    operations_by_model: HashMap<(ModelId, OperationKind), OperationId>,
}

impl<'a> Builder<'a> {
    pub(super) fn new(manifest: &'a Manifest) -> Builder<'a> {
        Builder {
            manifest,
            models: IndexMap::new(),
            enums: IndexMap::new(),
            input_types: IndexMap::new(),
            output_types: IndexMap::new(),
            operations: IndexMap::new(),
            operations_by_model: HashMap::new(),
        }
    }

    pub(super) fn build(mut self) -> Result<Schema> {
        self.intern_enums()?;
        self.intern_models()?;
        self.intern_type_names()?;

        self.build_model_fields()?;

        // All models and fields exist now, so relations can be paired.
        self.link_relations()?;

        self.build_input_types()?;
        self.build_output_types()?;

        let (root_query, root_mutation) = self.resolve_roots()?;
        self.build_operations(root_query, root_mutation)?;

        let schema = Schema {
            models: self.models,
            enums: self.enums,
            input_types: self.input_types,
            output_types: self.output_types,
            operations: self.operations,
            root_query,
            root_mutation,
            operations_by_model: self.operations_by_model,
        };

        schema.verify()?;

        tracing::debug!(
            models = schema.models.len(),
            enums = schema.enums.len(),
            input_types = schema.input_types.len(),
            output_types = schema.output_types.len(),
            operations = schema.operations.len(),
            "schema loaded"
        );

        Ok(schema)
    }

    fn intern_enums(&mut self) -> Result<()> {
        let manifest = self.manifest;

        // The data model and the type schema may both declare an enum; the
        // declarations must agree.
        for def in manifest
            .datamodel
            .enums
            .iter()
            .chain(&manifest.schema.enum_types)
        {
            let values: Vec<String> = def.value_names().map(str::to_string).collect();

            if let Some(existing) = self.enums.get(&def.name) {
                if existing.values == values {
                    continue;
                }

                return Err(Error::invalid_schema(format!(
                    "enum `{}` is declared twice with different values",
                    def.name
                )));
            }

            let id = EnumId(self.enums.len());
            self.enums.insert(
                def.name.clone(),
                Enum {
                    id,
                    name: def.name.clone(),
                    values,
                },
            );
        }

        Ok(())
    }

    fn intern_models(&mut self) -> Result<()> {
        let manifest = self.manifest;

        for def in &manifest.datamodel.models {
            if self.models.contains_key(&def.name) {
                return Err(Error::invalid_schema(format!(
                    "model `{}` is declared more than once",
                    def.name
                )));
            }

            let id = ModelId(self.models.len());
            self.models.insert(
                def.name.clone(),
                Model {
                    id,
                    name: def.name.clone(),
                    fields: IndexMap::new(),
                    primary_key: vec![],
                    unique_keys: vec![],
                },
            );
        }

        Ok(())
    }

    fn intern_type_names(&mut self) -> Result<()> {
        let manifest = self.manifest;

        for def in &manifest.schema.input_object_types {
            if self.input_types.contains_key(&def.name) {
                return Err(Error::invalid_schema(format!(
                    "input type `{}` is declared more than once",
                    def.name
                )));
            }

            let id = InputTypeId(self.input_types.len());
            self.input_types.insert(
                def.name.clone(),
                InputType {
                    id,
                    name: def.name.clone(),
                    fields: IndexMap::new(),
                    constraints: FieldCount::default(),
                },
            );
        }

        for def in &manifest.schema.output_object_types {
            if self.output_types.contains_key(&def.name) {
                return Err(Error::invalid_schema(format!(
                    "output type `{}` is declared more than once",
                    def.name
                )));
            }

            let id = OutputTypeId(self.output_types.len());
            self.output_types.insert(
                def.name.clone(),
                OutputType {
                    id,
                    name: def.name.clone(),
                    fields: IndexMap::new(),
                },
            );
        }

        Ok(())
    }

    fn build_model_fields(&mut self) -> Result<()> {
        let manifest = self.manifest;

        for (model_index, def) in manifest.datamodel.models.iter().enumerate() {
            let model_id = ModelId(model_index);
            let mut fields = IndexMap::with_capacity(def.fields.len());

            for (index, field_def) in def.fields.iter().enumerate() {
                let field = Field {
                    id: model_id.field(index),
                    name: field_def.name.clone(),
                    ty: self.field_ty(&def.name, field_def)?,
                    list: field_def.is_list,
                    required: field_def.is_required,
                    primary_key: field_def.is_id,
                    unique: field_def.is_unique,
                    has_default: field_def.has_default_value || field_def.default.is_some(),
                };

                if fields.insert(field_def.name.clone(), field).is_some() {
                    return Err(Error::invalid_schema(format!(
                        "field `{}.{}` is declared more than once",
                        def.name, field_def.name
                    )));
                }
            }

            let primary_key = if def.id_fields.is_empty() {
                fields
                    .values()
                    .filter(|field| field.primary_key)
                    .map(|field| field.id)
                    .collect()
            } else {
                key_fields(&def.name, &fields, &def.id_fields)?
            };

            let mut unique_keys: Vec<Vec<FieldId>> = fields
                .values()
                .filter(|field| field.unique)
                .map(|field| vec![field.id])
                .collect();

            for names in &def.unique_fields {
                unique_keys.push(key_fields(&def.name, &fields, names)?);
            }

            let model = &mut self.models[model_index];
            model.fields = fields;
            model.primary_key = primary_key;
            model.unique_keys = unique_keys;
        }

        Ok(())
    }

    fn field_ty(&self, model: &str, def: &FieldDef) -> Result<FieldTy> {
        match def.kind {
            FieldKindDef::Scalar => ScalarKind::from_name(&def.ty)
                .map(FieldTy::Scalar)
                .ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "field `{model}.{}` has unknown scalar type `{}`",
                        def.name, def.ty
                    ))
                }),
            FieldKindDef::Enum => match self.enums.get(&def.ty) {
                Some(e) => Ok(FieldTy::Enum(e.id)),
                None => Err(Error::invalid_schema(format!(
                    "field `{model}.{}` references enum `{}`, which is not declared",
                    def.name, def.ty
                ))),
            },
            FieldKindDef::Object => {
                let Some(target) = self.models.get(&def.ty) else {
                    return Err(Error::invalid_schema(format!(
                        "field `{model}.{}` references model `{}`, which is not declared",
                        def.name, def.ty
                    )));
                };

                let Some(name) = &def.relation_name else {
                    return Err(Error::invalid_schema(format!(
                        "relation field `{model}.{}` has no relation name",
                        def.name
                    )));
                };

                // Pair and kind are filled in by `link_relations`.
                Ok(FieldTy::Relation(Relation {
                    name: name.clone(),
                    target: target.id,
                    pair: FieldId::placeholder(),
                    kind: RelationKind::BackReference,
                }))
            }
        }
    }

    /// Go through all relations and link them to their pairs
    fn link_relations(&mut self) -> Result<()> {
        // Relation fields are grouped by name and by the unordered pair of
        // models they connect. A well-formed group has exactly two fields;
        // for self relations both live on the same model.
        let mut groups: IndexMap<(String, ModelId, ModelId), Vec<FieldId>> = IndexMap::new();

        for model in self.models.values() {
            for field in model.fields.values() {
                let Some(relation) = field.relation() else {
                    continue;
                };

                let (a, b) = if model.id <= relation.target {
                    (model.id, relation.target)
                } else {
                    (relation.target, model.id)
                };

                groups
                    .entry((relation.name.clone(), a, b))
                    .or_default()
                    .push(field.id);
            }
        }

        for ((name, ..), fields) in groups {
            match fields[..] {
                [a, b] => self.link_pair(&name, a, b)?,
                [field] => {
                    let relation = self.field(field).ty.expect_relation();
                    return Err(Error::invalid_schema(format!(
                        "field `{}` has no matching relation field on `{}`",
                        self.full_name(field),
                        self.models[relation.target.0].name,
                    )));
                }
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "relation `{name}` is declared by more than two fields"
                    )));
                }
            }
        }

        Ok(())
    }

    fn link_pair(&mut self, name: &str, a: FieldId, b: FieldId) -> Result<()> {
        let a_def = self.field_def(a);
        let b_def = self.field_def(b);

        for (id, def) in [(a, a_def), (b, b_def)] {
            if def.relation_from_fields.len() != def.relation_to_fields.len() {
                return Err(Error::invalid_schema(format!(
                    "relation field `{}` lists {} `relationFromFields` but {} `relationToFields`",
                    self.full_name(id),
                    def.relation_from_fields.len(),
                    def.relation_to_fields.len(),
                )));
            }
        }

        let (a_kind, b_kind) = match (
            a_def.relation_from_fields.is_empty(),
            b_def.relation_from_fields.is_empty(),
        ) {
            (false, false) => {
                return Err(Error::invalid_schema(format!(
                    "both sides of relation `{name}` declare foreign key fields (`{}` and `{}`)",
                    self.full_name(a),
                    self.full_name(b),
                )));
            }
            (false, true) => (
                RelationKind::Owning(self.foreign_key(a, b)?),
                RelationKind::BackReference,
            ),
            (true, false) => (
                RelationKind::BackReference,
                RelationKind::Owning(self.foreign_key(b, a)?),
            ),
            (true, true) => (RelationKind::Join, RelationKind::Join),
        };

        self.set_relation(a, b, a_kind);
        self.set_relation(b, a, b_kind);

        Ok(())
    }

    fn foreign_key(&self, owner: FieldId, pair: FieldId) -> Result<ForeignKey> {
        let def = self.field_def(owner);
        let source = &self.models[owner.model.0];
        let target = &self.models[pair.model.0];

        let fields = def
            .relation_from_fields
            .iter()
            .zip(&def.relation_to_fields)
            .map(|(from, to)| {
                Ok(ForeignKeyField {
                    source: self.key_field(owner, source, from)?,
                    target: self.key_field(owner, target, to)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ForeignKey { fields })
    }

    fn key_field(&self, relation: FieldId, model: &Model, name: &str) -> Result<FieldId> {
        let Some(field) = model.fields.get(name) else {
            return Err(Error::invalid_schema(format!(
                "relation field `{}` names `{name}`, which is not a field of `{}`",
                self.full_name(relation),
                model.name,
            )));
        };

        if field.ty.as_scalar().is_none() {
            return Err(Error::invalid_schema(format!(
                "relation field `{}` names `{}.{name}`, which is not a scalar field",
                self.full_name(relation),
                model.name,
            )));
        }

        Ok(field.id)
    }

    fn set_relation(&mut self, id: FieldId, pair: FieldId, kind: RelationKind) {
        let relation = self.models[id.model.0].fields[id.index]
            .ty
            .expect_relation_mut();
        relation.pair = pair;
        relation.kind = kind;
    }

    fn build_input_types(&mut self) -> Result<()> {
        let manifest = self.manifest;

        for def in &manifest.schema.input_object_types {
            let fields = self.input_fields(&def.name, &def.fields)?;
            let constraints = FieldCount {
                min: def.constraints.min_num_fields,
                max: def.constraints.max_num_fields,
            };

            if let FieldCount {
                min: Some(min),
                max: Some(max),
            } = constraints
            {
                if min > max {
                    return Err(Error::invalid_schema(format!(
                        "input type `{}` requires at least {min} and at most {max} fields",
                        def.name
                    )));
                }
            }

            let ty = &mut self.input_types[&def.name];
            ty.fields = fields;
            ty.constraints = constraints;
        }

        Ok(())
    }

    fn input_fields(
        &self,
        owner: &str,
        defs: &[InputFieldDef],
    ) -> Result<IndexMap<String, InputField>> {
        let mut fields = IndexMap::with_capacity(defs.len());

        for def in defs {
            let mut alternatives = def
                .input_types
                .iter()
                .map(|ty| self.alternative(owner, &def.name, ty))
                .collect::<Result<Vec<_>>>()?;

            if alternatives.is_empty() {
                return Err(Error::invalid_schema(format!(
                    "input field `{owner}.{}` declares no types",
                    def.name
                )));
            }

            if def.is_nullable && !alternatives.iter().any(Alternative::is_null) {
                alternatives.push(Alternative {
                    ty: InputTy::Null,
                    list: false,
                });
            }

            let field = InputField {
                name: def.name.clone(),
                required: def.is_required,
                alternatives,
            };

            if fields.insert(def.name.clone(), field).is_some() {
                return Err(Error::invalid_schema(format!(
                    "input field `{owner}.{}` is declared more than once",
                    def.name
                )));
            }
        }

        Ok(fields)
    }

    fn alternative(&self, owner: &str, field: &str, ty: &TypeRefDef) -> Result<Alternative> {
        let unknown = |what: &str| {
            Error::invalid_schema(format!(
                "input field `{owner}.{field}` references {what} `{}`, which is not declared",
                ty.ty
            ))
        };

        let resolved = match ty.location {
            Location::Null => InputTy::Null,
            Location::Scalar if ty.ty == "Null" => InputTy::Null,
            Location::Scalar => {
                InputTy::Scalar(ScalarKind::from_name(&ty.ty).ok_or_else(|| unknown("scalar"))?)
            }
            Location::EnumTypes => {
                InputTy::Enum(self.enums.get(&ty.ty).ok_or_else(|| unknown("enum"))?.id)
            }
            Location::InputObjectTypes => InputTy::Object(
                self.input_types
                    .get(&ty.ty)
                    .ok_or_else(|| unknown("input type"))?
                    .id,
            ),
            Location::OutputObjectTypes => {
                return Err(Error::invalid_schema(format!(
                    "input field `{owner}.{field}` references output type `{}`",
                    ty.ty
                )));
            }
        };

        Ok(Alternative {
            ty: resolved,
            list: ty.is_list,
        })
    }

    fn build_output_types(&mut self) -> Result<()> {
        let manifest = self.manifest;

        for def in &manifest.schema.output_object_types {
            let mut fields = IndexMap::with_capacity(def.fields.len());

            for field_def in &def.fields {
                let owner = format!("{}.{}", def.name, field_def.name);
                let ty = &field_def.output_type;

                let unknown = |what: &str| {
                    Error::invalid_schema(format!(
                        "output field `{owner}` references {what} `{}`, which is not declared",
                        ty.ty
                    ))
                };

                let resolved = match ty.location {
                    Location::Scalar => OutputTy::Scalar(
                        ScalarKind::from_name(&ty.ty).ok_or_else(|| unknown("scalar"))?,
                    ),
                    Location::EnumTypes => {
                        OutputTy::Enum(self.enums.get(&ty.ty).ok_or_else(|| unknown("enum"))?.id)
                    }
                    Location::OutputObjectTypes => OutputTy::Object(
                        self.output_types
                            .get(&ty.ty)
                            .ok_or_else(|| unknown("output type"))?
                            .id,
                    ),
                    Location::InputObjectTypes | Location::Null => {
                        return Err(Error::invalid_schema(format!(
                            "output field `{owner}` must reference a scalar, enum, or output type"
                        )));
                    }
                };

                let field = OutputField {
                    name: field_def.name.clone(),
                    ty: resolved,
                    list: ty.is_list,
                    required: field_def.is_required,
                    nullable: field_def.is_nullable,
                    args: self.input_fields(&owner, &field_def.args)?,
                };

                if fields.insert(field_def.name.clone(), field).is_some() {
                    return Err(Error::invalid_schema(format!(
                        "output field `{owner}` is declared more than once"
                    )));
                }
            }

            self.output_types[&def.name].fields = fields;
        }

        Ok(())
    }

    fn resolve_roots(&self) -> Result<(OutputTypeId, Option<OutputTypeId>)> {
        let schema = &self.manifest.schema;

        let Some(query) = self.output_types.get(&schema.root_query_type) else {
            return Err(Error::invalid_schema(format!(
                "root query type `{}` is not declared",
                schema.root_query_type
            )));
        };

        let mutation = self
            .output_types
            .get(&schema.root_mutation_type)
            .map(|ty| ty.id);

        Ok((query.id, mutation))
    }

    fn build_operations(
        &mut self,
        root_query: OutputTypeId,
        root_mutation: Option<OutputTypeId>,
    ) -> Result<()> {
        let manifest = self.manifest;

        for mapping in &manifest.mappings.model_operations {
            let Some(model) = self.models.get(&mapping.model).map(|model| model.id) else {
                return Err(Error::invalid_schema(format!(
                    "operation mapping names model `{}`, which is not declared",
                    mapping.model
                )));
            };

            for (kind, name) in mapping.actions() {
                if self.operations_by_model.contains_key(&(model, kind)) {
                    return Err(Error::invalid_schema(format!(
                        "model `{}` maps `{kind}` more than once",
                        mapping.model
                    )));
                }

                if self.operations.contains_key(name) {
                    return Err(Error::invalid_schema(format!(
                        "root field `{name}` is mapped more than once"
                    )));
                }

                let (root_id, root_name) = match kind.root() {
                    RootKind::Query => (Some(root_query), &manifest.schema.root_query_type),
                    RootKind::Mutation => (root_mutation, &manifest.schema.root_mutation_type),
                };

                let Some(field) = root_id.and_then(|id| self.output_types[id.0].fields.get(name))
                else {
                    return Err(Error::invalid_schema(format!(
                        "operation `{name}` mapped as `{}.{kind}` is not a field of `{root_name}`",
                        mapping.model
                    )));
                };

                let id = OperationId(self.operations.len());
                let operation = Operation {
                    id,
                    name: name.to_string(),
                    kind,
                    model,
                    root: kind.root(),
                    field: field.clone(),
                };

                self.operations.insert(name.to_string(), operation);
                self.operations_by_model.insert((model, kind), id);
            }
        }

        Ok(())
    }

    fn field(&self, id: FieldId) -> &Field {
        &self.models[id.model.0].fields[id.index]
    }

    fn field_def(&self, id: FieldId) -> &'a FieldDef {
        &self.manifest.datamodel.models[id.model.0].fields[id.index]
    }

    fn full_name(&self, id: FieldId) -> String {
        format!("{}.{}", self.models[id.model.0].name, self.field(id).name)
    }
}

fn key_fields(model: &str, fields: &IndexMap<String, Field>, names: &[String]) -> Result<Vec<FieldId>> {
    names
        .iter()
        .map(|name| match fields.get(name) {
            Some(field) if !field.is_relation() => Ok(field.id),
            Some(_) => Err(Error::invalid_schema(format!(
                "key of model `{model}` names relation field `{name}`"
            ))),
            None => Err(Error::invalid_schema(format!(
                "key of model `{model}` names `{name}`, which is not a field"
            ))),
        })
        .collect()
}
