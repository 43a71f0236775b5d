mod builder;
pub use builder::Builder;

use crate::document::{QueryDocument, RelationOp, Selection};
use crate::engine::aggregate::{self, AggregatePlan};
use crate::engine::compile::{check_selection, compile, relation_errors};
use crate::engine::materialize::Materialize;
use crate::engine::relation::Resolve;
use crate::engine::selection::Select;
use crate::engine::validate::{Shape, Validate};
use crate::engine::Cx;
use crate::Config;

use quarry_core::schema::{OperationKind, OutputType};
use quarry_core::{bail, Error, Path, Record, Result, Schema, ValidationErrors, Value};

use serde_json::{Map, Value as Json};
use std::sync::Arc;

/// Validates requests against a loaded schema and compiles them into
/// [`QueryDocument`]s.
///
/// A `Compiler` never changes after it is built. Clones share the schema, so
/// one compiler can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Compiler {
    schema: Arc<Schema>,
    config: Config,
}

impl Compiler {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Creates a compiler with the default configuration.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Compiler {
        Builder::default().build(schema)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn cx(&self) -> Cx<'_> {
        Cx {
            schema: &self.schema,
            config: &self.config,
        }
    }

    /// Validates a raw argument tree against the named input type.
    pub fn validate(&self, input_type: &str, raw: &Json) -> Result<Value> {
        let Some(ty) = self.schema.input_type(input_type) else {
            bail!("input type `{input_type}` is not declared");
        };

        Validate::new(self.cx())
            .object(Shape::from(ty), raw, &Path::root())
            .map(Value::Object)
            .map_err(Error::validation)
    }

    /// Resolves the operations written under a relation field, e.g. the
    /// `author` value of a `createOnePost` payload after validation.
    pub fn resolve_relation(&self, model: &str, field: &str, value: &Value) -> Result<RelationOp> {
        let Some(model) = self.schema.model(model) else {
            bail!("model `{model}` is not declared");
        };

        let Some(field) = model.field(field) else {
            bail!("model `{}` has no field `{field}`", model.name);
        };

        let mut resolve = Resolve::new(self.cx());
        let op = resolve.relation(field, value, &Path::root())?;
        resolve.into_result()?;
        Ok(op)
    }

    /// Validates and compiles a full request for one operation.
    ///
    /// `raw` carries the operation arguments plus optional `select` or
    /// `include` keys. Aggregate and grouping operations take their function
    /// keys (`_avg`, `_count`, ...) in the same object.
    #[tracing::instrument(level = "debug", skip(self, raw))]
    pub fn request(&self, operation: &str, raw: &Json) -> Result<QueryDocument> {
        let Some(op) = self.schema.operation(operation) else {
            return Err(Error::unknown_operation(operation));
        };

        let Some(output) = op.output_type().map(|id| &self.schema[id]) else {
            return Err(Error::compilation(format!(
                "operation `{operation}` does not return an object"
            )));
        };

        let plan = match op.kind {
            OperationKind::Aggregate => Some(self.plan_aggregate(&self.schema[op.model].name, raw)?),
            OperationKind::GroupBy => Some(self.plan_group_by(&self.schema[op.model].name, raw)?),
            _ => None,
        };

        if let Some(plan) = plan {
            let document = plan.into_document();
            check_selection(self.cx(), output, &document.selection)?;
            return Ok(document);
        }

        let empty = Map::new();
        let map = match raw {
            Json::Object(map) => map,
            Json::Null => &empty,
            raw => {
                let errors = Validate::new(self.cx())
                    .object(Shape::args(&op.name, op.args()), raw, &Path::root())
                    .err()
                    .unwrap_or_default();
                return Err(Error::validation(errors));
            }
        };

        let mut errors = ValidationErrors::new();

        let args: Map<String, Json> = map
            .iter()
            .filter(|(key, _)| !matches!(&key[..], "select" | "include"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let args = Validate::new(self.cx())
            .fields(Shape::args(&op.name, op.args()), &args, &Path::root(), 0)
            .map_err(|mut nested| errors.append(&mut nested))
            .ok();

        let selection = Select::new(self.cx())
            .selection(output, map.get("select"), map.get("include"), &Path::root(), 0)
            .unwrap_or_else(|mut nested| {
                errors.append(&mut nested);
                Selection::new(&output.name)
            });

        match args {
            Some(args) if errors.is_empty() => compile(self.cx(), op, &args, selection),
            args => {
                // Relation problems in otherwise valid arguments are reported
                // with the rest.
                if let Some(args) = args {
                    errors.append(&mut relation_errors(self.cx(), op, &args)?);
                }

                Err(Error::validation(errors))
            }
        }
    }

    /// Compiles already validated arguments and a selection.
    pub fn compile(&self, operation: &str, args: &Record, selection: Selection) -> Result<QueryDocument> {
        let Some(op) = self.schema.operation(operation) else {
            return Err(Error::unknown_operation(operation));
        };

        compile(self.cx(), op, args, selection)
    }

    /// The selection used when a request names no fields.
    pub fn default_selection(&self, output_type: &str) -> Result<Selection> {
        Ok(Select::new(self.cx()).default_selection(self.output_type(output_type)?))
    }

    /// Checks an aggregate request on `model`, e.g.
    /// `{"_avg": {"views": true}, "where": {..}}`.
    pub fn plan_aggregate(&self, model: &str, raw: &Json) -> Result<AggregatePlan> {
        aggregate::plan(self.cx(), model, raw)
    }

    /// Checks a count request on `model`, e.g. `{"where": {..}}` or
    /// `{"select": {"_all": true, "title": true}}`. The plan runs through the
    /// aggregate root field; [`AggregatePlan::unpack`] returns the count.
    pub fn plan_count(&self, model: &str, raw: &Json) -> Result<AggregatePlan> {
        aggregate::plan_count(self.cx(), model, raw)
    }

    /// Checks a grouping request on `model`, e.g.
    /// `{"by": ["kind"], "_sum": {"views": true}}`.
    pub fn plan_group_by(&self, model: &str, raw: &Json) -> Result<AggregatePlan> {
        aggregate::plan_group_by(self.cx(), model, raw)
    }

    /// Converts a raw result object into a typed value.
    pub fn materialize(&self, output_type: &str, raw: &Json) -> Result<Value> {
        let output = self.output_type(output_type)?;

        Materialize::new(self.cx())
            .object(output, raw, &Path::root())
            .map(Value::Object)
    }

    /// Converts the raw result of a compiled document into a typed value.
    pub fn materialize_document(&self, document: &QueryDocument, raw: &Json) -> Result<Value> {
        Materialize::new(self.cx()).document(document, raw)
    }

    fn output_type(&self, name: &str) -> Result<&OutputType> {
        match self.schema.output_type(name) {
            Some(output) => Ok(output),
            None => bail!("output type `{name}` is not declared"),
        }
    }
}
