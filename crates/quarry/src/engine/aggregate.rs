use super::validate::{Shape, Validate};
use super::{scalar, Cx};
use crate::document::{Args, QueryDocument, Selection, SelectionField};

use quarry_core::schema::{AggregateFunction, OperationKind, OutputType, RootKind};
use quarry_core::{
    Error, Path, Record, Result, ValidationError, ValidationErrorKind, ValidationErrors, Value,
    VariantMismatch,
};

use serde_json::{Map, Value as Json};

/// A checked aggregate request for one model.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePlan {
    /// The root field, e.g. `aggregatePost` or `groupByPost`
    pub operation: String,

    pub kind: AggregateKind,

    pub model: String,

    pub output_type: String,

    /// Validated `where`, `orderBy`, `cursor`, `take`, `skip` and `by`
    pub args: Record,

    /// Fields rows are grouped on, in request order
    pub by: Vec<String>,

    /// Requested functions, in request order
    pub selections: Vec<AggregateSelection>,

    /// `count: true` was requested; results carry a plain count
    pub count_shorthand: bool,
}

/// What an [`AggregatePlan`] was built for. It decides the root field and
/// how [`AggregatePlan::unpack`] reshapes results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// One row of aggregates over every matching record
    Aggregate,

    /// Record counts through the aggregate root field; results unpack to
    /// the count alone
    Count,

    /// One row per distinct combination of the `by` fields
    GroupBy,
}

/// The fields requested from one aggregate function.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSelection {
    pub function: AggregateFunction,

    /// Result key as the output type declares it, e.g. `_avg` or `avg`
    pub key: String,

    /// Output type describing the function's results
    pub output_type: String,

    pub fields: Vec<String>,
}

impl AggregatePlan {
    pub fn selection(&self, function: AggregateFunction) -> Option<&AggregateSelection> {
        self.selections
            .iter()
            .find(|selection| selection.function == function)
    }

    /// Expresses the plan as an ordinary query document on its root field.
    pub fn into_document(self) -> QueryDocument {
        let mut selection = Selection::new(&self.output_type);

        for field in self.by {
            selection.push(SelectionField::leaf(field));
        }

        for aggregate in self.selections {
            let mut nested = Selection::new(aggregate.output_type);
            for field in aggregate.fields {
                nested.push(SelectionField::leaf(field));
            }

            selection.push(SelectionField::nested(aggregate.key, Args::new(), nested));
        }

        let grouped = self.kind == AggregateKind::GroupBy;

        QueryDocument {
            operation: self.operation,
            kind: if grouped {
                OperationKind::GroupBy
            } else {
                OperationKind::Aggregate
            },
            root: RootKind::Query,
            model: self.model,
            output_type: self.output_type,
            list: grouped,
            nullable: false,
            args: self.args.into(),
            selection,
        }
    }

    /// Reshapes a materialized result to what was asked for. With the
    /// `count: true` shorthand, the count holds the plain number, on every
    /// row of a grouping. A count plan returns the count value alone.
    pub fn unpack(&self, mut result: Value) -> Value {
        match (self.kind, &mut result) {
            (AggregateKind::GroupBy, Value::List(rows)) => {
                for row in rows {
                    self.collapse_count(row);
                }
            }
            (_, row) => self.collapse_count(row),
        }

        if self.kind != AggregateKind::Count {
            return result;
        }

        let Some(key) = self.selection(AggregateFunction::Count).map(|s| &s.key) else {
            return Value::Null;
        };

        match result.as_record_mut().and_then(|record| record.get_mut(key)) {
            Some(count) => count.take(),
            None => Value::Null,
        }
    }

    fn collapse_count(&self, row: &mut Value) {
        if !self.count_shorthand {
            return;
        }

        let Some(key) = self.selection(AggregateFunction::Count).map(|s| &s.key) else {
            return;
        };

        if let Some(count) = row.as_record_mut().and_then(|record| record.get_mut(key)) {
            let all = count
                .as_record_mut()
                .and_then(|counts| counts.get_mut("_all"))
                .map(Value::take);

            if let Some(all) = all {
                *count = all;
            }
        }
    }
}

impl AggregateSelection {
    fn push(&mut self, field: &str) {
        if !self.fields.iter().any(|existing| existing == field) {
            self.fields.push(field.to_string());
        }
    }
}

/// One requested function: where it was written, and its raw value.
struct Request<'r> {
    path: Path,
    function: AggregateFunction,
    value: &'r Json,
}

/// Checks an aggregate request for `model` against the aggregate output
/// types. Membership in a function's output type decides which fields it
/// accepts.
pub(crate) fn plan(cx: Cx<'_>, model: &str, raw: &Json) -> Result<AggregatePlan> {
    let map = object(raw)?;
    let (requests, rest) = split(map);
    build(cx, model, AggregateKind::Aggregate, requests, rest)
}

/// Checks a count request: the usual filter arguments plus an optional
/// `select` naming the fields to count.
pub(crate) fn plan_count(cx: Cx<'_>, model: &str, raw: &Json) -> Result<AggregatePlan> {
    let map = object(raw)?;

    let all = Json::Bool(true);
    let request = Request {
        path: Path::root().key("select"),
        function: AggregateFunction::Count,
        value: match map.get("select") {
            Some(select @ Json::Object(_)) => select,
            _ => &all,
        },
    };

    let rest = map
        .iter()
        .filter(|(key, _)| *key != "select")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    build(cx, model, AggregateKind::Count, vec![request], rest)
}

/// Checks a grouping request. The `by` fields are selected on every row
/// next to the requested aggregates.
pub(crate) fn plan_group_by(cx: Cx<'_>, model: &str, raw: &Json) -> Result<AggregatePlan> {
    let map = object(raw)?;
    let (requests, rest) = split(map);
    build(cx, model, AggregateKind::GroupBy, requests, rest)
}

fn object(raw: &Json) -> Result<&Map<String, Json>> {
    match raw {
        Json::Object(map) => Ok(map),
        raw => Err(Error::validation(mismatch(
            &Path::root(),
            "Object",
            format!("expected Object, found {}", scalar::json_kind(raw)),
        ))),
    }
}

/// Separates aggregate function keys from operation arguments.
fn split(map: &Map<String, Json>) -> (Vec<Request<'_>>, Map<String, Json>) {
    let mut requests = vec![];
    let mut rest = Map::new();

    for (key, value) in map {
        match AggregateFunction::from_key(key) {
            Some(function) => requests.push(Request {
                path: Path::root().key(key),
                function,
                value,
            }),
            None => {
                rest.insert(key.clone(), value.clone());
            }
        }
    }

    (requests, rest)
}

fn build(
    cx: Cx<'_>,
    model: &str,
    kind: AggregateKind,
    requests: Vec<Request<'_>>,
    rest: Map<String, Json>,
) -> Result<AggregatePlan> {
    let schema = cx.schema;

    let operation_kind = match kind {
        AggregateKind::Aggregate | AggregateKind::Count => OperationKind::Aggregate,
        AggregateKind::GroupBy => OperationKind::GroupBy,
    };

    let Some(model) = schema.model(model) else {
        return Err(Error::unknown_operation(format!("{operation_kind} for model `{model}`")));
    };

    let Some(operation) = schema.operation_for(model.id, operation_kind) else {
        return Err(Error::unknown_operation(format!(
            "{operation_kind} for model `{}`",
            model.name
        )));
    };

    let Some(output) = operation.output_type().map(|id| &schema[id]) else {
        return Err(Error::compilation(format!(
            "operation `{}` does not return an object",
            operation.name
        )));
    };

    let mut errors = ValidationErrors::new();
    let mut selections: Vec<AggregateSelection> = vec![];
    let mut shorthand = false;

    for Request { path, function, value } in requests {
        let declared = output.aggregate_field(function).and_then(|field| {
            let descriptor = &schema[field.as_object()?];
            Some((&field.name, descriptor))
        });

        let Some((key, descriptor)) = declared else {
            let name = path.last_key().unwrap_or(function.key());
            errors.push(unknown_field(cx, name, output, &path));
            continue;
        };

        let mut requested = vec![];

        match value {
            Json::Bool(false) => {}
            Json::Bool(true) if function == AggregateFunction::Count => {
                shorthand = true;
                requested.push("_all");
            }
            Json::Object(fields) => {
                for (name, flag) in fields {
                    let path = path.key(name);

                    match flag {
                        Json::Bool(false) => continue,
                        Json::Bool(true) => {}
                        flag => {
                            errors.push(mismatch(
                                &path,
                                "Boolean",
                                format!("expected Boolean, found {}", scalar::json_kind(flag)),
                            ));
                            continue;
                        }
                    }

                    if descriptor.field(name).is_some() {
                        requested.push(&name[..]);
                    } else if function == AggregateFunction::Count || model.field(name).is_none() {
                        errors.push(unknown_field(cx, name, descriptor, &path));
                    } else {
                        errors.push(ValidationError::new(
                            path,
                            ValidationErrorKind::FieldNotAggregable {
                                function: function.name().to_string(),
                                field: name.clone(),
                                model: model.name.clone(),
                            },
                        ));
                    }
                }
            }
            value => {
                let expected = if function == AggregateFunction::Count {
                    "Boolean or Object"
                } else {
                    "Object"
                };

                errors.push(mismatch(
                    &path,
                    &descriptor.name,
                    format!("expected {expected}, found {}", scalar::json_kind(value)),
                ));
            }
        }

        if requested.is_empty() {
            continue;
        }

        let index = match selections.iter().position(|s| s.function == function) {
            Some(index) => index,
            None => {
                selections.push(AggregateSelection {
                    function,
                    key: key.clone(),
                    output_type: descriptor.name.clone(),
                    fields: vec![],
                });
                selections.len() - 1
            }
        };

        for name in requested {
            selections[index].push(name);
        }
    }

    let args = Validate::new(cx)
        .fields(Shape::args(&operation.name, operation.args()), &rest, &Path::root(), 0)
        .unwrap_or_else(|mut nested| {
            errors.append(&mut nested);
            Record::new()
        });

    let by: Vec<&str> = match args.get("by") {
        Some(Value::List(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(value) => value.as_str().into_iter().collect(),
        None => vec![],
    };

    let mut grouped: Vec<String> = vec![];
    for name in by {
        if !grouped.iter().any(|existing| existing == name) {
            grouped.push(name.to_string());
        }
    }

    if kind == AggregateKind::GroupBy && grouped.is_empty() && args.contains_key("by") {
        errors.push(ValidationError::new(
            Path::root().key("by"),
            ValidationErrorKind::TooFewFields {
                type_name: operation.name.clone(),
                min: 1,
                present: 0,
            },
        ));
    }

    if selections.is_empty() && grouped.is_empty() && errors.is_empty() {
        errors.push(ValidationError::new(
            Path::root(),
            ValidationErrorKind::EmptySelection {
                type_name: output.name.clone(),
            },
        ));
    }

    errors.into_result()?;

    // An explicit field list keeps the count object even when `count: true`
    // was also given.
    let count_shorthand = shorthand
        && selections
            .iter()
            .any(|s| s.function == AggregateFunction::Count && s.fields == ["_all"]);

    Ok(AggregatePlan {
        operation: operation.name.clone(),
        kind,
        model: model.name.clone(),
        output_type: output.name.clone(),
        args,
        by: grouped,
        selections,
        count_shorthand,
    })
}

fn unknown_field(cx: Cx<'_>, name: &str, ty: &OutputType, path: &Path) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ValidationErrorKind::UnknownField {
            name: name.to_string(),
            type_name: ty.name.clone(),
            suggestion: cx.suggest(name, ty.fields.keys().map(String::as_str)),
        },
    )
}

fn mismatch(path: &Path, alternative: &str, reason: String) -> ValidationError {
    ValidationError::new(
        path.clone(),
        ValidationErrorKind::NoMatchingUnionVariant {
            attempts: vec![VariantMismatch {
                alternative: alternative.to_string(),
                reasons: vec![reason],
            }],
        },
    )
}
