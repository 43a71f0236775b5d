use super::{scalar, Cx};
use crate::document::{QueryDocument, Selection};

use quarry_core::schema::{OutputField, OutputTy, OutputType};
use quarry_core::{Error, Path, Record, Result, Value};

use serde_json::Value as Json;
use tracing::warn;

/// Converts raw results into typed values, checking them against the
/// output types they claim to be. Any mismatch is fatal.
pub(crate) struct Materialize<'a> {
    cx: Cx<'a>,
}

impl<'a> Materialize<'a> {
    pub(crate) fn new(cx: Cx<'a>) -> Materialize<'a> {
        Materialize { cx }
    }

    /// Materializes a raw object, keeping every key it carries.
    pub(crate) fn object(&self, output: &OutputType, raw: &Json, path: &Path) -> Result<Record> {
        let Some(map) = raw.as_object() else {
            return Err(fail(
                path,
                format!(
                    "expected `{}` object, found {}",
                    output.name,
                    scalar::json_kind(raw)
                ),
            ));
        };

        let mut record = Record::with_capacity(map.len());

        for (key, raw) in map {
            let path = path.key(key);

            let Some(field) = output.field(key) else {
                return Err(fail(&path, format!("`{}` has no field `{key}`", output.name)));
            };

            record.insert(key.clone(), self.field(field, raw, &path, None)?);
        }

        Ok(record)
    }

    /// Materializes the result of a compiled document. Only the selected
    /// fields are read, and each must be present.
    pub(crate) fn document(&self, document: &QueryDocument, raw: &Json) -> Result<Value> {
        let Some(output) = self.cx.schema.output_type(&document.output_type) else {
            return Err(Error::compilation(format!(
                "document output type `{}` is not declared",
                document.output_type
            )));
        };

        let path = Path::root();

        match raw {
            Json::Null if document.nullable => Ok(Value::Null),
            Json::Null => Err(fail(
                &path,
                format!("`{}` returned null", document.operation),
            )),
            Json::Array(items) if document.list => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.selected(output, &document.selection, item, &path.index(i))
                        .map(Value::Object)
                })
                .collect::<Result<_>>()
                .map(Value::List),
            raw if document.list => Err(fail(
                &path,
                format!(
                    "`{}` returns a list, found {}",
                    document.operation,
                    scalar::json_kind(raw)
                ),
            )),
            raw => self
                .selected(output, &document.selection, raw, &path)
                .map(Value::Object),
        }
    }

    fn selected(
        &self,
        output: &OutputType,
        selection: &Selection,
        raw: &Json,
        path: &Path,
    ) -> Result<Record> {
        let Some(map) = raw.as_object() else {
            return Err(fail(
                path,
                format!(
                    "expected `{}` object, found {}",
                    output.name,
                    scalar::json_kind(raw)
                ),
            ));
        };

        let mut record = Record::with_capacity(selection.fields.len());

        for selected in &selection.fields {
            let path = path.key(&selected.name);

            let Some(field) = output.field(&selected.name) else {
                return Err(Error::compilation(format!(
                    "`{}` has no field `{}`",
                    output.name, selected.name
                )));
            };

            let Some(raw) = map.get(&selected.name) else {
                return Err(fail(&path, "selected field is missing from the result"));
            };

            let value = self.field(field, raw, &path, selected.selection.as_ref())?;
            record.insert(selected.name.clone(), value);
        }

        Ok(record)
    }

    fn field(
        &self,
        field: &OutputField,
        raw: &Json,
        path: &Path,
        selection: Option<&Selection>,
    ) -> Result<Value> {
        if raw.is_null() {
            return if field.accepts_null() {
                Ok(Value::Null)
            } else {
                Err(fail(path, format!("`{}` is not nullable", field.name)))
            };
        }

        if !field.list {
            return self.single(field, raw, path, selection);
        }

        let Some(items) = raw.as_array() else {
            return Err(fail(
                path,
                format!("expected a list, found {}", scalar::json_kind(raw)),
            ));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.single(field, item, &path.index(i), selection))
            .collect::<Result<_>>()
            .map(Value::List)
    }

    fn single(
        &self,
        field: &OutputField,
        raw: &Json,
        path: &Path,
        selection: Option<&Selection>,
    ) -> Result<Value> {
        let schema = self.cx.schema;

        match field.ty {
            OutputTy::Scalar(kind) => {
                scalar::from_json(kind, raw).map_err(|reason| fail(path, reason))
            }
            OutputTy::Enum(id) => {
                let enumeration = &schema[id];

                match raw.as_str() {
                    Some(member) if enumeration.contains(member) => {
                        Ok(Value::Enum(member.to_string()))
                    }
                    Some(member) => Err(fail(
                        path,
                        format!(
                            "`{member}` is not a member of enum `{}`",
                            enumeration.name
                        ),
                    )),
                    None => Err(fail(
                        path,
                        format!(
                            "expected enum `{}`, found {}",
                            enumeration.name,
                            scalar::json_kind(raw)
                        ),
                    )),
                }
            }
            OutputTy::Object(id) => {
                let output = &schema[id];

                match selection {
                    Some(selection) => self.selected(output, selection, raw, path),
                    None => self.object(output, raw, path),
                }
                .map(Value::Object)
            }
        }
    }
}

fn fail(path: &Path, message: impl Into<String>) -> Error {
    let message = message.into();
    warn!(%path, %message, "result does not match its output type");

    if path.is_root() {
        Error::materialization(message)
    } else {
        Error::materialization(format!("`{path}`: {message}"))
    }
}
