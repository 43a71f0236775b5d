use super::{scalar, Cx};

use quarry_core::schema::{Alternative, FieldCount, InputField, InputTy, InputType};
use quarry_core::{Path, Record, ValidationError, ValidationErrorKind, ValidationErrors, Value, VariantMismatch};

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use tracing::trace;

/// The fields an object is checked against: a named input type, or the
/// argument list of an operation or relation field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Shape<'a> {
    pub(crate) name: &'a str,
    pub(crate) fields: &'a IndexMap<String, InputField>,
    pub(crate) constraints: FieldCount,
}

/// Checks raw argument trees against input shapes, producing normalized
/// values. Problems are collected over the whole tree.
pub(crate) struct Validate<'a> {
    cx: Cx<'a>,
}

/// Why a value did not fit one alternative.
enum Mismatch {
    /// The value has the wrong kind of shape altogether.
    Shape(String),

    /// The value has the right shape, but its contents are invalid.
    Nested(ValidationErrors),
}

impl<'a> Shape<'a> {
    pub(crate) fn args(name: &'a str, fields: &'a IndexMap<String, InputField>) -> Shape<'a> {
        Shape {
            name,
            fields,
            constraints: FieldCount::default(),
        }
    }
}

impl<'a> From<&'a InputType> for Shape<'a> {
    fn from(ty: &'a InputType) -> Shape<'a> {
        Shape {
            name: &ty.name,
            fields: &ty.fields,
            constraints: ty.constraints,
        }
    }
}

impl<'a> Validate<'a> {
    pub(crate) fn new(cx: Cx<'a>) -> Validate<'a> {
        Validate { cx }
    }

    /// Validates a raw object against `shape`.
    pub(crate) fn object(
        &self,
        shape: Shape<'_>,
        raw: &Json,
        path: &Path,
    ) -> Result<Record, ValidationErrors> {
        match raw {
            Json::Object(map) => self.fields(shape, map, path, 0),
            raw => Err(ValidationError::new(
                path.clone(),
                ValidationErrorKind::NoMatchingUnionVariant {
                    attempts: vec![VariantMismatch {
                        alternative: shape.name.to_string(),
                        reasons: vec![format!("expected Object, found {}", scalar::json_kind(raw))],
                    }],
                },
            )
            .into()),
        }
    }

    /// Validates the keys of `map`, in the order the caller wrote them.
    pub(crate) fn fields(
        &self,
        shape: Shape<'_>,
        map: &Map<String, Json>,
        path: &Path,
        depth: usize,
    ) -> Result<Record, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut record = Record::with_capacity(map.len());
        let mut present = vec![];

        for (key, raw) in map {
            let Some(field) = shape.fields.get(key) else {
                let suggestion = self
                    .cx
                    .suggest(key, shape.fields.keys().map(String::as_str));

                errors.push(ValidationError::new(
                    path.key(key),
                    ValidationErrorKind::UnknownField {
                        name: key.clone(),
                        type_name: shape.name.to_string(),
                        suggestion,
                    },
                ));
                continue;
            };

            present.push(key.clone());

            match self.field(field, raw, &path.key(key), depth) {
                Ok(value) => {
                    record.insert(key.clone(), value);
                }
                Err(mut nested) => errors.append(&mut nested),
            }
        }

        for (name, field) in shape.fields {
            if field.required && !map.contains_key(name) {
                errors.push(ValidationError::new(
                    path.key(name),
                    ValidationErrorKind::MissingRequiredField {
                        name: name.clone(),
                        type_name: shape.name.to_string(),
                    },
                ));
            }
        }

        if let Some(min) = shape.constraints.min {
            if present.len() < min {
                errors.push(ValidationError::new(
                    path.clone(),
                    ValidationErrorKind::TooFewFields {
                        type_name: shape.name.to_string(),
                        min,
                        present: present.len(),
                    },
                ));
            }
        }

        if let Some(max) = shape.constraints.max {
            if present.len() > max {
                errors.push(ValidationError::new(
                    path.clone(),
                    ValidationErrorKind::TooManyFields {
                        type_name: shape.name.to_string(),
                        max,
                        present,
                    },
                ));
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }

    fn field(
        &self,
        field: &InputField,
        raw: &Json,
        path: &Path,
        depth: usize,
    ) -> Result<Value, ValidationErrors> {
        let schema = self.cx.schema;

        if raw.is_null() {
            if field.accepts_null() {
                return Ok(Value::Null);
            }

            let attempts = field
                .non_null_alternatives()
                .map(|alt| VariantMismatch {
                    alternative: alt.describe(schema),
                    reasons: vec![format!("`{}` is not nullable", field.name)],
                })
                .collect();

            return Err(no_match(path, attempts));
        }

        let alternatives: Vec<&Alternative> = field.non_null_alternatives().collect();

        // A lone value is accepted where only a list is.
        let wrapped;
        let raw = match &alternatives[..] {
            [alt] if alt.list && !raw.is_array() => {
                wrapped = Json::Array(vec![raw.clone()]);
                &wrapped
            }
            _ => raw,
        };

        let mut attempts = vec![];
        let mut structural = vec![];

        for alt in alternatives {
            let described = alt.describe(schema);

            match self.alternative(alt, raw, path, depth) {
                Ok(value) => {
                    trace!(%path, alternative = %described, "alternative matched");
                    return Ok(value);
                }
                Err(Mismatch::Shape(reason)) => {
                    trace!(%path, alternative = %described, %reason, "alternative rejected");
                    attempts.push(VariantMismatch {
                        alternative: described,
                        reasons: vec![reason],
                    });
                }
                Err(Mismatch::Nested(errors)) => {
                    trace!(%path, alternative = %described, errors = errors.len(), "alternative rejected");
                    attempts.push(VariantMismatch {
                        alternative: described,
                        reasons: errors.iter().map(ToString::to_string).collect(),
                    });
                    structural.push(errors);
                }
            }
        }

        match structural.pop() {
            Some(errors) if structural.is_empty() => Err(errors),
            _ => Err(no_match(path, attempts)),
        }
    }

    fn alternative(
        &self,
        alt: &Alternative,
        raw: &Json,
        path: &Path,
        depth: usize,
    ) -> Result<Value, Mismatch> {
        if !alt.list {
            return self.single(alt.ty, raw, path, depth);
        }

        let Json::Array(items) = raw else {
            return Err(Mismatch::Shape(format!(
                "expected List, found {}",
                scalar::json_kind(raw)
            )));
        };

        let mut values = Vec::with_capacity(items.len());
        let mut errors = ValidationErrors::new();

        for (i, item) in items.iter().enumerate() {
            match self.single(alt.ty, item, &path.index(i), depth) {
                Ok(value) => values.push(value),
                Err(Mismatch::Shape(reason)) => {
                    return Err(Mismatch::Shape(format!("item {i}: {reason}")))
                }
                Err(Mismatch::Nested(mut nested)) => errors.append(&mut nested),
            }
        }

        if errors.is_empty() {
            Ok(Value::List(values))
        } else {
            Err(Mismatch::Nested(errors))
        }
    }

    fn single(&self, ty: InputTy, raw: &Json, path: &Path, depth: usize) -> Result<Value, Mismatch> {
        let schema = self.cx.schema;

        match ty {
            InputTy::Scalar(kind) => scalar::from_json(kind, raw).map_err(Mismatch::Shape),
            InputTy::Enum(id) => {
                let enumeration = &schema[id];

                match raw {
                    Json::String(member) if enumeration.contains(member) => {
                        Ok(Value::Enum(member.clone()))
                    }
                    Json::String(member) => Err(Mismatch::Shape(format!(
                        "`{member}` is not a member of enum `{}`",
                        enumeration.name
                    ))),
                    raw => Err(Mismatch::Shape(format!(
                        "expected enum `{}`, found {}",
                        enumeration.name,
                        scalar::json_kind(raw)
                    ))),
                }
            }
            InputTy::Object(id) => {
                let Json::Object(map) = raw else {
                    return Err(Mismatch::Shape(format!(
                        "expected Object, found {}",
                        scalar::json_kind(raw)
                    )));
                };

                if depth >= self.cx.config.max_depth {
                    return Err(Mismatch::Nested(
                        ValidationError::new(
                            path.clone(),
                            ValidationErrorKind::DepthLimitExceeded {
                                limit: self.cx.config.max_depth,
                            },
                        )
                        .into(),
                    ));
                }

                self.fields(Shape::from(&schema[id]), map, path, depth + 1)
                    .map(Value::Object)
                    .map_err(Mismatch::Nested)
            }
            InputTy::Null => Err(Mismatch::Shape(format!(
                "expected Null, found {}",
                scalar::json_kind(raw)
            ))),
        }
    }
}

fn no_match(path: &Path, attempts: Vec<VariantMismatch>) -> ValidationErrors {
    ValidationError::new(
        path.clone(),
        ValidationErrorKind::NoMatchingUnionVariant { attempts },
    )
    .into()
}
