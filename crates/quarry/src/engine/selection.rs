use super::validate::{Shape, Validate};
use super::{scalar, Cx};
use crate::document::{Args, Selection, SelectionField};

use quarry_core::schema::{OutputField, OutputTy, OutputType};
use quarry_core::{Path, ValidationError, ValidationErrorKind, ValidationErrors, VariantMismatch};

use serde_json::{Map, Value as Json};

/// Builds selections from the `select` and `include` arguments.
pub(crate) struct Select<'a> {
    cx: Cx<'a>,
}

impl<'a> Select<'a> {
    pub(crate) fn new(cx: Cx<'a>) -> Select<'a> {
        Select { cx }
    }

    /// Picks the fields of `output` named by `select` or `include`, or the
    /// default selection when neither is given. `path` locates the object
    /// both keys were read from.
    pub(crate) fn selection(
        &self,
        output: &OutputType,
        select: Option<&Json>,
        include: Option<&Json>,
        path: &Path,
        depth: usize,
    ) -> Result<Selection, ValidationErrors> {
        let select = select.filter(|raw| !raw.is_null());
        let include = include.filter(|raw| !raw.is_null());

        match (select, include) {
            (Some(_), Some(_)) => Err(ValidationError::new(
                path.clone(),
                ValidationErrorKind::IncludeAndSelect {
                    type_name: output.name.clone(),
                },
            )
            .into()),
            (Some(select), None) => self.select(output, select, &path.key("select"), depth),
            (None, Some(include)) => self.include(output, include, &path.key("include"), depth),
            (None, None) => Ok(self.default_selection(output)),
        }
    }

    /// Every scalar field, plus enum fields unless configured otherwise.
    pub(crate) fn default_selection(&self, output: &OutputType) -> Selection {
        let mut selection = Selection::new(&output.name);

        for field in output.fields.values() {
            let selected = match field.ty {
                OutputTy::Scalar(_) => true,
                OutputTy::Enum(_) => self.cx.config.default_selection_includes_enums,
                OutputTy::Object(_) => false,
            };

            if selected {
                selection.push(SelectionField::leaf(&field.name));
            }
        }

        selection
    }

    fn select(
        &self,
        output: &OutputType,
        raw: &Json,
        path: &Path,
        depth: usize,
    ) -> Result<Selection, ValidationErrors> {
        let map = expect_object(raw, path)?;

        if map.is_empty() {
            return Err(ValidationError::new(
                path.clone(),
                ValidationErrorKind::EmptySelection {
                    type_name: output.name.clone(),
                },
            )
            .into());
        }

        let mut selection = Selection::new(&output.name);
        let mut errors = ValidationErrors::new();

        for (key, value) in map {
            let Some(field) = self.known_field(output, key, path, &mut errors) else {
                continue;
            };

            match self.entry(output, field, value, &path.key(key), depth) {
                Ok(Some(selected)) => selection.push(selected),
                Ok(None) => {}
                Err(mut nested) => errors.append(&mut nested),
            }
        }

        if selection.is_empty() && errors.is_empty() {
            errors.push(ValidationError::new(
                path.clone(),
                ValidationErrorKind::NoTruthySelection {
                    type_name: output.name.clone(),
                },
            ));
        }

        if errors.is_empty() {
            Ok(selection)
        } else {
            Err(errors)
        }
    }

    fn include(
        &self,
        output: &OutputType,
        raw: &Json,
        path: &Path,
        depth: usize,
    ) -> Result<Selection, ValidationErrors> {
        let map = expect_object(raw, path)?;

        let mut selection = self.default_selection(output);
        let mut errors = ValidationErrors::new();

        for (key, value) in map {
            let Some(field) = self.known_field(output, key, path, &mut errors) else {
                continue;
            };

            if !field.is_object() {
                errors.push(ValidationError::new(
                    path.key(key),
                    ValidationErrorKind::IncludeScalarField {
                        name: key.clone(),
                        type_name: output.name.clone(),
                    },
                ));
                continue;
            }

            match self.entry(output, field, value, &path.key(key), depth) {
                Ok(Some(selected)) => selection.push(selected),
                Ok(None) => {}
                Err(mut nested) => errors.append(&mut nested),
            }
        }

        if errors.is_empty() {
            Ok(selection)
        } else {
            Err(errors)
        }
    }

    fn known_field<'o>(
        &self,
        output: &'o OutputType,
        key: &str,
        path: &Path,
        errors: &mut ValidationErrors,
    ) -> Option<&'o OutputField> {
        let field = output.field(key);

        if field.is_none() {
            errors.push(ValidationError::new(
                path.key(key),
                ValidationErrorKind::UnknownField {
                    name: key.to_string(),
                    type_name: output.name.clone(),
                    suggestion: self
                        .cx
                        .suggest(key, output.fields.keys().map(String::as_str)),
                },
            ));
        }

        field
    }

    /// One `field: true | false | {..}` entry. `Ok(None)` means the field
    /// was switched off.
    fn entry(
        &self,
        output: &OutputType,
        field: &OutputField,
        value: &Json,
        path: &Path,
        depth: usize,
    ) -> Result<Option<SelectionField>, ValidationErrors> {
        match value {
            Json::Bool(false) => Ok(None),
            Json::Bool(true) => self.field(output, field, None, path, depth).map(Some),
            Json::Object(args) if field.is_object() => {
                self.field(output, field, Some(args), path, depth).map(Some)
            }
            value => {
                let mut attempts = vec![VariantMismatch {
                    alternative: "Boolean".to_string(),
                    reasons: vec![format!("expected Boolean, found {}", scalar::json_kind(value))],
                }];

                if value.is_object() {
                    attempts.push(VariantMismatch {
                        alternative: "Object".to_string(),
                        reasons: vec![format!("`{}` is not a relation", field.name)],
                    });
                }

                Err(ValidationError::new(
                    path.clone(),
                    ValidationErrorKind::NoMatchingUnionVariant { attempts },
                )
                .into())
            }
        }
    }

    fn field(
        &self,
        output: &OutputType,
        field: &OutputField,
        args: Option<&Map<String, Json>>,
        path: &Path,
        depth: usize,
    ) -> Result<SelectionField, ValidationErrors> {
        let Some(target) = field.as_object() else {
            return Ok(SelectionField::leaf(&field.name));
        };

        if depth >= self.cx.config.max_depth {
            return Err(ValidationError::new(
                path.clone(),
                ValidationErrorKind::DepthLimitExceeded {
                    limit: self.cx.config.max_depth,
                },
            )
            .into());
        }

        let target = &self.cx.schema[target];

        let Some(args) = args else {
            return Ok(SelectionField::nested(
                &field.name,
                Args::new(),
                self.default_selection(target),
            ));
        };

        let mut errors = ValidationErrors::new();

        let rest: Map<String, Json> = args
            .iter()
            .filter(|(key, _)| !matches!(&key[..], "select" | "include"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let name = format!("{}.{}", output.name, field.name);
        let validated = Validate::new(self.cx)
            .fields(Shape::args(&name, &field.args), &rest, path, depth)
            .unwrap_or_else(|mut nested| {
                errors.append(&mut nested);
                Default::default()
            });

        let selection = self
            .selection(target, args.get("select"), args.get("include"), path, depth + 1)
            .unwrap_or_else(|mut nested| {
                errors.append(&mut nested);
                Selection::new(&target.name)
            });

        if errors.is_empty() {
            Ok(SelectionField::nested(&field.name, validated.into(), selection))
        } else {
            Err(errors)
        }
    }
}

fn expect_object<'j>(raw: &'j Json, path: &Path) -> Result<&'j Map<String, Json>, ValidationErrors> {
    raw.as_object().ok_or_else(|| {
        ValidationError::new(
            path.clone(),
            ValidationErrorKind::NoMatchingUnionVariant {
                attempts: vec![VariantMismatch {
                    alternative: "Object".to_string(),
                    reasons: vec![format!("expected Object, found {}", scalar::json_kind(raw))],
                }],
            },
        )
        .into()
    })
}
