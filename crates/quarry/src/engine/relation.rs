use super::Cx;
use crate::document::{Args, Assignment, Connect, Link, LinkField, RelationAction, RelationOp};

use quarry_core::schema::{Field, FieldId, ForeignKey, Model, Relation, RelationKind};
use quarry_core::{
    Error, Path, Record, Result, Schema, ValidationError, ValidationErrorKind, ValidationErrors,
    Value,
};

/// Keys that each pick the single row a to-one relation points at.
const TO_ONE_EXCLUSIVE: [&str; 5] = ["create", "connect", "connectOrCreate", "disconnect", "delete"];

/// Turns normalized relation inputs into [`RelationOp`]s.
///
/// Shape problems were already reported by validation, so a malformed value
/// here is a compilation error. Relation-level problems are collected and
/// returned by [`Resolve::into_result`].
pub(crate) struct Resolve<'a> {
    cx: Cx<'a>,
    errors: ValidationErrors,
}

/// Whether a payload describes a new row or changes to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Write {
    Create,
    Update,
}

impl<'a> Resolve<'a> {
    pub(crate) fn new(cx: Cx<'a>) -> Resolve<'a> {
        Resolve {
            cx,
            errors: ValidationErrors::new(),
        }
    }

    pub(crate) fn into_result(self) -> Result<()> {
        self.errors.into_result()
    }

    pub(crate) fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    /// Resolves the write payload for one row of `model`. Relation fields
    /// become nested operations; every other field passes through.
    ///
    /// `via` is the relation field the payload is nested under, if any. That
    /// relation is linked by the parent write.
    pub(crate) fn payload(
        &mut self,
        model: &Model,
        record: &Record,
        path: &Path,
        write: Write,
        via: Option<FieldId>,
    ) -> Result<Args> {
        let mut args = Args::new();

        for (name, value) in record {
            match model.field(name) {
                Some(field) if field.is_relation() => {
                    let op = self.relation(field, value, &path.key(name))?;
                    args.insert(name.clone(), op);
                }
                _ => args.insert(name.clone(), value.clone()),
            }
        }

        if write == Write::Create {
            for field in model.relation_fields() {
                if Some(field.id) == via
                    || field.list
                    || !field.required
                    || record.contains_key(&field.name)
                {
                    continue;
                }

                let Some(fk) = field.relation().and_then(Relation::foreign_key) else {
                    continue;
                };

                if !self.sets_foreign_key(fk, record) {
                    self.errors.push(ValidationError::new(
                        path.key(&field.name),
                        ValidationErrorKind::MissingRequiredRelation {
                            model: model.name.clone(),
                            field: field.name.clone(),
                        },
                    ));
                }
            }
        }

        Ok(args)
    }

    /// Resolves the operations written under one relation field.
    pub(crate) fn relation(&mut self, field: &Field, value: &Value, path: &Path) -> Result<RelationOp> {
        let schema = self.cx.schema;

        let Some(relation) = field.relation() else {
            return Err(Error::compilation(format!(
                "`{}` is not a relation field",
                field.full_name(schema)
            )));
        };

        let target = relation.target(schema);
        let link = self.link(relation)?;
        let record = expect_record(field, value, schema)?;
        let via = Some(relation.pair);

        let mut actions = vec![];
        let mut written = vec![];

        for (key, value) in record {
            let path = path.key(key);
            let before = actions.len();

            match &key[..] {
                "create" => {
                    for (path, item) in items(value, &path) {
                        let data = expect_record(field, item, schema)?;
                        let data = self.payload(target, data, &path, Write::Create, via)?;
                        actions.push(RelationAction::Create(data));
                    }
                }
                "connect" => {
                    for (_, item) in items(value, &path) {
                        let selector = expect_record(field, item, schema)?;
                        actions.push(RelationAction::Connect(connect(&link, selector)));
                    }
                }
                "connectOrCreate" => {
                    for (path, item) in items(value, &path) {
                        let item = expect_record(field, item, schema)?;
                        let selector = entry(field, item, "where", schema)?;
                        let create = entry(field, item, "create", schema)?;

                        actions.push(RelationAction::ConnectOrCreate {
                            selector: selector.into(),
                            create: self.payload(target, create, &path.key("create"), Write::Create, via)?,
                        });
                    }
                }
                "update" if field.list => {
                    for (path, item) in items(value, &path) {
                        let item = expect_record(field, item, schema)?;
                        let selector = entry(field, item, "where", schema)?;
                        let data = entry(field, item, "data", schema)?;

                        actions.push(RelationAction::Update {
                            selector: Some(selector.into()),
                            data: self.payload(target, data, &path.key("data"), Write::Update, via)?,
                        });
                    }
                }
                "update" => {
                    let data = expect_record(field, value, schema)?;
                    actions.push(RelationAction::Update {
                        selector: None,
                        data: self.payload(target, data, &path, Write::Update, via)?,
                    });
                }
                "upsert" => {
                    for (path, item) in items(value, &path) {
                        let item = expect_record(field, item, schema)?;
                        let selector: Option<Args> = if field.list {
                            Some(entry(field, item, "where", schema)?.into())
                        } else {
                            None
                        };
                        let create = entry(field, item, "create", schema)?;
                        let update = entry(field, item, "update", schema)?;

                        actions.push(RelationAction::Upsert {
                            selector,
                            create: self.payload(target, create, &path.key("create"), Write::Create, via)?,
                            update: self.payload(target, update, &path.key("update"), Write::Update, via)?,
                        });
                    }
                }
                "set" => {
                    let selectors = items(value, &path)
                        .into_iter()
                        .map(|(_, item)| expect_record(field, item, schema).map(Args::from))
                        .collect::<Result<_>>()?;
                    actions.push(RelationAction::Set(selectors));
                }
                "disconnect" | "delete" => {
                    let selectors = match value {
                        Value::Bool(true) => vec![None],
                        Value::Bool(false) => vec![],
                        value => items(value, &path)
                            .into_iter()
                            .map(|(_, item)| expect_record(field, item, schema).map(|r| Some(Args::from(r))))
                            .collect::<Result<_>>()?,
                    };

                    for selector in selectors {
                        actions.push(if key == "delete" {
                            RelationAction::Delete(selector)
                        } else {
                            RelationAction::Disconnect(selector)
                        });
                    }
                }
                "updateMany" => {
                    for (path, item) in items(value, &path) {
                        let item = expect_record(field, item, schema)?;
                        let filter = entry(field, item, "where", schema)?;
                        let data = entry(field, item, "data", schema)?;

                        actions.push(RelationAction::UpdateMany {
                            filter: filter.into(),
                            data: self.payload(target, data, &path.key("data"), Write::Update, via)?,
                        });
                    }
                }
                "deleteMany" => {
                    for (_, item) in items(value, &path) {
                        let filter = expect_record(field, item, schema)?;
                        actions.push(RelationAction::DeleteMany(filter.into()));
                    }
                }
                _ => {
                    return Err(Error::compilation(format!(
                        "unknown relation operation `{key}` on `{}`",
                        field.full_name(schema)
                    )))
                }
            }

            if actions.len() > before {
                written.push(&key[..]);
            }
        }

        let conflicts = conflicts(field, &written);
        if !conflicts.is_empty() {
            self.errors.push(ValidationError::new(
                path.clone(),
                ValidationErrorKind::AmbiguousRelationOperation {
                    model: schema[field.id.model].name.clone(),
                    field: field.name.clone(),
                    operations: conflicts.into_iter().map(str::to_string).collect(),
                },
            ));
        }

        if actions.is_empty() && field.required && !field.list {
            self.errors.push(ValidationError::new(
                path.clone(),
                ValidationErrorKind::MissingRequiredRelation {
                    model: schema[field.id.model].name.clone(),
                    field: field.name.clone(),
                },
            ));
        }

        Ok(RelationOp {
            model: schema[field.id.model].name.clone(),
            field: field.name.clone(),
            target: target.name.clone(),
            link,
            many: field.list,
            actions,
        })
    }

    fn link(&self, relation: &Relation) -> Result<Link> {
        let schema = self.cx.schema;

        Ok(match &relation.kind {
            RelationKind::Owning(fk) => Link::ForeignKeyOnSource {
                fields: self.link_fields(fk),
            },
            RelationKind::BackReference => {
                let pair = relation.pair(schema);
                let Some(fk) = pair.relation().and_then(Relation::foreign_key) else {
                    return Err(Error::compilation(format!(
                        "`{}` does not own the foreign key of relation `{}`",
                        pair.full_name(schema),
                        relation.name
                    )));
                };

                Link::ForeignKeyOnTarget {
                    fields: self.link_fields(fk),
                }
            }
            RelationKind::Join => Link::JoinTable {
                relation: relation.name.clone(),
            },
        })
    }

    fn link_fields(&self, fk: &ForeignKey) -> Vec<LinkField> {
        fk.fields
            .iter()
            .map(|field| LinkField {
                foreign_key: field.source(self.cx.schema).name.clone(),
                references: field.target(self.cx.schema).name.clone(),
            })
            .collect()
    }

    /// An omitted key scalar with a storage default counts as set; an
    /// explicit null never does.
    fn sets_foreign_key(&self, fk: &ForeignKey, record: &Record) -> bool {
        fk.sources().all(|source| {
            let field = &self.cx.schema[source];
            match record.get(&field.name) {
                Some(value) => !value.is_null(),
                None => field.has_default,
            }
        })
    }
}

/// Connects straight through the foreign key when the selector names every
/// referenced key.
fn connect(link: &Link, selector: &Record) -> Connect {
    let assignments = match link {
        Link::ForeignKeyOnSource { fields } => fields
            .iter()
            .map(|field| {
                selector
                    .get(&field.references)
                    .filter(|value| is_key_value(value))
                    .map(|value| Assignment {
                        field: field.foreign_key.clone(),
                        value: value.clone(),
                    })
            })
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default(),
        _ => vec![],
    };

    Connect {
        selector: selector.into(),
        assignments,
    }
}

fn is_key_value(value: &Value) -> bool {
    !matches!(
        value,
        Value::Null | Value::Object(_) | Value::List(_) | Value::Json(_)
    )
}

/// Keys of `written` that may not appear together on `field`.
fn conflicts<'k>(field: &Field, written: &[&'k str]) -> Vec<&'k str> {
    let has = |key: &str| written.iter().any(|written| *written == key);

    let conflicting: Vec<&str> = if field.list {
        if has("set") && (has("connect") || has("disconnect")) {
            vec!["set", "connect", "disconnect"]
        } else {
            vec![]
        }
    } else {
        let mut conflicting = vec![];

        if TO_ONE_EXCLUSIVE.iter().filter(|key| has(**key)).count() > 1 {
            conflicting.extend(TO_ONE_EXCLUSIVE);
        }

        if (has("update") || has("upsert")) && (has("delete") || has("disconnect")) {
            conflicting.extend(["update", "upsert", "delete", "disconnect"]);
        }

        conflicting
    };

    written
        .iter()
        .copied()
        .filter(|key| conflicting.contains(key))
        .collect()
}

/// A single value or each element of a list, with its path.
fn items<'v>(value: &'v Value, path: &Path) -> Vec<(Path, &'v Value)> {
    match value {
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (path.index(i), item))
            .collect(),
        value => vec![(path.clone(), value)],
    }
}

fn expect_record<'v>(field: &Field, value: &'v Value, schema: &Schema) -> Result<&'v Record> {
    value.as_record().ok_or_else(|| {
        Error::compilation(format!(
            "relation `{}` expects an object, found {}",
            field.full_name(schema),
            value.kind_name()
        ))
    })
}

fn entry<'v>(
    field: &Field,
    record: &'v Record,
    key: &str,
    schema: &Schema,
) -> Result<&'v Record> {
    match record.get(key) {
        Some(value) => expect_record(field, value, schema),
        None => Err(Error::compilation(format!(
            "relation `{}` is missing `{key}`",
            field.full_name(schema)
        ))),
    }
}
