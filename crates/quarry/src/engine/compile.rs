use super::relation::{Resolve, Write};
use super::Cx;
use crate::document::{Arg, Args, QueryDocument, Selection};

use quarry_core::schema::{Operation, OperationKind, OutputType};
use quarry_core::{Error, Path, Record, Result, ValidationErrors};

use tracing::debug;

/// Assembles a [`QueryDocument`] from validated arguments and a selection.
///
/// Write payloads are resolved into relation operations. Relation problems
/// are returned together as a validation error; anything else that does not
/// line up with the schema is a compilation error.
pub(crate) fn compile(
    cx: Cx<'_>,
    operation: &Operation,
    args: &Record,
    selection: Selection,
) -> Result<QueryDocument> {
    let schema = cx.schema;
    let model = &schema[operation.model];

    let Some(output) = operation.output_type().map(|id| &schema[id]) else {
        return Err(Error::compilation(format!(
            "operation `{}` does not return an object",
            operation.name
        )));
    };

    let mut resolve = Resolve::new(cx);
    let compiled = resolve_args(cx, &mut resolve, operation, args)?;
    resolve.into_result()?;
    check_selection(cx, output, &selection)?;

    let document = QueryDocument {
        operation: operation.name.clone(),
        kind: operation.kind,
        root: operation.root,
        model: model.name.clone(),
        output_type: output.name.clone(),
        list: operation.returns_list(),
        nullable: operation.returns_nullable(),
        args: compiled,
        selection,
    };

    debug!(
        operation = %document.operation,
        root = %document.root,
        args = document.args.len(),
        fields = document.selection.fields.len(),
        "compiled query document"
    );

    Ok(document)
}

/// Resolves the write payloads among `args` and returns the relation
/// problems they carry, without building a document.
pub(crate) fn relation_errors(
    cx: Cx<'_>,
    operation: &Operation,
    args: &Record,
) -> Result<ValidationErrors> {
    let mut resolve = Resolve::new(cx);
    resolve_args(cx, &mut resolve, operation, args)?;
    Ok(resolve.into_errors())
}

fn resolve_args(
    cx: Cx<'_>,
    resolve: &mut Resolve<'_>,
    operation: &Operation,
    args: &Record,
) -> Result<Args> {
    let model = &cx.schema[operation.model];
    let mut compiled = Args::new();

    for (name, value) in args {
        if !operation.args().contains_key(name) {
            return Err(Error::compilation(format!(
                "`{name}` is not an argument of `{}`",
                operation.name
            )));
        }

        let write = match (operation.kind, &name[..]) {
            (OperationKind::Create, "data") | (OperationKind::Upsert, "create") => Some(Write::Create),
            (OperationKind::Update | OperationKind::UpdateMany, "data")
            | (OperationKind::Upsert, "update") => Some(Write::Update),
            _ => None,
        };

        let arg = match write {
            Some(write) => {
                let Some(record) = value.as_record() else {
                    return Err(Error::compilation(format!(
                        "`{}.{name}` expects an object, found {}",
                        operation.name,
                        value.kind_name()
                    )));
                };

                Arg::from(resolve.payload(model, record, &Path::root().key(name), write, None)?)
            }
            None => Arg::from(value.clone()),
        };

        compiled.insert(name.clone(), arg);
    }

    Ok(compiled)
}

/// Checks that `selection` only names fields of `output`, and that every
/// nested model can be read on its own.
pub(crate) fn check_selection(cx: Cx<'_>, output: &OutputType, selection: &Selection) -> Result<()> {
    let schema = cx.schema;

    if selection.output_type != output.name {
        return Err(Error::compilation(format!(
            "selection on `{}` cannot be applied to `{}`",
            selection.output_type, output.name
        )));
    }

    for selected in &selection.fields {
        let Some(field) = output.field(&selected.name) else {
            return Err(Error::compilation(format!(
                "`{}` has no field `{}`",
                output.name, selected.name
            )));
        };

        match (field.as_object(), &selected.selection) {
            (None, None) => {}
            (Some(target), Some(nested)) => {
                let target = &schema[target];

                if let Some(model) = schema.model(&target.name) {
                    let readable = schema
                        .operation_for(model.id, OperationKind::FindMany)
                        .or_else(|| schema.operation_for(model.id, OperationKind::FindUnique))
                        .is_some();

                    if !readable {
                        return Err(Error::compilation(format!(
                            "`{}.{}` selects model `{}`, which has no findMany or findUnique mapping",
                            output.name, field.name, model.name
                        )));
                    }
                }

                check_selection(cx, target, nested)?;
            }
            (Some(_), None) => {
                return Err(Error::compilation(format!(
                    "`{}.{}` is a relation and needs a sub-selection",
                    output.name, field.name
                )))
            }
            (None, Some(_)) => {
                return Err(Error::compilation(format!(
                    "`{}.{}` is not a relation and cannot have a sub-selection",
                    output.name, field.name
                )))
            }
        }
    }

    Ok(())
}
