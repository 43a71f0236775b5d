use super::{AggregateFunction, FieldId, Model, ModelId, RelationKind, Schema};
use crate::{Error, Result};

struct Verify<'a> {
    schema: &'a Schema,
}

impl Schema {
    pub(super) fn verify(&self) -> Result<()> {
        Verify { schema: self }.verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        debug_assert!(self.verify_relations_linked());

        for model in self.schema.models() {
            self.verify_model_has_identifier(model)?;
            self.verify_aggregates_are_numeric(model)?;
        }

        Ok(())
    }

    fn verify_relations_linked(&self) -> bool {
        for model in self.schema.models() {
            for field in model.relation_fields() {
                let relation = field.ty.expect_relation();
                assert_ne!(relation.target, ModelId::placeholder());
                assert_ne!(relation.pair, FieldId::placeholder());

                let pair = relation.pair(self.schema).ty.expect_relation();
                assert_eq!(pair.pair, field.id);

                if let RelationKind::Owning(fk) = &relation.kind {
                    assert!(!fk.fields.is_empty());
                    assert!(pair.is_back_reference());
                }
            }
        }

        true
    }

    fn verify_model_has_identifier(&self, model: &Model) -> Result<()> {
        if model.has_identifier() {
            return Ok(());
        }

        Err(Error::invalid_schema(format!(
            "model `{}` has no identifying field; mark a field as id or unique, \
             or declare `idFields` or `uniqueFields`",
            model.name
        )))
    }

    /// Avg and sum output types may only list numeric model fields.
    fn verify_aggregates_are_numeric(&self, model: &Model) -> Result<()> {
        for function in AggregateFunction::ALL {
            if !function.is_numeric_only() {
                continue;
            }

            let Some(output) = self.schema.aggregate_output(model.id, function) else {
                continue;
            };

            for name in output.fields.keys() {
                let numeric = model
                    .field(name)
                    .and_then(|field| field.ty.as_scalar())
                    .is_some_and(|kind| kind.is_numeric());

                if !numeric {
                    return Err(Error::invalid_schema(format!(
                        "aggregate output type `{}` lists `{name}`, which is not a numeric field of `{}`",
                        output.name, model.name
                    )));
                }
            }
        }

        Ok(())
    }
}
