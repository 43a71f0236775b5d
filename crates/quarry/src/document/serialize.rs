use super::{Arg, Args, QueryDocument, Selection};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

impl Serialize for QueryDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("operation", &self.operation)?;
        map.serialize_entry("model", &self.model)?;
        map.serialize_entry("args", &self.args)?;
        map.serialize_entry("selection", &self.selection)?;
        map.end()
    }
}

impl Serialize for Args {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.args.len()))?;
        for (name, arg) in &self.args {
            map.serialize_entry(name, arg)?;
        }
        map.end()
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Arg::Value(value) => value.serialize(serializer),
            Arg::Object(args) => args.serialize(serializer),
            Arg::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Arg::Relation(op) => op.serialize(serializer),
        }
    }
}

/// Scalars serialize as `true`; object fields as `{args, selection}` with
/// empty args omitted.
impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;

        for field in &self.fields {
            match &field.selection {
                None => map.serialize_entry(&field.name, &true)?,
                Some(selection) => map.serialize_entry(
                    &field.name,
                    &Nested {
                        args: &field.args,
                        selection,
                    },
                )?,
            }
        }

        map.end()
    }
}

struct Nested<'a> {
    args: &'a Args,
    selection: &'a Selection,
}

impl Serialize for Nested<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if !self.args.is_empty() {
            map.serialize_entry("args", self.args)?;
        }
        map.serialize_entry("selection", self.selection)?;
        map.end()
    }
}
