//! The compiled form of a request, ready to hand to an execution engine.

mod display;

mod relation;
pub use relation::{Assignment, Connect, Link, LinkField, RelationAction, RelationOp};

mod selection;
pub use selection::{Selection, SelectionField};

mod serialize;

use quarry_core::schema::{OperationKind, RootKind};
use quarry_core::{Record, Value};

use indexmap::IndexMap;

/// A validated, relation-resolved request for one operation.
///
/// `Display` renders the document as query text; `Serialize` produces the
/// logical `{operation, model, args, selection}` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDocument {
    /// Root field name, e.g. `findManyPost`
    pub operation: String,

    pub kind: OperationKind,

    pub root: RootKind,

    pub model: String,

    /// Output type of the root field
    pub output_type: String,

    /// The result is a list
    pub list: bool,

    /// The result may be null
    pub nullable: bool,

    pub args: Args,

    pub selection: Selection,
}

/// Named arguments, in the order the caller supplied them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    pub args: IndexMap<String, Arg>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Scalar, enum, null, or raw JSON value
    Value(Value),

    Object(Args),

    List(Vec<Arg>),

    /// A nested write through a relation field
    Relation(Box<RelationOp>),
}

impl Args {
    pub fn new() -> Args {
        Args::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, arg: impl Into<Arg>) {
        self.args.insert(name.into(), arg.into());
    }

    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.args.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arg)> + '_ {
        self.args.iter().map(|(name, arg)| (&name[..], arg))
    }
}

impl Arg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Args> {
        match self {
            Arg::Object(args) => Some(args),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Arg]> {
        match self {
            Arg::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationOp> {
        match self {
            Arg::Relation(op) => Some(op),
            _ => None,
        }
    }

    #[track_caller]
    pub fn expect_object(&self) -> &Args {
        match self {
            Arg::Object(args) => args,
            _ => panic!("expected object argument; actual={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_relation(&self) -> &RelationOp {
        match self {
            Arg::Relation(op) => op,
            _ => panic!("expected relation argument; actual={self:#?}"),
        }
    }

    /// Scalars and raw JSON print inline; everything else spans lines.
    pub(crate) fn is_inline(&self) -> bool {
        matches!(self, Arg::Value(_))
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Arg {
        match value {
            Value::Object(record) => Arg::Object(record.into()),
            Value::List(items) => Arg::List(items.into_iter().map(Arg::from).collect()),
            value => Arg::Value(value),
        }
    }
}

impl From<Args> for Arg {
    fn from(args: Args) -> Arg {
        Arg::Object(args)
    }
}

impl From<RelationOp> for Arg {
    fn from(op: RelationOp) -> Arg {
        Arg::Relation(Box::new(op))
    }
}

impl From<Record> for Args {
    fn from(record: Record) -> Args {
        Args {
            args: record
                .fields
                .into_iter()
                .map(|(name, value)| (name, Arg::from(value)))
                .collect(),
        }
    }
}

impl From<&Record> for Args {
    fn from(record: &Record) -> Args {
        record.clone().into()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = (&'a String, &'a Arg);
    type IntoIter = indexmap::map::Iter<'a, String, Arg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}
