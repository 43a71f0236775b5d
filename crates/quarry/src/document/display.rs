use super::{Arg, Args, QueryDocument, RelationAction, Selection};

use quarry_core::Value;
use std::fmt;

const INDENT: usize = 2;

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.root)?;
        write_field(f, 1, &self.operation, &self.args, Some(&self.selection))?;
        f.write_str("}")
    }
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Arg(&'a Arg),
    Args(&'a Args),
    Action(&'a RelationAction),
}

fn pad(f: &mut fmt::Formatter<'_>, level: usize) -> fmt::Result {
    write!(f, "{:width$}", "", width = level * INDENT)
}

fn write_field(
    f: &mut fmt::Formatter<'_>,
    level: usize,
    name: &str,
    args: &Args,
    selection: Option<&Selection>,
) -> fmt::Result {
    pad(f, level)?;
    f.write_str(name)?;

    // A single argument stays on the field's line.
    if args.len() == 1 {
        f.write_str("(")?;
        for (name, arg) in args.iter() {
            write_entry(f, level, name, Node::Arg(arg))?;
        }
        f.write_str(")")?;
    } else if !args.is_empty() {
        f.write_str("(\n")?;
        for (name, arg) in args.iter() {
            pad(f, level + 1)?;
            write_entry(f, level + 1, name, Node::Arg(arg))?;
            f.write_str("\n")?;
        }
        pad(f, level)?;
        f.write_str(")")?;
    }

    if let Some(selection) = selection {
        f.write_str(" {\n")?;
        for field in &selection.fields {
            write_field(
                f,
                level + 1,
                &field.name,
                &field.args,
                field.selection.as_ref(),
            )?;
        }
        pad(f, level)?;
        f.write_str("}")?;
    }

    f.write_str("\n")
}

fn write_entry(f: &mut fmt::Formatter<'_>, level: usize, name: &str, node: Node<'_>) -> fmt::Result {
    write!(f, "{name}: ")?;
    write_node(f, level, node)
}

fn write_node(f: &mut fmt::Formatter<'_>, level: usize, node: Node<'_>) -> fmt::Result {
    match node {
        Node::Arg(Arg::Value(value)) => write_value(f, value),
        Node::Arg(Arg::Object(args)) | Node::Args(args) => {
            write_object(f, level, args.iter().map(|(name, arg)| (name, Node::Arg(arg))))
        }
        Node::Arg(Arg::List(items)) => write_list(
            f,
            level,
            items.iter().map(Node::Arg),
            items.iter().all(Arg::is_inline),
        ),
        Node::Arg(Arg::Relation(op)) => write_object(
            f,
            level,
            op.actions
                .iter()
                .map(|action| (action.name(), Node::Action(action))),
        ),
        Node::Action(action) => write_action(f, level, action),
    }
}

fn write_action(f: &mut fmt::Formatter<'_>, level: usize, action: &RelationAction) -> fmt::Result {
    match action {
        RelationAction::Create(args)
        | RelationAction::DeleteMany(args)
        | RelationAction::Disconnect(Some(args))
        | RelationAction::Delete(Some(args))
        | RelationAction::Update {
            selector: None,
            data: args,
        } => write_node(f, level, Node::Args(args)),
        RelationAction::Connect(connect) => write_node(f, level, Node::Args(&connect.selector)),
        RelationAction::Disconnect(None) | RelationAction::Delete(None) => f.write_str("true"),
        RelationAction::ConnectOrCreate { selector, create } => write_object(
            f,
            level,
            [("where", Node::Args(selector)), ("create", Node::Args(create))].into_iter(),
        ),
        RelationAction::Update {
            selector: Some(selector),
            data,
        } => write_object(
            f,
            level,
            [("where", Node::Args(selector)), ("data", Node::Args(data))].into_iter(),
        ),
        RelationAction::UpdateMany { filter, data } => write_object(
            f,
            level,
            [("where", Node::Args(filter)), ("data", Node::Args(data))].into_iter(),
        ),
        RelationAction::Upsert {
            selector,
            create,
            update,
        } => write_object(
            f,
            level,
            selector
                .iter()
                .map(|selector| ("where", Node::Args(selector)))
                .chain([("create", Node::Args(create)), ("update", Node::Args(update))]),
        ),
        RelationAction::Set(items) => write_list(f, level, items.iter().map(Node::Args), false),
    }
}

fn write_object<'a>(
    f: &mut fmt::Formatter<'_>,
    level: usize,
    entries: impl Iterator<Item = (&'a str, Node<'a>)>,
) -> fmt::Result {
    let mut entries = entries.peekable();
    if entries.peek().is_none() {
        return f.write_str("{}");
    }

    f.write_str("{\n")?;
    for (name, node) in entries {
        pad(f, level + 1)?;
        write_entry(f, level + 1, name, node)?;
        f.write_str("\n")?;
    }
    pad(f, level)?;
    f.write_str("}")
}

fn write_list<'a>(
    f: &mut fmt::Formatter<'_>,
    level: usize,
    items: impl Iterator<Item = Node<'a>>,
    inline: bool,
) -> fmt::Result {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return f.write_str("[]");
    }

    if inline {
        f.write_str("[")?;
        for (i, item) in items.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_node(f, level, item)?;
        }
        return f.write_str("]");
    }

    f.write_str("[\n")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(",\n")?;
        }
        pad(f, level + 1)?;
        write_node(f, level + 1, item)?;
    }
    f.write_str("\n")?;
    pad(f, level)?;
    f.write_str("]")
}

/// Enum members print bare; every other scalar prints as JSON.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Enum(name) => f.write_str(name),
        value => write!(f, "{}", value.to_json()),
    }
}
