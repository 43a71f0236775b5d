use super::Args;

/// Fields requested from one output type.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Output type the fields belong to
    pub output_type: String,

    pub fields: Vec<SelectionField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionField {
    pub name: String,

    /// Arguments of a relation field, e.g. `where` or `take`
    pub args: Args,

    /// Sub-selection of an object field; `None` for scalars and enums
    pub selection: Option<Selection>,
}

impl Selection {
    pub fn new(output_type: impl Into<String>) -> Selection {
        Selection {
            output_type: output_type.into(),
            fields: vec![],
        }
    }

    pub fn push(&mut self, field: SelectionField) {
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&SelectionField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|field| &field.name[..])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl SelectionField {
    /// A scalar or enum field.
    pub fn leaf(name: impl Into<String>) -> SelectionField {
        SelectionField {
            name: name.into(),
            args: Args::new(),
            selection: None,
        }
    }

    pub fn nested(name: impl Into<String>, args: Args, selection: Selection) -> SelectionField {
        SelectionField {
            name: name.into(),
            args,
            selection: Some(selection),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.selection.is_none()
    }
}
