use std::fmt;

/// The scalar kinds a manifest may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    BigInt,
    Float,
    Decimal,
    String,
    Boolean,
    DateTime,
    Json,
    Bytes,
    Uuid,
}

impl ScalarKind {
    /// Resolves a manifest type name, including the `Long`, `ID` and `Xml` aliases.
    pub fn from_name(name: &str) -> Option<ScalarKind> {
        Some(match name {
            "Int" => ScalarKind::Int,
            "BigInt" | "Long" => ScalarKind::BigInt,
            "Float" => ScalarKind::Float,
            "Decimal" => ScalarKind::Decimal,
            "String" | "ID" | "Xml" => ScalarKind::String,
            "Boolean" => ScalarKind::Boolean,
            "DateTime" => ScalarKind::DateTime,
            "Json" => ScalarKind::Json,
            "Bytes" => ScalarKind::Bytes,
            "UUID" => ScalarKind::Uuid,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Int => "Int",
            ScalarKind::BigInt => "BigInt",
            ScalarKind::Float => "Float",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::String => "String",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Json => "Json",
            ScalarKind::Bytes => "Bytes",
            ScalarKind::Uuid => "UUID",
        }
    }

    /// Kinds that may be averaged or summed.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ScalarKind::Int | ScalarKind::BigInt | ScalarKind::Float | ScalarKind::Decimal
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
