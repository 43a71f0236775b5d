/// A closed set of string values.
#[derive(Debug, Clone)]
pub struct Enum {
    pub id: EnumId,

    pub name: String,

    /// Members in declaration order
    pub values: Vec<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub usize);

impl Enum {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|member| member == value)
    }
}
