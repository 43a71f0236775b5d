use std::fmt;

/// Functions available through an aggregate operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Avg,
    Sum,
    Min,
    Max,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Avg,
        AggregateFunction::Sum,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    /// Accepts both the bare (`avg`) and the underscored (`_avg`) spelling.
    pub fn from_key(key: &str) -> Option<AggregateFunction> {
        let name = key.strip_prefix('_').unwrap_or(key);
        AggregateFunction::ALL
            .into_iter()
            .find(|function| function.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Canonical argument and result key.
    pub fn key(self) -> &'static str {
        match self {
            AggregateFunction::Count => "_count",
            AggregateFunction::Avg => "_avg",
            AggregateFunction::Sum => "_sum",
            AggregateFunction::Min => "_min",
            AggregateFunction::Max => "_max",
        }
    }

    /// Functions whose output type may only list numeric fields.
    pub fn is_numeric_only(self) -> bool {
        matches!(self, AggregateFunction::Avg | AggregateFunction::Sum)
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
