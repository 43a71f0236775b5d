mod compiler;
pub use compiler::{Builder, Compiler};

mod config;
pub use config::Config;

pub mod document;
pub use document::{Arg, Args, QueryDocument, Selection, SelectionField};

mod engine;
pub use engine::aggregate::{AggregateKind, AggregatePlan, AggregateSelection};

pub use quarry_core::{
    schema, Error, Path, Record, Result, Schema, ValidationError, ValidationErrorKind,
    ValidationErrors, Value, VariantMismatch,
};
