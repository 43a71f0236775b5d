#![allow(dead_code)]

use quarry::schema::Manifest;
use quarry::{Compiler, Error, ValidationError, ValidationErrorKind};

pub fn manifest() -> Manifest {
    Manifest::from_json(include_str!("../fixtures/blog.json")).expect("blog manifest parses")
}

pub fn compiler() -> Compiler {
    Compiler::builder()
        .load(&manifest())
        .expect("blog manifest loads")
}

/// Validation problems of `err`, as `(path, kind)` pairs.
pub fn problems(err: &Error) -> Vec<(String, ValidationErrorKind)> {
    err.as_validation()
        .unwrap_or_else(|| panic!("expected validation error; actual={err}"))
        .iter()
        .map(|ValidationError { path, kind }| (path.to_string(), kind.clone()))
        .collect()
}

/// The single validation problem of `err`.
#[track_caller]
pub fn only_problem(err: &Error) -> (String, ValidationErrorKind) {
    let mut problems = problems(err);
    assert_eq!(problems.len(), 1, "expected one problem; actual={problems:#?}");
    problems.remove(0)
}
