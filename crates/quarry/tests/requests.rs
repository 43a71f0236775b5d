mod support;

use quarry::document::{Link, LinkField};
use quarry::schema::{OperationKind, RootKind};
use quarry::{Arg, Compiler, Config, Record, Schema, Selection, ValidationErrorKind, Value};

use pretty_assertions::assert_eq;
use serde_json::json;
use std_util::prelude::*;
use support::*;

#[test]
fn find_many_with_filter_and_select() {
    let compiler = compiler();

    let doc = assert_ok!(compiler.request(
        "findManyPost",
        &json!({
            "where": { "title": "x" },
            "select": { "id": true, "title": true },
        })
    ));

    assert_eq!(doc.kind, OperationKind::FindMany);
    assert_eq!(doc.root, RootKind::Query);
    assert_eq!(doc.model, "Post");
    assert_eq!(doc.output_type, "Post");
    assert!(doc.list);
    assert!(!doc.nullable);

    assert_eq!(
        doc.to_string(),
        "query {\n  findManyPost(where: {\n    title: \"x\"\n  }) {\n    id\n    title\n  }\n}"
    );

    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        json!({
            "operation": "findManyPost",
            "model": "Post",
            "args": { "where": { "title": "x" } },
            "selection": { "id": true, "title": true },
        })
    );
}

#[test]
fn several_arguments_print_on_their_own_lines() {
    let doc = assert_ok!(compiler().request(
        "findManyPost",
        &json!({
            "where": { "kind": "A", "views": { "in": [1, 2] } },
            "take": 10,
            "select": { "id": true },
        })
    ));

    assert_eq!(
        doc.to_string(),
        "query {
  findManyPost(
    where: {
      kind: A
      views: {
        in: [1, 2]
      }
    }
    take: 10
  ) {
    id
  }
}"
    );
}

#[test]
fn default_selection_is_every_scalar_field() {
    let compiler = compiler();

    let doc = assert_ok!(compiler.request("findUniquePost", &json!({ "where": { "id": 1 } })));

    assert!(doc.nullable);
    assert!(!doc.list);
    assert_eq!(
        doc.selection.names().collect::<Vec<_>>(),
        [
            "id",
            "title",
            "content",
            "published",
            "views",
            "rating",
            "kind",
            "createdAt",
            "metadata",
            "authorId"
        ]
    );

    let compiler = Compiler::builder()
        .default_selection_includes_enums(false)
        .load(&manifest())
        .unwrap();

    let selection = assert_ok!(compiler.default_selection("Post"));
    assert!(!selection.contains("kind"));
    assert!(selection.contains("createdAt"));
}

#[test]
fn include_adds_relations_with_their_own_args() {
    let compiler = compiler();

    let doc = assert_ok!(compiler.request(
        "findUniqueUser",
        &json!({
            "where": { "email": "a@b.com" },
            "include": {
                "posts": {
                    "where": { "published": true },
                    "take": 2,
                    "select": { "title": true },
                },
                "profile": true,
            },
        })
    ));

    assert_eq!(
        doc.selection.names().collect::<Vec<_>>(),
        ["id", "email", "name", "posts", "profile"]
    );

    let posts = doc.selection.field("posts").unwrap();
    assert_eq!(
        posts.args.get("where").unwrap().expect_object().get("published"),
        Some(&Arg::Value(Value::Bool(true)))
    );
    assert_eq!(posts.args.get("take"), Some(&Arg::Value(Value::Int(2))));

    assert!(!posts.is_leaf());
    assert!(doc.selection.field("email").unwrap().is_leaf());

    let nested = posts.selection.as_ref().unwrap();
    assert_eq!(nested.output_type, "Post");
    assert_eq!(nested.names().collect::<Vec<_>>(), ["title"]);

    let profile = doc.selection.field("profile").unwrap();
    assert!(profile.args.is_empty());
    assert_eq!(
        profile.selection.as_ref().unwrap().names().collect::<Vec<_>>(),
        ["id", "bio", "userId"]
    );

    assert_eq!(
        serde_json::to_value(&doc).unwrap()["selection"]["posts"],
        json!({
            "args": { "where": { "published": true }, "take": 2 },
            "selection": { "title": true },
        })
    );
}

#[test]
fn include_rejects_scalars() {
    let err = assert_err!(compiler().request(
        "findUniqueUser",
        &json!({ "where": { "id": 1 }, "include": { "email": true } })
    ));

    assert_eq!(
        only_problem(&err),
        (
            "include.email".to_string(),
            ValidationErrorKind::IncludeScalarField {
                name: "email".into(),
                type_name: "User".into(),
            }
        )
    );
}

#[test]
fn select_and_include_are_exclusive() {
    let err = assert_err!(compiler().request(
        "findUniqueUser",
        &json!({
            "where": { "id": 1 },
            "select": { "id": true },
            "include": { "posts": true },
        })
    ));

    assert_eq!(
        only_problem(&err),
        (
            String::new(),
            ValidationErrorKind::IncludeAndSelect {
                type_name: "User".into()
            }
        )
    );
}

#[test]
fn select_must_choose_something() {
    let compiler = compiler();

    let err = assert_err!(compiler.request("findManyPost", &json!({ "select": {} })));
    assert_eq!(
        only_problem(&err),
        (
            "select".to_string(),
            ValidationErrorKind::EmptySelection {
                type_name: "Post".into()
            }
        )
    );

    let err = assert_err!(compiler.request(
        "findManyPost",
        &json!({ "select": { "id": false, "title": false } })
    ));
    assert_eq!(
        only_problem(&err),
        (
            "select".to_string(),
            ValidationErrorKind::NoTruthySelection {
                type_name: "Post".into()
            }
        )
    );
}

#[test]
fn select_unknown_field() {
    let err = assert_err!(compiler().request(
        "findManyPost",
        &json!({ "select": { "titel": true } })
    ));

    assert_eq!(
        only_problem(&err),
        (
            "select.titel".to_string(),
            ValidationErrorKind::UnknownField {
                name: "titel".into(),
                type_name: "Post".into(),
                suggestion: Some("title".into()),
            }
        )
    );
}

#[test]
fn relation_selection_args_are_validated() {
    let err = assert_err!(compiler().request(
        "findManyUser",
        &json!({ "select": { "posts": { "where": { "idd": 1 } } } })
    ));

    let (path, kind) = only_problem(&err);
    assert_eq!(path, "select.posts.where.idd");
    assert_eq!(
        kind,
        ValidationErrorKind::UnknownField {
            name: "idd".into(),
            type_name: "PostWhereInput".into(),
            suggestion: Some("id".into()),
        }
    );
}

#[test]
fn argument_and_selection_problems_are_reported_together() {
    let err = assert_err!(compiler().request(
        "findManyPost",
        &json!({ "where": { "idd": 1 }, "select": { "titel": true } })
    ));

    let paths: Vec<_> = problems(&err).into_iter().map(|(path, _)| path).collect();
    assert_eq!(paths, ["where.idd", "select.titel"]);
}

#[test]
fn unknown_argument() {
    let err = assert_err!(compiler().request("findManyPost", &json!({ "limit": 3 })));

    let (path, kind) = only_problem(&err);
    assert_eq!(path, "limit");
    assert!(matches!(
        kind,
        ValidationErrorKind::UnknownField { ref name, ref type_name, .. }
            if name == "limit" && type_name == "findManyPost"
    ));
}

#[test]
fn missing_required_argument() {
    let err = assert_err!(compiler().request("findUniquePost", &json!({})));

    assert_eq!(
        only_problem(&err),
        (
            "where".to_string(),
            ValidationErrorKind::MissingRequiredField {
                name: "where".into(),
                type_name: "findUniquePost".into(),
            }
        )
    );
}

#[test]
fn unknown_operation() {
    let err = assert_err!(compiler().request("findManyComment", &json!({})));

    assert!(err.is_unknown_operation());
    assert_eq!(err.to_string(), "unknown operation: findManyComment");
}

#[test]
fn create_mutation() {
    let doc = assert_ok!(compiler().request(
        "createOnePost",
        &json!({
            "data": { "title": "Hi", "author": { "connect": { "id": 5 } } },
            "select": { "id": true },
        })
    ));

    assert_eq!(doc.root, RootKind::Mutation);
    assert_eq!(doc.kind, OperationKind::Create);
    assert!(!doc.nullable);

    let author = doc.args.get("data").unwrap().expect_object().get("author").unwrap();
    let author = author.expect_relation();

    assert_eq!(
        author.link,
        Link::ForeignKeyOnSource {
            fields: vec![LinkField {
                foreign_key: "authorId".into(),
                references: "id".into(),
            }],
        }
    );

    assert_eq!(
        doc.to_string(),
        "mutation {
  createOnePost(data: {
    title: \"Hi\"
    author: {
      connect: {
        id: 5
      }
    }
  }) {
    id
  }
}"
    );
}

#[test]
fn create_payload_matching_no_input_type() {
    let err = assert_err!(compiler().request("createOnePost", &json!({ "data": { "title": "Hi" } })));

    let (path, kind) = only_problem(&err);
    assert_eq!(path, "data");

    // Both the checked and the unchecked create input were tried.
    let ValidationErrorKind::NoMatchingUnionVariant { attempts } = kind else {
        panic!("unexpected problem {kind:?}");
    };
    let tried: Vec<_> = attempts.iter().map(|a| &a.alternative[..]).collect();
    assert_eq!(tried, ["PostCreateInput", "PostUncheckedCreateInput"]);
}

#[test]
fn batch_mutations_return_a_count() {
    let doc = assert_ok!(compiler().request(
        "updateManyPost",
        &json!({ "data": { "views": { "increment": 1 } }, "where": { "published": false } })
    ));

    assert_eq!(doc.model, "Post");
    assert_eq!(doc.output_type, "BatchPayload");
    assert_eq!(doc.selection.names().collect::<Vec<_>>(), ["count"]);
    assert_eq!(
        doc.args.get("data").unwrap().expect_object().get("views"),
        Some(&Arg::Object(Record::new().with("increment", 1).into()))
    );
}

#[test]
fn compile_rejects_mismatched_input() {
    let compiler = compiler();

    let err = assert_err!(compiler.compile("findManyPost", &Record::new(), Selection::new("User")));
    assert!(err.is_compilation());

    let selection = compiler.default_selection("Post").unwrap();
    let err = assert_err!(compiler.compile(
        "findManyPost",
        &Record::new().with("limit", 3),
        selection.clone()
    ));
    assert!(err.is_compilation());

    assert_ok!(compiler.compile("findManyPost", &Record::new().with("take", 3), selection));
}

#[test]
fn compiler_is_shared_across_threads() {
    fn assert_shareable<T: Send + Sync + Clone + 'static>() {}
    assert_shareable::<Compiler>();

    let compiler = compiler();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiler = compiler.clone();
            std::thread::spawn(move || {
                compiler
                    .request("findUniquePost", &json!({ "where": { "id": i } }))
                    .map(|doc| doc.to_string())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let text = assert_ok!(handle.join().unwrap());
        assert!(text.contains(&format!("findUniquePost(where: {{\n    id: {i}\n  }})")), "{text}");
    }
}

#[test]
fn builder_settings() {
    let schema = assert_ok!(Schema::load(&manifest()));
    let compiler = Compiler::new(schema);
    assert_eq!(compiler.config(), &Config::default());

    let config = Config {
        max_depth: 3,
        ..Config::default()
    };
    let tuned = Compiler::builder()
        .config(config.clone())
        .suggestions(false)
        .build(compiler.schema().clone());

    assert_eq!(
        tuned.config(),
        &Config {
            suggestions: false,
            ..config
        }
    );
    assert!(std::sync::Arc::ptr_eq(tuned.schema(), compiler.schema()));
}
