use quarry_core::schema::{Manifest, RelationKind, Schema};
use serde_json::{json, Value as Json};
use std_util::prelude::*;

fn scalar(name: &str, ty: &str) -> Json {
    json!({ "name": name, "kind": "scalar", "type": ty, "isRequired": true })
}

fn id(name: &str) -> Json {
    json!({ "name": name, "kind": "scalar", "type": "Int", "isRequired": true, "isId": true })
}

fn relation(name: &str, target: &str, relation: &str, from: &[&str], to: &[&str]) -> Json {
    json!({
        "name": name,
        "kind": "object",
        "type": target,
        "isRequired": !from.is_empty(),
        "relationName": relation,
        "relationFromFields": from,
        "relationToFields": to,
    })
}

fn many(name: &str, target: &str, relation: &str) -> Json {
    json!({
        "name": name,
        "kind": "object",
        "type": target,
        "isList": true,
        "relationName": relation,
    })
}

fn model(name: &str, fields: Vec<Json>) -> Json {
    json!({ "name": name, "fields": fields })
}

fn load(models: Vec<Json>) -> quarry_core::Result<Schema> {
    let manifest: Manifest = serde_json::from_value(json!({
        "datamodel": { "models": models },
        "schema": { "outputObjectTypes": [{ "name": "Query", "fields": [] }] },
    }))
    .expect("manifest should deserialize");

    Schema::load(&manifest)
}

fn assert_invalid_schema(err: &quarry_core::Error, needle: &str) {
    let msg = err.to_string();
    assert!(err.is_invalid_schema(), "expected invalid schema, got: {msg}");
    assert!(
        msg.contains(needle),
        "error should mention `{needle}`, got: {msg}"
    );
}

#[test]
fn one_to_many_owning_side_carries_foreign_key() {
    let schema = assert_ok!(load(vec![
        model(
            "User",
            vec![id("id"), many("posts", "Post", "PostToUser")]
        ),
        model(
            "Post",
            vec![
                id("id"),
                scalar("authorId", "Int"),
                relation("author", "User", "PostToUser", &["authorId"], &["id"]),
            ]
        ),
    ]));

    let user = assert_some!(schema.model("User"));
    let post = assert_some!(schema.model("Post"));

    let author = assert_some!(post.field("author")).ty.expect_relation();
    let posts = assert_some!(user.field("posts")).ty.expect_relation();

    let fk = assert_some!(author.foreign_key());
    assert_eq!(fk.fields.len(), 1);
    assert_eq!(fk.fields[0].source(&schema).name, "authorId");
    assert_eq!(fk.fields[0].target(&schema).name, "id");
    assert_eq!(author.target, user.id);

    assert_eq!(posts.kind, RelationKind::BackReference);
    assert_eq!(posts.pair, post.field("author").unwrap().id);
    assert_eq!(author.pair, user.field("posts").unwrap().id);
}

#[test]
fn many_to_many_is_join() {
    let schema = assert_ok!(load(vec![
        model("Post", vec![id("id"), many("tags", "Tag", "PostToTag")]),
        model("Tag", vec![id("id"), many("posts", "Post", "PostToTag")]),
    ]));

    let tags = schema.model("Post").unwrap().field("tags").unwrap();
    let posts = schema.model("Tag").unwrap().field("posts").unwrap();

    assert!(tags.relation().unwrap().is_join());
    assert!(posts.relation().unwrap().is_join());
    assert_eq!(tags.relation().unwrap().pair(&schema).name, "posts");
}

#[test]
fn self_relation_pairs_two_fields_of_one_model() {
    let schema = assert_ok!(load(vec![model(
        "Employee",
        vec![
            id("id"),
            scalar("managerId", "Int"),
            relation("manager", "Employee", "Management", &["managerId"], &["id"]),
            many("reports", "Employee", "Management"),
        ]
    )]));

    let employee = schema.model("Employee").unwrap();
    let manager = employee.field("manager").unwrap().relation().unwrap();
    let reports = employee.field("reports").unwrap().relation().unwrap();

    assert!(manager.is_owning());
    assert!(reports.is_back_reference());
    assert_eq!(reports.pair(&schema).name, "manager");
}

#[test]
fn relation_without_pair() {
    let err = assert_err!(load(vec![
        model("User", vec![id("id")]),
        model(
            "Post",
            vec![
                id("id"),
                scalar("authorId", "Int"),
                relation("author", "User", "PostToUser", &["authorId"], &["id"]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "`Post.author` has no matching relation field on `User`");
}

#[test]
fn both_sides_declare_foreign_keys() {
    let err = assert_err!(load(vec![
        model(
            "User",
            vec![
                id("id"),
                scalar("profileId", "Int"),
                relation("profile", "Profile", "ProfileToUser", &["profileId"], &["id"]),
            ]
        ),
        model(
            "Profile",
            vec![
                id("id"),
                scalar("userId", "Int"),
                relation("user", "User", "ProfileToUser", &["userId"], &["id"]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "both sides of relation `ProfileToUser`");
}

#[test]
fn foreign_key_names_unknown_field() {
    let err = assert_err!(load(vec![
        model("User", vec![id("id"), many("posts", "Post", "PostToUser")]),
        model(
            "Post",
            vec![
                id("id"),
                relation("author", "User", "PostToUser", &["authorId"], &["id"]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "names `authorId`, which is not a field of `Post`");
}

#[test]
fn foreign_key_names_relation_field() {
    let err = assert_err!(load(vec![
        model("User", vec![id("id"), many("posts", "Post", "PostToUser")]),
        model(
            "Post",
            vec![
                id("id"),
                relation("author", "User", "PostToUser", &["author"], &["id"]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "which is not a scalar field");
}

#[test]
fn foreign_key_length_mismatch() {
    let err = assert_err!(load(vec![
        model("User", vec![id("id"), many("posts", "Post", "PostToUser")]),
        model(
            "Post",
            vec![
                id("id"),
                scalar("authorId", "Int"),
                relation("author", "User", "PostToUser", &["authorId"], &[]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "lists 1 `relationFromFields` but 0 `relationToFields`");
}

#[test]
fn relation_name_shared_by_three_fields() {
    let err = assert_err!(load(vec![
        model(
            "User",
            vec![
                id("id"),
                many("posts", "Post", "PostToUser"),
                many("drafts", "Post", "PostToUser"),
            ]
        ),
        model(
            "Post",
            vec![
                id("id"),
                scalar("authorId", "Int"),
                relation("author", "User", "PostToUser", &["authorId"], &["id"]),
            ]
        ),
    ]));

    assert_invalid_schema(&err, "relation `PostToUser` is declared by more than two fields");
}

#[test]
fn relation_target_not_declared() {
    let err = assert_err!(load(vec![model(
        "Post",
        vec![id("id"), many("tags", "Tag", "PostToTag")]
    )]));

    assert_invalid_schema(&err, "`Post.tags` references model `Tag`, which is not declared");
}
