use quarry_core::schema::{
    AggregateFunction, InputTy, Manifest, OperationKind, RootKind, ScalarKind, Schema,
};
use serde_json::{json, Value as Json};
use std_util::prelude::*;

fn user_model() -> Json {
    json!({
        "name": "User",
        "fields": [
            { "name": "id", "kind": "scalar", "type": "Int", "isRequired": true, "isId": true },
            { "name": "email", "kind": "scalar", "type": "String", "isRequired": true, "isUnique": true },
            { "name": "age", "kind": "scalar", "type": "Int" },
            { "name": "role", "kind": "enum", "type": "Role", "isRequired": true },
        ],
    })
}

fn field(name: &str, ty: &str, location: &str) -> Json {
    json!({
        "name": name,
        "inputTypes": [{ "type": ty, "location": location }],
    })
}

fn output(name: &str, ty: &str, location: &str, args: Vec<Json>) -> Json {
    json!({
        "name": name,
        "args": args,
        "isRequired": false,
        "isNullable": true,
        "outputType": { "type": ty, "location": location },
    })
}

/// A manifest with one `User` model, its unique lookup, and an aggregate.
fn base() -> Json {
    json!({
        "datamodel": {
            "models": [user_model()],
            "enums": [{ "name": "Role", "values": [{ "name": "ADMIN" }, { "name": "MEMBER" }] }],
        },
        "schema": {
            "enumTypes": [{ "name": "Role", "values": ["ADMIN", "MEMBER"] }],
            "inputObjectTypes": [
                {
                    "name": "UserWhereUniqueInput",
                    "constraints": { "minNumFields": 1, "maxNumFields": 1 },
                    "fields": [field("id", "Int", "scalar"), field("email", "String", "scalar")],
                },
                {
                    "name": "UserWhereInput",
                    "fields": [
                        {
                            "name": "age",
                            "isNullable": true,
                            "inputTypes": [{ "type": "Int", "location": "scalar" }],
                        },
                        field("role", "Role", "enumTypes"),
                        {
                            "name": "AND",
                            "inputTypes": [
                                { "type": "UserWhereInput", "location": "inputObjectTypes" },
                                { "type": "UserWhereInput", "location": "inputObjectTypes", "isList": true },
                            ],
                        },
                    ],
                },
            ],
            "outputObjectTypes": [
                {
                    "name": "User",
                    "fields": [
                        output("id", "Int", "scalar", vec![]),
                        output("email", "String", "scalar", vec![]),
                    ],
                },
                {
                    "name": "UserAvgAggregateOutputType",
                    "fields": [output("id", "Float", "scalar", vec![]), output("age", "Float", "scalar", vec![])],
                },
                {
                    "name": "AggregateUser",
                    "fields": [output("_avg", "UserAvgAggregateOutputType", "outputObjectTypes", vec![])],
                },
                {
                    "name": "Query",
                    "fields": [
                        output("findUniqueUser", "User", "outputObjectTypes", vec![json!({
                            "name": "where",
                            "isRequired": true,
                            "inputTypes": [{ "type": "UserWhereUniqueInput", "location": "inputObjectTypes" }],
                        })]),
                        output("aggregateUser", "AggregateUser", "outputObjectTypes", vec![]),
                    ],
                },
                { "name": "Mutation", "fields": [] },
            ],
        },
        "mappings": {
            "modelOperations": [
                { "model": "User", "plural": "users", "findUnique": "findUniqueUser", "aggregate": "aggregateUser" },
            ],
        },
    })
}

fn load(manifest: Json) -> quarry_core::Result<Schema> {
    let manifest: Manifest = serde_json::from_value(manifest).expect("manifest should deserialize");
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
fn lookups_by_name_and_id() {
    let schema = assert_ok!(load(base()));

    let user = assert_some!(schema.model("User"));
    assert_eq!(schema[user.id].name, "User");

    let email = assert_some!(user.field("email"));
    assert_eq!(schema[email.id].name, "email");
    assert_eq!(email.full_name(&schema), "User.email");
    assert_eq!(email.ty.as_scalar(), Some(ScalarKind::String));

    let unique = assert_some!(schema.input_type("UserWhereUniqueInput"));
    assert!(unique.constraints.is_exactly_one());
    assert_eq!(schema[unique.id].name, "UserWhereUniqueInput");

    let role = assert_some!(schema.enumeration("Role"));
    assert!(role.contains("ADMIN"));
    assert!(!role.contains("OWNER"));

    assert_none!(schema.model("Post"));
    assert_none!(schema.output_type("Post"));
}

#[test]
fn identifying_keys_include_unique_fields() {
    let schema = assert_ok!(load(base()));
    let user = schema.model("User").unwrap();

    let keys: Vec<Vec<String>> = user
        .identifying_keys()
        .map(|key| key.iter().map(|id| schema[*id].name.clone()).collect())
        .collect();

    assert_eq!(keys, vec![vec!["id".to_string()], vec!["email".to_string()]]);
}

#[test]
fn operations_are_bound_to_models() {
    let schema = assert_ok!(load(base()));
    let user = schema.model("User").unwrap();

    let find = assert_some!(schema.operation_for(user.id, OperationKind::FindUnique));
    assert_eq!(find.name, "findUniqueUser");
    assert_eq!(find.root, RootKind::Query);
    assert!(find.args().contains_key("where"));
    assert!(find.returns_nullable());
    assert!(!find.returns_list());

    assert_none!(schema.operation_for(user.id, OperationKind::FindMany));
    assert_eq!(schema.operation("aggregateUser").unwrap().kind, OperationKind::Aggregate);

    let avg = assert_some!(schema.aggregate_output(user.id, AggregateFunction::Avg));
    assert_eq!(avg.name, "UserAvgAggregateOutputType");
    assert_none!(schema.aggregate_output(user.id, AggregateFunction::Sum));
}

#[test]
fn aggregate_fields_keep_the_declared_spelling() {
    let mut manifest = base();
    manifest["schema"]["outputObjectTypes"][2]["fields"][0]["name"] = json!("avg");

    let schema = assert_ok!(load(manifest));
    let user = schema.model("User").unwrap();

    let avg = assert_some!(schema.aggregate_output(user.id, AggregateFunction::Avg));
    assert_eq!(avg.name, "UserAvgAggregateOutputType");

    let root = schema.output_type("AggregateUser").unwrap();
    assert_eq!(root.aggregate_field(AggregateFunction::Avg).unwrap().name, "avg");
    assert_none!(root.aggregate_field(AggregateFunction::Max));
}

#[test]
fn group_by_mapping() {
    let mut manifest = base();
    manifest["schema"]["outputObjectTypes"][3]["fields"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "name": "groupByUser",
            "args": [],
            "isRequired": true,
            "outputType": { "type": "AggregateUser", "location": "outputObjectTypes", "isList": true },
        }));
    manifest["mappings"]["modelOperations"][0]["groupBy"] = json!("groupByUser");

    let schema = assert_ok!(load(manifest));
    let user = schema.model("User").unwrap();

    let group_by = assert_some!(schema.operation_for(user.id, OperationKind::GroupBy));
    assert_eq!(group_by.name, "groupByUser");
    assert_eq!(group_by.root, RootKind::Query);
    assert!(group_by.returns_list());
}

#[test]
fn nullable_input_fields_gain_null_alternative() {
    let schema = assert_ok!(load(base()));
    let filter = schema.input_type("UserWhereInput").unwrap();

    let age = filter.field("age").unwrap();
    assert!(age.accepts_null());
    assert_eq!(age.alternatives.last().unwrap().ty, InputTy::Null);

    let role = filter.field("role").unwrap();
    assert!(!role.accepts_null());
    assert!(matches!(role.alternatives[0].ty, InputTy::Enum(_)));

    let and = filter.field("AND").unwrap();
    let described: Vec<String> = and.alternatives.iter().map(|alt| alt.describe(&schema)).collect();
    assert_eq!(described, ["UserWhereInput", "List<UserWhereInput>"]);
}

#[test]
fn explicit_null_alternatives() {
    let mut manifest = base();
    manifest["schema"]["inputObjectTypes"][1]["fields"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "name": "email",
            "inputTypes": [
                { "type": "String", "location": "scalar" },
                { "type": "Null", "location": "scalar" },
            ],
        }));
    manifest["schema"]["inputObjectTypes"][1]["fields"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "name": "id",
            "inputTypes": [{ "type": "Int", "location": "scalar" }, { "type": "Null", "location": "null" }],
        }));

    let schema = assert_ok!(load(manifest));
    let filter = schema.input_type("UserWhereInput").unwrap();

    assert!(filter.field("email").unwrap().accepts_null());
    assert!(filter.field("id").unwrap().accepts_null());
    assert_eq!(filter.field("id").unwrap().non_null_alternatives().count(), 1);
}

#[test]
fn model_without_identifier() {
    let mut manifest = base();
    manifest["datamodel"]["models"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "name": "Log",
            "fields": [{ "name": "line", "kind": "scalar", "type": "String", "isRequired": true }],
        }));

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "model `Log` has no identifying field");
}

#[test]
fn compound_id_identifies_model() {
    let mut manifest = base();
    manifest["datamodel"]["models"]
        .as_array_mut()
        .unwrap()
        .push(json!({
            "name": "Membership",
            "fields": [
                { "name": "userId", "kind": "scalar", "type": "Int", "isRequired": true },
                { "name": "groupId", "kind": "scalar", "type": "Int", "isRequired": true },
            ],
            "idFields": ["userId", "groupId"],
        }));

    let schema = assert_ok!(load(manifest));
    let membership = schema.model("Membership").unwrap();
    assert_eq!(membership.primary_key.len(), 2);
    assert!(membership.has_identifier());
}

#[test]
fn dangling_input_type_reference() {
    let mut manifest = base();
    manifest["schema"]["inputObjectTypes"][1]["fields"][0]["inputTypes"] =
        json!([{ "type": "IntFilter", "location": "inputObjectTypes" }]);

    let err = assert_err!(load(manifest));
    assert_invalid_schema(
        &err,
        "`UserWhereInput.age` references input type `IntFilter`, which is not declared",
    );
}

#[test]
fn unknown_scalar_type() {
    let mut manifest = base();
    manifest["datamodel"]["models"][0]["fields"][2]["type"] = json!("Integer");

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "field `User.age` has unknown scalar type `Integer`");
}

#[test]
fn mapping_names_missing_root_field() {
    let mut manifest = base();
    manifest["mappings"]["modelOperations"][0]["findMany"] = json!("findManyUser");

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "operation `findManyUser` mapped as `User.findMany` is not a field of `Query`");
}

#[test]
fn mapping_declared_twice() {
    let mut manifest = base();
    manifest["mappings"]["modelOperations"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "model": "User", "findUnique": "findUniqueUser" }));

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "model `User` maps `findUnique` more than once");
}

#[test]
fn average_of_non_numeric_field() {
    let mut manifest = base();
    manifest["schema"]["outputObjectTypes"][1]["fields"]
        .as_array_mut()
        .unwrap()
        .push(output("email", "Float", "scalar", vec![]));

    let err = assert_err!(load(manifest));
    assert_invalid_schema(
        &err,
        "aggregate output type `UserAvgAggregateOutputType` lists `email`, which is not a numeric field of `User`",
    );
}

#[test]
fn enum_declarations_must_agree() {
    let mut manifest = base();
    manifest["schema"]["enumTypes"][0]["values"] = json!(["ADMIN"]);

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "enum `Role` is declared twice with different values");
}

#[test]
fn root_query_type_is_required() {
    let mut manifest = base();
    manifest["schema"]["rootQueryType"] = json!("RootQuery");

    let err = assert_err!(load(manifest));
    assert_invalid_schema(&err, "root query type `RootQuery` is not declared");
}

#[test]
fn manifest_from_json_text() {
    let manifest = assert_ok!(Manifest::from_json(&base().to_string()));
    assert_ok!(Schema::load(&manifest));

    let err = assert_err!(Manifest::from_json("{ \"datamodel\": "));
    assert!(!err.is_invalid_schema());
    assert!(err.to_string().contains("EOF"), "{err}");
}
