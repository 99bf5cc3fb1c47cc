use async_graphql::{
    dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, Schema, TypeRef},
    Request,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tracker_graphql::{
    connections::spf::{SpfOrderField, SPF_BY_DOMAIN},
    schema::{
        Caller, FieldConnectionExt, ObjectConnectionExt, SchemaBuilderConnectionExt,
        TypeRefConnectionExt,
    },
    testing::{fixtures, LogLevel, MemorySource, RecordingLog},
    ConnectionLoader, CursorCodec, OwnerFilter,
};

fn build_schema(log: Arc<RecordingLog>) -> Schema {
    build_schema_with(fixtures::spf_scans(), log)
}

fn build_schema_with(source: MemorySource<SpfOrderField>, log: Arc<RecordingLog>) -> Schema {
    let loader = Arc::new(ConnectionLoader::new(SPF_BY_DOMAIN, source).with_log(log));

    let spf_scan = Object::new("SpfScan")
        .json_field("id", TypeRef::named_nn(TypeRef::ID))
        .json_field("timestamp", TypeRef::named(TypeRef::STRING))
        .json_field("lookups", TypeRef::named(TypeRef::INT))
        .json_field("record", TypeRef::named(TypeRef::STRING));

    let spf_field = Field::new(
        "spf",
        TypeRef::named(TypeRef::connection("SpfScan")),
        move |ctx| {
            let loader = loader.clone();
            FieldFuture::new(async move {
                let domain = ctx.args.try_get("domainId")?.string()?.to_string();
                loader
                    .resolve(&ctx, OwnerFilter::owner(format!("domains/{domain}")))
                    .await
            })
        },
    )
    .argument(InputValue::new("domainId", TypeRef::named_nn(TypeRef::ID)))
    .connection_arguments("SpfScan");

    Schema::build("Query", None, None)
        .register_paging_types()
        .register_connection_types::<SpfOrderField>("SpfScan")
        .register(spf_scan)
        .register(
            Object::new("Query").field(spf_field).field(Field::new(
                "service",
                TypeRef::named_nn(TypeRef::STRING),
                |_| FieldFuture::new(async { Ok(Some(FieldValue::value("tracker"))) }),
            )),
        )
        .data(Caller("users/1".to_string()))
        .finish()
        .unwrap()
}

#[tokio::test]
async fn test_ordered_connection_query() {
    let schema = build_schema(Arc::new(RecordingLog::default()));
    let cursor = |key: &str| CursorCodec::encode(SPF_BY_DOMAIN.name, key);

    let response = schema
        .execute(Request::new(
            r#"
            query {
                spf(domainId: "1", first: 2, orderBy: { field: LOOKUPS, direction: DESC }) {
                    totalCount
                    edges {
                        cursor
                        node {
                            id
                            lookups
                        }
                    }
                    pageInfo {
                        hasNextPage
                        hasPreviousPage
                        startCursor
                        endCursor
                    }
                }
            }
        "#,
        ))
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "spf": {
                "totalCount": 3,
                "edges": [
                    { "cursor": cursor("3"), "node": { "id": "3", "lookups": 8 } },
                    { "cursor": cursor("1"), "node": { "id": "1", "lookups": 5 } },
                ],
                "pageInfo": {
                    "hasNextPage": true,
                    "hasPreviousPage": false,
                    "startCursor": cursor("3"),
                    "endCursor": cursor("1"),
                },
            }
        })
    );
}

#[tokio::test]
async fn test_date_range_and_after_cursor() {
    let schema = build_schema(Arc::new(RecordingLog::default()));
    let after = CursorCodec::encode(SPF_BY_DOMAIN.name, "2");

    let response = schema
        .execute(Request::new(format!(
            r#"
            query {{
                spf(domainId: "1", last: 5, after: "{after}", startDate: "2023-01-02", endDate: "2023-01-03") {{
                    totalCount
                    edges {{ node {{ id }} }}
                    pageInfo {{ hasNextPage hasPreviousPage }}
                }}
            }}
        "#
        )))
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "spf": {
                "totalCount": 2,
                "edges": [{ "node": { "id": "3" } }],
                "pageInfo": { "hasNextPage": false, "hasPreviousPage": true },
            }
        })
    );
}

#[tokio::test]
async fn test_end_date_only() {
    let schema = build_schema(Arc::new(RecordingLog::default()));

    let response = schema
        .execute(Request::new(
            r#"
            query {
                spf(domainId: "1", first: 5, endDate: "2023-01-02") {
                    totalCount
                    edges { node { id } }
                    pageInfo { hasNextPage hasPreviousPage }
                }
            }
        "#,
        ))
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "spf": {
                "totalCount": 2,
                "edges": [{ "node": { "id": "1" } }, { "node": { "id": "2" } }],
                "pageInfo": { "hasNextPage": false, "hasPreviousPage": false },
            }
        })
    );
}

#[tokio::test]
async fn test_last_before_cursor() {
    let schema = build_schema(Arc::new(RecordingLog::default()));
    let cursor = |key: &str| CursorCodec::encode(SPF_BY_DOMAIN.name, key);
    let before = cursor("3");

    let response = schema
        .execute(Request::new(format!(
            r#"
            query {{
                spf(domainId: "1", last: 1, before: "{before}") {{
                    totalCount
                    edges {{ cursor node {{ id }} }}
                    pageInfo {{ hasNextPage hasPreviousPage startCursor endCursor }}
                }}
            }}
        "#
        )))
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({
            "spf": {
                "totalCount": 3,
                "edges": [{ "cursor": cursor("2"), "node": { "id": "2" } }],
                "pageInfo": {
                    "hasNextPage": true,
                    "hasPreviousPage": true,
                    "startCursor": cursor("2"),
                    "endCursor": cursor("2"),
                },
            }
        })
    );
}

#[tokio::test]
async fn test_invalid_limit_resolves_to_null_with_error() {
    let log = Arc::new(RecordingLog::default());
    let schema = build_schema(log.clone());

    let response = schema
        .execute(Request::new(
            r#"query { spf(domainId: "1", first: -1) { totalCount } }"#,
        ))
        .await;

    assert_eq!(response.data.into_json().unwrap(), json!({ "spf": null }));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "`first` on the `SPF` connection cannot be less than zero."
    );
    assert_eq!(
        log.messages(LogLevel::Warn),
        vec!["User: users/1 attempted to have `first` set below zero for: spfLoaderConnectionsByDomainId."]
    );
}

#[tokio::test]
async fn test_string_limit_reports_type() {
    let schema = build_schema(Arc::new(RecordingLog::default()));

    let response = schema
        .execute(Request::new(
            r#"query { spf(domainId: "1", last: "10") { totalCount } }"#,
        ))
        .await;

    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "`last` must be of type `number` not `string`."
    );
}

#[tokio::test]
async fn test_database_failure_message() {
    let log = Arc::new(RecordingLog::default());
    let schema = build_schema_with(fixtures::spf_scans().fail_query("timeout"), log.clone());

    let response = schema
        .execute(Request::new(
            r#"query { spf(domainId: "1", first: 1) { totalCount } }"#,
        ))
        .await;

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "spf": null })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "Unable to load SPF scan(s). Please try again."
    );
    let error = serde_json::to_value(&response.errors[0]).unwrap();
    assert_eq!(error["extensions"]["code"], json!("DATABASE_ERROR"));
    assert_eq!(
        log.messages(LogLevel::Error),
        vec!["Database error occurred while user: users/1 was trying to query SPF scan(s) in spfLoaderConnectionsByDomainId, error: Query failed: timeout"]
    );
}

#[tokio::test]
async fn test_failed_connection_leaves_sibling_fields() {
    let schema = build_schema(Arc::new(RecordingLog::default()));

    let response = schema
        .execute(Request::new(
            r#"query { spf(domainId: "1", first: 1, last: 1) { totalCount } service }"#,
        ))
        .await;

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "spf": null, "service": "tracker" })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "Passing both `first` and `last` to paginate the `SPF` connection is not supported."
    );
    let error = serde_json::to_value(&response.errors[0]).unwrap();
    assert_eq!(error["extensions"]["code"], json!("BOTH_LIMITS_SET"));
}
