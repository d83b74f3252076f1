use azstore::{
    CreateTableParameters, DescribeEntity, EdmType, EntitySchema, FieldDescriptor,
    MapTableEntity, MarshaledTableEntity, ServiceError, SignRequest, StructTableEntity,
    TableSigner,
};
use azstore_core::{ErrorKind, Result, SigningRequest};
use http::{Method, StatusCode};
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use serde::Serialize;
use serde_json::json;

use crate::mock::{MockHttpSend, ACCOUNT_NAME};

const NOT_FOUND_BODY: &str = r#"{"odata.error":{"code":"ResourceNotFound","message":{"lang":"en-US","value":"The specified resource does not exist."}}}"#;

#[tokio::test]
async fn test_query_tables() -> Result<()> {
    let mock = MockHttpSend::new().respond(
        StatusCode::OK,
        &[("content-type", "application/json")],
        r#"{"value":[{"TableName":"alpha"},{"TableName":"beta"}]}"#,
    );

    let resp = mock.client().table_service().query_tables().await?;
    let names: Vec<_> = resp.value.iter().map(|t| t.table_name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta"]);

    let req = mock.only_request();
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.uri.to_string(), "https://foo.table.core.windows.net/Tables");
    assert_eq!(req.header("accept"), Some("application/json;odata=nometadata"));
    assert_eq!(req.header("x-ms-version"), Some("2014-02-14"));
    assert!(req.header("x-ms-date").is_some());

    let expected = TableSigner::new(ACCOUNT_NAME).authorization(
        &SigningRequest::from_parts(&req.method, &req.uri, &req.headers),
        mock.client().credential(),
    )?;
    assert_eq!(req.header("authorization"), Some(expected.as_str()));
    Ok(())
}

#[tokio::test]
async fn test_query_tables_malformed_body() {
    let mock = MockHttpSend::new().respond(StatusCode::OK, &[], "not json");

    let err = mock
        .client()
        .table_service()
        .query_tables()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeserializationFailed);
}

#[tokio::test]
async fn test_create_table() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::CREATED, &[], "");

    mock.client()
        .table_service()
        .create_table(&CreateTableParameters::new("mytable"))
        .await?;

    let req = mock.only_request();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri.to_string(), "https://foo.table.core.windows.net/Tables");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.body.as_ref(), br#"{"TableName":"mytable"}"#);
    Ok(())
}

#[tokio::test]
async fn test_create_table_unexpected_status() {
    let mock = MockHttpSend::new().respond(StatusCode::OK, &[], "");

    let err = mock
        .client()
        .table_service()
        .create_table(&CreateTableParameters::new("mytable"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedStatus);
    assert_eq!(
        err.to_string(),
        "storage: status code from service response is 200 OK; was expecting 201 Created or 204 No Content"
    );
}

#[tokio::test]
async fn test_delete_table() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::NO_CONTENT, &[], "");

    mock.client().table_service().delete_table("mytable").await?;

    let req = mock.only_request();
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(
        req.uri.to_string(),
        "https://foo.table.core.windows.net/Tables%28%27mytable%27%29"
    );
    Ok(())
}

#[tokio::test]
async fn test_insert_map_entity() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::NO_CONTENT, &[], "");

    let entity = MapTableEntity::new()
        .with_property("PartitionKey", "mypartitionkey")
        .with_property("RowKey", "myrowkey")
        .with_property("Address", "Mountain View")
        .with_typed_property("Age", "255", EdmType::Int64);
    mock.client()
        .table_service()
        .insert_entity("mytable", &entity)
        .await?;

    let req = mock.only_request();
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.uri.to_string(), "https://foo.table.core.windows.net/mytable");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(
        String::from_utf8_lossy(&req.body),
        "{\n\t\"Address\": \"Mountain View\",\n\t\"Age\": \"255\",\n\t\"Age@odata.type\": \"Edm.Int64\",\n\t\"PartitionKey\": \"mypartitionkey\",\n\t\"RowKey\": \"myrowkey\"\n}"
    );
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Student {
    partition_key: String,
    row_key: String,
    name: String,
    credits: i64,
}

static STUDENT_SCHEMA: Lazy<EntitySchema> = Lazy::new(|| {
    EntitySchema::new()
        .field(FieldDescriptor::new("Name").with_serialized_name("name"))
        .typed_field("Credits", EdmType::Int64)
});

impl DescribeEntity for Student {
    fn entity_schema() -> &'static EntitySchema {
        &STUDENT_SCHEMA
    }
}

#[tokio::test]
async fn test_insert_struct_entity() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::CREATED, &[], "");

    let entity = StructTableEntity::from_record(Student {
        partition_key: "pk".to_string(),
        row_key: "rk".to_string(),
        name: "foo".to_string(),
        credits: 120,
    });
    mock.client()
        .table_service()
        .insert_entity("students", &entity)
        .await?;

    let body: serde_json::Value = serde_json::from_slice(&mock.only_request().body).unwrap();
    assert_eq!(
        body,
        json!({
            "Credits": 120,
            "Credits@odata.type": "Edm.Int64",
            "PartitionKey": "pk",
            "RowKey": "rk",
            "name": "foo",
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_insert_marshaled_entity() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::CREATED, &[], "");

    let raw = r#"{"Name":"foo", "PartitionKey": "pk", "RowKey": "rk"}"#;
    mock.client()
        .table_service()
        .insert_entity("mytable", &MarshaledTableEntity(raw))
        .await?;

    assert_eq!(mock.only_request().body.as_ref(), raw.as_bytes());
    Ok(())
}

#[tokio::test]
async fn test_insert_entity_requires_table_name() {
    let mock = MockHttpSend::new();

    let err = mock
        .client()
        .table_service()
        .insert_entity("", &MapTableEntity::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
    assert_eq!(err.to_string(), "storage: parameter is empty: tableName");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_insert_absent_struct_entity() {
    let mock = MockHttpSend::new();

    let entity = StructTableEntity::<Student>::from_option(None, &STUDENT_SCHEMA);
    let err = mock
        .client()
        .table_service()
        .insert_entity("students", &entity)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SerializationFailed);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_query_entity() -> Result<()> {
    let mock = MockHttpSend::new().respond(
        StatusCode::OK,
        &[],
        r#"{"PartitionKey":"pk","RowKey":"rk","Timestamp":"2014-06-04T16:18:20.4307735Z","Address":"Mountain View"}"#,
    );

    let entity = mock
        .client()
        .table_service()
        .query_entity("mytable", "pk", "rk")
        .await?;
    assert_eq!(entity.len(), 4);
    assert_eq!(entity.get("Address"), Some(&json!("Mountain View")));

    let req = mock.only_request();
    assert_eq!(req.method, Method::GET);
    assert_eq!(
        req.uri.to_string(),
        "https://foo.table.core.windows.net/mytable%28PartitionKey=%27pk%27,RowKey=%27rk%27%29"
    );
    assert_eq!(req.header("accept"), Some("application/json;odata=nometadata"));
    Ok(())
}

#[tokio::test]
async fn test_query_entity_requires_keys() {
    let mock = MockHttpSend::new();
    let tables = mock.client().table_service();

    for (table, pk, rk, name) in [
        ("", "pk", "rk", "tableName"),
        ("t", "", "rk", "partitionKey"),
        ("t", "pk", "", "rowKey"),
    ] {
        let err = tables.query_entity(table, pk, rk).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
        assert_eq!(err.to_string(), format!("storage: parameter is empty: {name}"));

        let err = tables.delete_entity(table, pk, rk).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParameterInvalid);
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_delete_entity() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::NO_CONTENT, &[], "");

    mock.client()
        .table_service()
        .delete_entity("mytable", "pk", "rk")
        .await?;

    let req = mock.only_request();
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(req.header("if-match"), Some("*"));
    Ok(())
}

#[tokio::test]
async fn test_delete_entity_not_found() {
    let mock = MockHttpSend::new().respond(
        StatusCode::NOT_FOUND,
        &[("x-ms-request-id", "102a2b55-eb35-4254-9daf-854db78a47bd")],
        NOT_FOUND_BODY,
    );

    let err = mock
        .client()
        .table_service()
        .delete_entity("mytable", "pk", "rk")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceError);

    let Some(ServiceError::Table(e)) = ServiceError::from_error(&err) else {
        panic!("expected table service error, got {err:?}");
    };
    assert_eq!(e.status_code, StatusCode::NOT_FOUND);
    assert_eq!(e.code, "ResourceNotFound");
    assert_eq!(e.message.lang, "en-US");
    assert_eq!(e.request_id, "102a2b55-eb35-4254-9daf-854db78a47bd");
}
