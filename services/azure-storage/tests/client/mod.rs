use azstore::{ErrorFormat, ServiceError, SignRequest, TableSigner};
use azstore_core::time::parse_http_date;
use azstore_core::{ErrorKind, Result, SigningRequest};
use bytes::Bytes;
use http::{Method, StatusCode};
use percent_encoding::percent_decode_str;
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::mock::{MockHttpSend, ACCOUNT_NAME};

#[test_case("blob", "", &[], "https://foo.blob.core.windows.net/", "/"; "empty path")]
#[test_case("blob", "path", &[], "https://foo.blob.core.windows.net/path", "/path"; "relative path")]
#[test_case("blob", "/path", &[], "https://foo.blob.core.windows.net/path", "/path"; "absolute path")]
#[test_case("blob", "/top(*')", &[], "https://foo.blob.core.windows.net/top%28%2A%27%29", "/top(*')"; "escaped path")]
#[test_case("blob", "", &[("a", "b"), ("c", "d")], "https://foo.blob.core.windows.net/?a=b&c=d", "/"; "query")]
#[test_case("blob", "/^$path", &[("a", "b"), ("c", "d")], "https://foo.blob.core.windows.net/%5E$path?a=b&c=d", "/^$path"; "escaped path with query")]
#[test_case("table", "Tables", &[("c", "d"), ("a", "b c")], "https://foo.table.core.windows.net/Tables?a=b+c&c=d", "/Tables"; "query sorted by key")]
fn test_endpoint(
    service: &str,
    path: &str,
    query: &[(&str, &str)],
    expected: &str,
    expected_path: &str,
) {
    let cli = MockHttpSend::new().client();

    let out = cli.endpoint(service, path, query).unwrap();
    assert_eq!(out.to_string(), expected);
    assert_eq!(
        percent_decode_str(out.path()).decode_utf8_lossy(),
        expected_path
    );
}

#[test]
fn test_standard_headers() {
    let cli = MockHttpSend::new().client();

    let headers = cli.standard_headers().unwrap();
    assert_eq!(headers.len(), 2);
    assert_eq!(
        headers.get("x-ms-version").unwrap().to_str().unwrap(),
        cli.api_version()
    );

    let date = headers
        .get("x-ms-date")
        .expect("x-ms-date must be set")
        .to_str()
        .unwrap();
    assert!(date.ends_with(" GMT"), "{date}");
    parse_http_date(date).expect("x-ms-date must be RFC 1123");
}

#[tokio::test]
async fn test_exec_signs_request() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::OK, &[], "{}");
    let cli = mock.client();
    let signer = TableSigner::new(ACCOUNT_NAME);

    let uri = cli.endpoint("table", "Tables", &[("$top", "1")])?;
    let resp = cli
        .exec(
            Method::GET,
            uri,
            cli.standard_headers()?,
            Bytes::new(),
            &signer,
            ErrorFormat::Json,
        )
        .await?;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, Bytes::from_static(b"{}"));

    let req = mock.only_request();
    assert_eq!(req.method, Method::GET);
    assert_eq!(
        req.uri.to_string(),
        "https://foo.table.core.windows.net/Tables?%24top=1"
    );

    let expected = signer.authorization(
        &SigningRequest::from_parts(&req.method, &req.uri, &req.headers),
        cli.credential(),
    )?;
    assert_eq!(req.header("authorization"), Some(expected.as_str()));
    assert!(expected.starts_with("SharedKeyLite foo:"));
    Ok(())
}

#[tokio::test]
async fn test_exec_empty_error_body() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::NOT_FOUND, &[], "");
    let cli = mock.client();

    let err = cli
        .exec(
            Method::GET,
            cli.endpoint("table", "Tables", &[])?,
            cli.standard_headers()?,
            Bytes::new(),
            &TableSigner::new(ACCOUNT_NAME),
            ErrorFormat::Json,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseWithoutBody);
    assert_eq!(
        err.to_string(),
        "storage: service returned without a response body (404 Not Found)"
    );
    Ok(())
}

#[tokio::test]
async fn test_exec_decodes_error_body() -> Result<()> {
    let body = r#"<?xml version="1.0" encoding="utf-8"?><Error><Code>ContainerNotFound</Code><Message>The specified container does not exist.</Message></Error>"#;
    let mock = MockHttpSend::new().respond(
        StatusCode::NOT_FOUND,
        &[("x-ms-request-id", "req-1")],
        body,
    );
    let cli = mock.client();

    let err = cli
        .exec(
            Method::DELETE,
            cli.endpoint("blob", "cnt", &[("restype", "container")])?,
            cli.standard_headers()?,
            Bytes::new(),
            &azstore::BlobQueueSigner::new(ACCOUNT_NAME),
            ErrorFormat::Xml,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceError);

    let Some(ServiceError::Storage(e)) = ServiceError::from_error(&err) else {
        panic!("expected storage service error, got {err:?}");
    };
    assert_eq!(e.code, "ContainerNotFound");
    assert_eq!(e.status_code, StatusCode::NOT_FOUND);
    assert_eq!(e.request_id, "req-1");
    Ok(())
}

#[test_case(StatusCode::OK; "ok")]
#[test_case(StatusCode::NOT_MODIFIED; "redirect class")]
#[test_case(StatusCode::from_u16(506).unwrap(); "above decoded range")]
#[tokio::test]
async fn test_exec_passes_through_other_statuses(status: StatusCode) -> Result<()> {
    let mock = MockHttpSend::new().respond(status, &[], "not an error document");
    let cli = mock.client();

    let resp = cli
        .exec(
            Method::GET,
            cli.endpoint("table", "Tables", &[])?,
            cli.standard_headers()?,
            Bytes::new(),
            &TableSigner::new(ACCOUNT_NAME),
            ErrorFormat::Json,
        )
        .await?;
    assert_eq!(resp.status, status);
    assert_eq!(resp.body, Bytes::from_static(b"not an error document"));
    Ok(())
}

#[tokio::test]
async fn test_exec_malformed_query_sends_nothing() -> Result<()> {
    let mock = MockHttpSend::new().respond(StatusCode::OK, &[], "");
    let cli = mock.client();

    let err = cli
        .exec(
            Method::GET,
            "https://foo.blob.core.windows.net/?comp=%zz".parse().unwrap(),
            cli.standard_headers()?,
            Bytes::new(),
            &azstore::BlobQueueSigner::new(ACCOUNT_NAME),
            ErrorFormat::Xml,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CanonicalizationFailed);
    assert!(mock.requests().is_empty());
    Ok(())
}
