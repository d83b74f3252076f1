//! Structured errors returned by the storage services.

use azstore_core::Error;
use http::StatusCode;
use serde::Deserialize;

/// Error returned by the blob and queue services.
///
/// Some fields are only filled by certain API calls.
///
/// - [Status and error codes](https://docs.microsoft.com/en-us/rest/api/storageservices/status-and-error-codes2)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "storage: service returned error: StatusCode={}, ErrorCode={}, ErrorMessage={}, RequestId={}",
    .status_code.as_u16(), .code, .message, .request_id
)]
pub struct StorageServiceError {
    /// Service error code, e.g. `ContainerAlreadyExists`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Detail of authentication failures.
    pub authentication_error_detail: String,
    /// Name of the offending query parameter.
    pub query_parameter_name: String,
    /// Value of the offending query parameter.
    pub query_parameter_value: String,
    /// Reason of the failure.
    pub reason: String,
    /// HTTP status of the response.
    pub status_code: StatusCode,
    /// Value of the `x-ms-request-id` response header.
    pub request_id: String,
}

/// Message of a table service error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableErrorMessage {
    /// Language tag, e.g. `en-US`.
    pub lang: String,
    /// Message text.
    pub value: String,
}

/// Error returned by the table service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "storage: table service returned error: StatusCode={} ErrorCode={} ErrorMessage={:?}",
    .status_code.as_u16(), .code, .message.value
)]
pub struct TableServiceError {
    /// Service error code, e.g. `ResourceNotFound`.
    pub code: String,
    /// Localized message.
    pub message: TableErrorMessage,
    /// HTTP status of the response.
    pub status_code: StatusCode,
    /// Value of the `x-ms-request-id` response header.
    pub request_id: String,
}

/// ServiceError is a well-formed error response of a storage service.
///
/// It is carried as the source of an [`Error`] with kind
/// [`ErrorKind::ServiceError`](azstore_core::ErrorKind::ServiceError).
///
/// ```
/// use azstore::{ErrorFormat, ServiceError};
/// use http::StatusCode;
///
/// let err = ErrorFormat::Xml.decode(
///     b"<Error><Code>ContainerNotFound</Code><Message>gone</Message></Error>",
///     StatusCode::NOT_FOUND,
///     "req-1",
/// );
/// let service_err = ServiceError::from_error(&err).unwrap();
/// assert_eq!(service_err.code(), "ContainerNotFound");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Blob or queue service error.
    #[error(transparent)]
    Storage(#[from] StorageServiceError),
    /// Table service error.
    #[error(transparent)]
    Table(#[from] TableServiceError),
}

impl ServiceError {
    /// Recover the structured error carried by `err`, if any.
    pub fn from_error(err: &Error) -> Option<&ServiceError> {
        err.downcast_source_ref::<ServiceError>()
    }

    /// Service error code.
    pub fn code(&self) -> &str {
        match self {
            ServiceError::Storage(e) => &e.code,
            ServiceError::Table(e) => &e.code,
        }
    }

    /// Service error message.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Storage(e) => &e.message,
            ServiceError::Table(e) => &e.message.value,
        }
    }

    /// HTTP status of the failed response.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Storage(e) => e.status_code,
            ServiceError::Table(e) => e.status_code,
        }
    }

    /// Request id assigned by the service.
    pub fn request_id(&self) -> &str {
        match self {
            ServiceError::Storage(e) => &e.request_id,
            ServiceError::Table(e) => &e.request_id,
        }
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        Error::service_error(err.to_string()).with_source(err)
    }
}

/// Format of error bodies sent by a storage service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    /// `<Error>` documents of the blob and queue services.
    Xml,
    /// `{"odata.error": ...}` documents of the table service.
    Json,
}

impl ErrorFormat {
    /// Decode an error body into an [`Error`].
    ///
    /// A well-formed body gives kind `ServiceError`, anything else gives
    /// `DeserializationFailed` with the raw body in the message.
    pub fn decode(&self, body: &[u8], status_code: StatusCode, request_id: &str) -> Error {
        let decoded = match self {
            ErrorFormat::Xml => decode_xml(body, status_code, request_id).map(ServiceError::from),
            ErrorFormat::Json => decode_json(body, status_code, request_id).map(ServiceError::from),
        };

        match decoded {
            Ok(e) => e.into(),
            Err(e) => Error::deserialization_failed(format!(
                "storage: error deserializing error: {e}\nbody={:?}",
                String::from_utf8_lossy(body)
            ))
            .with_source(e),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct XmlErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "AuthenticationErrorDetail")]
    authentication_error_detail: String,
    #[serde(rename = "QueryParameterName")]
    query_parameter_name: String,
    #[serde(rename = "QueryParameterValue")]
    query_parameter_value: String,
    #[serde(rename = "Reason")]
    reason: String,
}

fn decode_xml(
    body: &[u8],
    status_code: StatusCode,
    request_id: &str,
) -> anyhow::Result<StorageServiceError> {
    let text = std::str::from_utf8(body)?;
    let e: XmlErrorBody = quick_xml::de::from_str(text)?;

    Ok(StorageServiceError {
        code: e.code,
        message: e.message,
        authentication_error_detail: e.authentication_error_detail,
        query_parameter_name: e.query_parameter_name,
        query_parameter_value: e.query_parameter_value,
        reason: e.reason,
        status_code,
        request_id: request_id.to_string(),
    })
}

#[derive(Deserialize)]
struct JsonErrorEnvelope {
    #[serde(rename = "odata.error", default)]
    error: JsonErrorBody,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct JsonErrorBody {
    code: String,
    message: TableErrorMessage,
}

fn decode_json(
    body: &[u8],
    status_code: StatusCode,
    request_id: &str,
) -> anyhow::Result<TableServiceError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        anyhow::bail!("expected a JSON object, got {value}");
    }
    let e: JsonErrorEnvelope = serde_json::from_value(value)?;

    Ok(TableServiceError {
        code: e.error.code,
        message: e.error.message,
        status_code,
        request_id: request_id.to_string(),
    })
}
