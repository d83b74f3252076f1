use std::fmt::{Display, Formatter};

use azstore_core::time::{format_http_date, now};
use azstore_core::{Context, Error, Result, SigningRequest};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method, StatusCode, Uri};
use log::debug;
use percent_encoding::utf8_percent_encode;
use serde::de::DeserializeOwned;

use crate::canonical::query_escape;
use crate::constants::*;
use crate::{
    BlobServiceClient, Config, Credential, ErrorFormat, QueueServiceClient, SignRequest,
    TableServiceClient,
};

/// Client holds the account credential and endpoint settings of one storage
/// account.
///
/// Cloning is cheap, the transport is shared through [`Context`].
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    credential: Credential,
    use_https: bool,
    base_url: String,
    api_version: String,
}

impl Client {
    /// Create a client from config.
    ///
    /// Account name, account key and base URL are required. API version and
    /// scheme fall back to their defaults.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let account_name = config.account_name.unwrap_or_default();
        let account_key = config.account_key.unwrap_or_default();
        let base_url = config.base_url.unwrap_or_default();

        if account_name.is_empty() {
            return Err(Error::config_invalid("azure: account name required"));
        }
        if account_key.is_empty() {
            return Err(Error::config_invalid("azure: account key required"));
        }
        if base_url.is_empty() {
            return Err(Error::config_invalid(
                "azure: base storage service url required",
            ));
        }

        Ok(Self {
            ctx,
            credential: Credential::with_shared_key(&account_name, &account_key)?,
            use_https: config.use_https.unwrap_or(true),
            base_url,
            api_version: config
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        })
    }

    /// Create a client for the public cloud with the default API version over HTTPS.
    pub fn basic(ctx: Context, account_name: &str, account_key: &str) -> Result<Self> {
        Self::new(
            ctx,
            Config::default()
                .with_shared_key(account_name, account_key)
                .with_defaults(),
        )
    }

    /// Name of the storage account.
    pub fn account_name(&self) -> &str {
        self.credential.account_name()
    }

    /// Credential used to sign requests.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Value sent as `x-ms-version`.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Handle for the table service.
    pub fn table_service(&self) -> TableServiceClient {
        TableServiceClient::new(self.clone())
    }

    /// Handle for the blob service.
    pub fn blob_service(&self) -> BlobServiceClient {
        BlobServiceClient::new(self.clone())
    }

    /// Handle for the queue service.
    pub fn queue_service(&self) -> QueueServiceClient {
        QueueServiceClient::new(self.clone())
    }

    /// Build the URL of `path` on `service`.
    ///
    /// The host is `<account>.<service>.<base_url>`. A leading `/` is added to
    /// the path when missing. Query pairs are sorted by key.
    pub fn endpoint(&self, service: &str, path: &str, query: &[(&str, &str)]) -> Result<Uri> {
        let scheme = if self.use_https { "https" } else { "http" };

        let mut s = format!(
            "{scheme}://{}.{service}.{}",
            self.account_name(),
            self.base_url
        );
        if !path.starts_with('/') {
            s.push('/');
        }
        s.extend(utf8_percent_encode(path, &PATH_ENCODE_SET));

        let mut query = query.to_vec();
        query.sort_by(|a, b| a.0.cmp(b.0));
        for (idx, (k, v)) in query.iter().enumerate() {
            s.push(if idx == 0 { '?' } else { '&' });
            s.push_str(&query_escape(k));
            s.push('=');
            s.push_str(&query_escape(v));
        }

        Ok(s.parse()?)
    }

    /// Headers sent with every request: `x-ms-version` and `x-ms-date`.
    pub fn standard_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            HeaderName::from_static(X_MS_VERSION),
            HeaderValue::from_str(&self.api_version)?,
        );
        headers.insert(
            HeaderName::from_static(X_MS_DATE),
            HeaderValue::from_str(&format_http_date(now()))?,
        );
        Ok(headers)
    }

    /// Sign and send one request.
    ///
    /// Responses with a status in `400..=505` are turned into errors: an empty
    /// body gives `ResponseWithoutBody`, anything else is decoded with
    /// `errors`. Every other response is returned as is.
    pub async fn exec(
        &self,
        method: Method,
        uri: Uri,
        mut headers: HeaderMap,
        body: Bytes,
        signer: &dyn SignRequest,
        errors: ErrorFormat,
    ) -> Result<StorageResponse> {
        let authorization = {
            let req = SigningRequest::from_parts(&method, &uri, &headers);
            signer.authorization(&req, &self.credential)?
        };
        let mut value = HeaderValue::from_str(&authorization)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);

        debug!("sending request: {method} {uri}");
        let mut req = http::Request::builder().method(method).uri(uri).body(body)?;
        *req.headers_mut() = headers;

        let (parts, body) = self.ctx.http_send(req).await?.into_parts();
        let status = parts.status;
        debug!("got response: {status}");

        if (400..=505).contains(&status.as_u16()) {
            if body.is_empty() {
                return Err(Error::response_without_body(format!(
                    "storage: service returned without a response body ({status})"
                )));
            }

            let request_id = parts
                .headers
                .get(X_MS_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            return Err(errors.decode(&body, status, request_id));
        }

        Ok(StorageResponse {
            status,
            headers: parts.headers,
            body,
        })
    }
}

/// Response of a request that did not fail on the service side.
#[derive(Debug, Clone)]
pub struct StorageResponse {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Whole response body.
    pub body: Bytes,
}

impl StorageResponse {
    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::deserialization_failed(format!(
                "storage: error deserializing response body: {e}"
            ))
            .with_source(e)
        })
    }
}

/// UnexpectedStatusError is returned when the service answers with neither an
/// error nor one of the statuses an operation allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedStatusError {
    /// Statuses the operation allows.
    pub allowed: Vec<StatusCode>,
    /// Status actually received.
    pub got: StatusCode,
}

impl Display for UnexpectedStatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "storage: status code from service response is {}; was expecting ",
            self.got
        )?;
        for (idx, v) in self.allowed.iter().enumerate() {
            if idx > 0 {
                f.write_str(" or ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnexpectedStatusError {}

/// Check that `status` is one of `allowed`.
pub fn check_response_code(status: StatusCode, allowed: &[StatusCode]) -> Result<()> {
    if allowed.contains(&status) {
        return Ok(());
    }

    let err = UnexpectedStatusError {
        allowed: allowed.to_vec(),
        got: status,
    };
    Err(Error::unexpected_status(err.to_string()).with_source(err))
}
