use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azstore::Client;
use azstore_core::{Context, Error, HttpSend, Result};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};

pub const ACCOUNT_NAME: &str = "foo";
/// base64 of `bar`.
pub const ACCOUNT_KEY: &str = "YmFy";

/// A request as seen by the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// MockHttpSend records every request and replays canned responses in order.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<VecDeque<http::Response<Bytes>>>>,
}

impl MockHttpSend {
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub fn respond(self, status: StatusCode, headers: &[(&str, &str)], body: &str) -> Self {
        let mut builder = http::Response::builder().status(status);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let resp = builder
            .body(Bytes::copy_from_slice(body.as_bytes()))
            .expect("response must be valid");

        self.responses.lock().unwrap().push_back(resp);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:?}");
        requests.into_iter().next().unwrap()
    }

    pub fn client(&self) -> Client {
        Client::basic(
            Context::new().with_http_send(self.clone()),
            ACCOUNT_NAME,
            ACCOUNT_KEY,
        )
        .expect("client must be valid")
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.requests.lock().unwrap().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::unexpected("no canned response left"))
    }
}
