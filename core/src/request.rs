use std::borrow::Cow;

use http::header::HeaderName;
use http::HeaderMap;
use http::Method;
use http::Uri;

use crate::Error;
use crate::Result;

/// Signing context for request.
///
/// Built from a borrowed request, so signing never mutates the request
/// itself.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP path, as it appears on the wire (percent encoded).
    pub path: String,
    /// Raw HTTP query string without the leading `?`.
    pub query: Option<String>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &http::request::Parts) -> Self {
        Self::from_parts(&parts.method, &parts.uri, &parts.headers)
    }

    /// Build a signing context from method, uri and headers.
    pub fn from_parts(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let path = match uri.path() {
            "" => "/".to_string(),
            v => v.to_string(),
        };

        SigningRequest {
            method: method.clone(),
            path,
            query: uri.query().map(|v| v.to_string()),
            headers: headers.clone(),
        }
    }

    /// Get the path percent decoded.
    pub fn path_percent_decoded(&self) -> Cow<str> {
        percent_encoding::percent_decode_str(&self.path).decode_utf8_lossy()
    }

    /// Parse the raw query into decoded pairs.
    ///
    /// Unlike lenient form parsing, this fails on invalid percent escapes
    /// and on `;` separators.
    pub fn query_pairs(&self) -> Result<Vec<(String, String)>> {
        let Some(query) = self.query.as_deref() else {
            return Ok(Vec::new());
        };

        let mut pairs = Vec::new();
        for pair in query.split('&').filter(|v| !v.is_empty()) {
            if pair.contains(';') {
                return Err(Error::canonicalization_failed(format!(
                    "invalid semicolon separator in query: {query}"
                )));
            }

            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            pairs.push((query_unescape(k)?, query_unescape(v)?));
        }

        Ok(pairs)
    }

    /// Get the first decoded value of the given query parameter.
    pub fn query_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .query_pairs()?
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v))
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found. Values must be valid UTF-8.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => std::str::from_utf8(v.as_bytes()).map_err(|e| {
                Error::request_invalid(format!("header {key} is not valid utf-8")).with_source(e)
            }),
            None => Ok(""),
        }
    }

    /// Get header names with given prefix.
    ///
    /// Names are compared lowercased; repeated values are joined with `,`.
    /// Values are taken verbatim, invalid UTF-8 bytes are replaced.
    pub fn header_to_vec_with_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>> {
        let prefix = prefix.to_lowercase();

        let mut headers = Vec::new();
        for name in self.headers.keys() {
            let lower = name.as_str().trim().to_lowercase();
            if !lower.starts_with(&prefix) {
                continue;
            }

            let values = self
                .headers
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()))
                .collect::<Vec<_>>();
            headers.push((lower, values.join(",")));
        }

        Ok(headers)
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

/// Decode one query component: `+` is a space and every `%` must start a
/// valid two digit hex escape.
fn query_unescape(s: &str) -> Result<String> {
    let bs = s.as_bytes();
    let mut idx = 0;
    while idx < bs.len() {
        if bs[idx] == b'%' {
            let valid = bs.len() > idx + 2
                && bs[idx + 1].is_ascii_hexdigit()
                && bs[idx + 2].is_ascii_hexdigit();
            if !valid {
                return Err(Error::canonicalization_failed(format!(
                    "invalid URL escape in query component: {s:?}"
                )));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }

    let s = s.replace('+', " ");
    Ok(percent_encoding::percent_decode_str(&s)
        .decode_utf8_lossy()
        .into_owned())
}
