//! Canonical forms of request headers and resources used in the string to sign.
//!
//! ## Reference
//!
//! - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
//! - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#shared-key-lite-and-table-service-format-for-2009-09-19-and-later)

use azstore_core::{Result, SigningRequest};
use percent_encoding::{utf8_percent_encode, AsciiSet};

use crate::constants::*;

/// Build the canonicalized headers string.
///
/// Only `x-ms-*` headers take part. They are sorted by lowercased name and
/// joined as `name:value` lines, without a trailing newline. Values are kept
/// verbatim.
pub fn canonical_header(req: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        req.header_to_vec_with_prefix(X_MS_HEADER_PREFIX)?,
        ":",
        "\n",
    ))
}

/// Build the canonicalized resource string: `/<account><path>[?comp=<value>]`.
///
/// Every other query parameter is left out of the signature.
pub fn canonical_resource(account_name: &str, req: &SigningRequest) -> Result<String> {
    let mut s = String::with_capacity(account_name.len() + req.path.len() + 1);
    s.push('/');
    s.push_str(account_name);
    s.push_str(&escape(&req.path_percent_decoded(), &RESOURCE_ENCODE_SET));

    if let Some(comp) = req.query_get("comp")?.filter(|v| !v.is_empty()) {
        s.push_str("?comp=");
        s.push_str(&query_escape(&comp));
    }

    Ok(s)
}

/// Escape a string so it can be placed in a query component.
pub(crate) fn query_escape(s: &str) -> String {
    escape(s, &QUERY_ESCAPE_SET)
}

/// Percent escape everything in `set`, rendering spaces as `+`.
pub(crate) fn escape(s: &str, set: &'static AsciiSet) -> String {
    s.split(' ')
        .map(|part| utf8_percent_encode(part, set).to_string())
        .collect::<Vec<_>>()
        .join("+")
}
