use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in storage services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_REQUEST_ID: &str = "x-ms-request-id";
pub const X_MS_HEADER_PREFIX: &str = "x-ms-";
pub const CONTENT_MD5: &str = "content-md5";

// Values used in table service requests.
pub const NO_METADATA: &str = "application/json;odata=nometadata";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const ODATA_TYPE_SUFFIX: &str = "@odata.type";

// Service names used as the second label of the endpoint host.
pub const BLOB_SERVICE: &str = "blob";
pub const TABLE_SERVICE: &str = "table";
pub const QUEUE_SERVICE: &str = "queue";

/// Scheme token of the `Authorization` header.
pub const SHARED_KEY_LITE: &str = "SharedKeyLite";

// Env values used in storage services.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZURE_STORAGE_BASE_URL: &str = "AZURE_STORAGE_BASE_URL";
pub const AZURE_STORAGE_API_VERSION: &str = "AZURE_STORAGE_API_VERSION";
pub const AZURE_STORAGE_USE_HTTPS: &str = "AZURE_STORAGE_USE_HTTPS";

/// Domain name used for storage requests by default.
pub const DEFAULT_BASE_URL: &str = "core.windows.net";
/// Storage API version used by default.
pub const DEFAULT_API_VERSION: &str = "2014-02-14";

const UNRESERVED: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Query escaping: everything except `A-Z a-z 0-9 - _ . ~`.
///
/// Spaces are rendered as `+` by the callers, not by this set.
pub static QUERY_ESCAPE_SET: AsciiSet = UNRESERVED;

/// Canonical resource path escaping: query escaping that also keeps `/ , $ =`.
pub static RESOURCE_ENCODE_SET: AsciiSet = UNRESERVED
    .remove(b'/')
    .remove(b',')
    .remove(b'$')
    .remove(b'=');

/// Path escaping used when building endpoint URLs.
pub static PATH_ENCODE_SET: AsciiSet = UNRESERVED
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');
