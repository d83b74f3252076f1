use std::fmt::{Debug, Write};

use azstore_core::hash::base64_hmac_sha256;
use azstore_core::{Error, Result, SigningRequest};
use http::header;
use log::debug;

use crate::canonical::{canonical_header, canonical_resource};
use crate::constants::*;
use crate::Credential;

/// SignRequest builds the `Authorization` value of a storage request.
///
/// Implementations only decide the string to sign; the keyed hash and the
/// header layout are shared.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
pub trait SignRequest: Debug + Send + Sync + 'static {
    /// Scheme token placed before the signature.
    fn auth_scheme(&self) -> &'static str;

    /// Construct the string to sign for the request.
    fn string_to_sign(&self, req: &SigningRequest) -> Result<String>;

    /// Compute `<scheme> <account>:<signature>` for the request.
    ///
    /// Signing is pure: the same request and credential always give the
    /// same value.
    fn authorization(&self, req: &SigningRequest, cred: &Credential) -> Result<String> {
        let string_to_sign = self.string_to_sign(req).map_err(|e| {
            Error::new(
                e.kind(),
                format!("storage: error parsing the request for signing: {e}"),
            )
            .with_source(e)
        })?;

        let signature = base64_hmac_sha256(cred.account_key(), string_to_sign.as_bytes());
        Ok(format!(
            "{} {}:{}",
            self.auth_scheme(),
            cred.account_name(),
            signature
        ))
    }
}

/// Signer for blob service and queue service requests.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// Every canonicalized header line ends with `\n`, so an empty header block
/// adds nothing between `Date` and the resource.
///
/// ## Reference
///
/// - [Blob and Queue services (Shared Key Lite authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#blob-queue-and-file-services-shared-key-lite-authorization)
#[derive(Debug, Clone)]
pub struct BlobQueueSigner {
    account_name: String,
}

impl BlobQueueSigner {
    /// Create a signer for the given account.
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
        }
    }
}

impl SignRequest for BlobQueueSigner {
    fn auth_scheme(&self) -> &'static str {
        SHARED_KEY_LITE
    }

    fn string_to_sign(&self, req: &SigningRequest) -> Result<String> {
        let canonical_header = canonical_header(req)?;
        let canonical_resource = canonical_resource(&self.account_name, req)?;

        let mut s = String::with_capacity(128);
        writeln!(&mut s, "{}", req.method.as_str())?;
        writeln!(
            &mut s,
            "{}",
            req.header_get_or_default(&header::HeaderName::from_static(CONTENT_MD5))?
        )?;
        writeln!(
            &mut s,
            "{}",
            req.header_get_or_default(&header::CONTENT_TYPE)?
        )?;
        writeln!(&mut s, "{}", req.header_get_or_default(&header::DATE)?)?;
        if !canonical_header.is_empty() {
            writeln!(&mut s, "{canonical_header}")?;
        }
        write!(&mut s, "{canonical_resource}")?;

        debug!("string to sign: {}", &s);

        Ok(s)
    }
}

/// Signer for table service requests.
///
/// ## Format
///
/// ```text
/// x-ms-date + "\n" +
/// CanonicalizedResource;
/// ```
///
/// The `Date` header is used when `x-ms-date` is not set.
///
/// ## Reference
///
/// - [Table service (Shared Key Lite authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#table-service-shared-key-lite-authorization)
#[derive(Debug, Clone)]
pub struct TableSigner {
    account_name: String,
}

impl TableSigner {
    /// Create a signer for the given account.
    pub fn new(account_name: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
        }
    }
}

impl SignRequest for TableSigner {
    fn auth_scheme(&self) -> &'static str {
        SHARED_KEY_LITE
    }

    fn string_to_sign(&self, req: &SigningRequest) -> Result<String> {
        let canonical_resource = canonical_resource(&self.account_name, req)?;

        let date = match req.header_get_or_default(&header::HeaderName::from_static(X_MS_DATE))? {
            "" => req.header_get_or_default(&header::DATE)?,
            v => v,
        };

        let s = format!("{date}\n{canonical_resource}");
        debug!("string to sign: {}", &s);

        Ok(s)
    }
}
