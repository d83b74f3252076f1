use std::fmt::{Debug, Formatter};

use azstore_core::hash::base64_decode;
use azstore_core::utils::{Redact, RedactBytes};
use azstore_core::{Error, Result};

/// Shared key credential of a storage account.
///
/// The key is decoded from its base64 form once, at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    account_name: String,
    account_key: Vec<u8>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &Redact::from(&self.account_name))
            .field("account_key", &RedactBytes::from(&self.account_key))
            .finish()
    }
}

impl Credential {
    /// Create a new credential from an account name and its base64 encoded key.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Result<Self> {
        let account_key = base64_decode(account_key).map_err(|e| {
            Error::credential_invalid("account key is not valid base64").with_source(e)
        })?;

        Ok(Self {
            account_name: account_name.to_string(),
            account_key,
        })
    }

    /// Name of the storage account.
    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Raw key bytes used for signing.
    pub fn account_key(&self) -> &[u8] {
        &self.account_key
    }
}
