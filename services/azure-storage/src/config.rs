use azstore_core::utils::Redact;
use azstore_core::Context;
use log::warn;

use crate::constants::*;

/// Config carries all the configuration for storage clients.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`]
    pub account_name: Option<String>,
    /// `account_key` is the base64 encoded shared key, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`]
    pub account_key: Option<String>,
    /// `base_url` is the domain the service hosts live under, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_BASE_URL`]
    ///
    /// Falls back to [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    /// `api_version` is sent as `x-ms-version`, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_API_VERSION`]
    ///
    /// Falls back to [`DEFAULT_API_VERSION`].
    pub api_version: Option<String>,
    /// `use_https` selects the endpoint scheme, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_USE_HTTPS`]
    ///
    /// Falls back to `true`.
    pub use_https: Option<bool>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("use_https", &self.use_https)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.account_name.is_none() {
            self.account_name = envs.get(AZURE_STORAGE_ACCOUNT_NAME).cloned();
        }
        if self.account_key.is_none() {
            self.account_key = envs.get(AZURE_STORAGE_ACCOUNT_KEY).cloned();
        }
        if self.base_url.is_none() {
            self.base_url = envs.get(AZURE_STORAGE_BASE_URL).cloned();
        }
        if self.api_version.is_none() {
            self.api_version = envs.get(AZURE_STORAGE_API_VERSION).cloned();
        }
        if self.use_https.is_none() {
            if let Some(v) = envs.get(AZURE_STORAGE_USE_HTTPS) {
                self.use_https = parse_bool(v);
                if self.use_https.is_none() {
                    warn!("ignoring invalid {AZURE_STORAGE_USE_HTTPS} value: {v}");
                }
            }
        }

        self
    }

    /// Set the account name and the base64 encoded account key.
    pub fn with_shared_key(mut self, account_name: &str, account_key: &str) -> Self {
        self.account_name = Some(account_name.to_string());
        self.account_key = Some(account_key.to_string());
        self
    }

    /// Fill unset optional fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        self.base_url.get_or_insert_with(|| DEFAULT_BASE_URL.to_string());
        self.api_version
            .get_or_insert_with(|| DEFAULT_API_VERSION.to_string());
        self.use_https.get_or_insert(true);
        self
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
