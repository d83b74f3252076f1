//! Core components for shared key signed storage clients.
//!
//! This crate provides the foundational types shared by the azstore crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **SigningRequest**: A borrowed-and-cloned view of a request used to build the string to sign
//! - **Error**: The error type returned by every azstore operation
//!
//! ## Example
//!
//! ```no_run
//! use azstore_core::{Context, OsEnv, SigningRequest};
//!
//! let ctx = Context::new().with_env(OsEnv);
//!
//! let (parts, _) = http::Request::get("https://account.table.core.windows.net/Tables")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//! let req = SigningRequest::build(&parts);
//! assert_eq!(req.path, "/Tables");
//! ```
//!
//! ## Traits
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod request;
pub use request::SigningRequest;

mod error;
pub use error::{Error, ErrorKind, Result};
