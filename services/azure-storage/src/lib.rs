//! Shared key client for storage account services.
//!
//! This crate provides:
//!
//! - Shared Key Lite signing for the blob, queue and table services
//! - JSON bodies for table entities, with `@odata.type` annotations
//! - Structured decoding of service error responses
//!
//! # Example
//!
//! ```rust,no_run
//! use azstore::{Client, Config, MapTableEntity};
//! use azstore_core::{Context, OsEnv, Result};
//! use azstore_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Load account name and key from `AZURE_STORAGE_*` env.
//!     let config = Config::default().from_env(&ctx).with_defaults();
//!     let client = Client::new(ctx, config)?;
//!
//!     let entity = MapTableEntity::new()
//!         .with_property("PartitionKey", "pk")
//!         .with_property("RowKey", "rk")
//!         .with_property("Name", "foo");
//!
//!     let tables = client.table_service();
//!     tables.insert_entity("mytable", &entity).await?;
//!     let got = tables.query_entity("mytable", "pk", "rk").await?;
//!     println!("entity: {got:?}");
//!
//!     Ok(())
//! }
//! ```

mod constants;
pub use constants::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};

mod canonical;
pub use canonical::{canonical_header, canonical_resource};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{BlobQueueSigner, SignRequest, TableSigner};

mod entity;
pub use entity::{
    DescribeEntity, EdmType, EntitySchema, FieldDescriptor, MapTableEntity, MarshalJson,
    MarshaledTableEntity, StructTableEntity, TableEntity,
};

mod service_error;
pub use service_error::{
    ErrorFormat, ServiceError, StorageServiceError, TableErrorMessage, TableServiceError,
};

mod client;
pub use client::{check_response_code, Client, StorageResponse, UnexpectedStatusError};

mod table;
pub use table::{CreateTableParameters, QueryTablesResponse, TableName, TableServiceClient};

mod blob;
pub use blob::BlobServiceClient;

mod queue;
pub use queue::QueueServiceClient;
