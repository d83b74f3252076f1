use azstore_core::{Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::client::{check_response_code, Client};
use crate::constants::*;
use crate::{BlobQueueSigner, ErrorFormat};

/// BlobServiceClient runs container operations against the blob service.
#[derive(Debug, Clone)]
pub struct BlobServiceClient {
    client: Client,
    signer: BlobQueueSigner,
}

impl BlobServiceClient {
    pub(crate) fn new(client: Client) -> Self {
        let signer = BlobQueueSigner::new(client.account_name());
        Self { client, signer }
    }

    /// Create a container.
    ///
    /// - [Create Container](https://docs.microsoft.com/en-us/rest/api/storageservices/create-container)
    pub async fn create_container(&self, name: &str) -> Result<()> {
        self.container_op(Method::PUT, name, StatusCode::CREATED)
            .await
    }

    /// Delete a container.
    ///
    /// - [Delete Container](https://docs.microsoft.com/en-us/rest/api/storageservices/delete-container)
    pub async fn delete_container(&self, name: &str) -> Result<()> {
        self.container_op(Method::DELETE, name, StatusCode::ACCEPTED)
            .await
    }

    async fn container_op(&self, method: Method, name: &str, allowed: StatusCode) -> Result<()> {
        if name.is_empty() {
            return Err(Error::parameter_invalid("containerName"));
        }

        let uri = self
            .client
            .endpoint(BLOB_SERVICE, name, &[("restype", "container")])?;
        let resp = self
            .client
            .exec(
                method,
                uri,
                self.client.standard_headers()?,
                Bytes::new(),
                &self.signer,
                ErrorFormat::Xml,
            )
            .await?;
        check_response_code(resp.status, &[allowed])
    }
}
