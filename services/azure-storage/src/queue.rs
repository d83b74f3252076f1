use azstore_core::{Error, Result};
use bytes::Bytes;
use http::{Method, StatusCode};

use crate::client::{check_response_code, Client};
use crate::constants::*;
use crate::{BlobQueueSigner, ErrorFormat};

/// QueueServiceClient runs queue operations against the queue service.
#[derive(Debug, Clone)]
pub struct QueueServiceClient {
    client: Client,
    signer: BlobQueueSigner,
}

impl QueueServiceClient {
    pub(crate) fn new(client: Client) -> Self {
        let signer = BlobQueueSigner::new(client.account_name());
        Self { client, signer }
    }

    /// Create a queue.
    ///
    /// `204 No Content` means a queue with the same name and metadata exists.
    ///
    /// - [Create Queue](https://docs.microsoft.com/en-us/rest/api/storageservices/create-queue4)
    pub async fn create_queue(&self, name: &str) -> Result<()> {
        self.queue_op(
            Method::PUT,
            name,
            &[StatusCode::CREATED, StatusCode::NO_CONTENT],
        )
        .await
    }

    /// Delete a queue and its messages.
    ///
    /// - [Delete Queue](https://docs.microsoft.com/en-us/rest/api/storageservices/delete-queue3)
    pub async fn delete_queue(&self, name: &str) -> Result<()> {
        self.queue_op(Method::DELETE, name, &[StatusCode::NO_CONTENT])
            .await
    }

    async fn queue_op(&self, method: Method, name: &str, allowed: &[StatusCode]) -> Result<()> {
        if name.is_empty() {
            return Err(Error::parameter_invalid("queueName"));
        }

        let uri = self.client.endpoint(QUEUE_SERVICE, name, &[])?;
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
        check_response_code(resp.status, allowed)
    }
}
