use azstore_core::{Error, Result};
use bytes::Bytes;
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE, IF_MATCH};
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};

use crate::client::{check_response_code, Client, StorageResponse};
use crate::constants::*;
use crate::{ErrorFormat, MapTableEntity, TableEntity, TableSigner};

/// Response of [`TableServiceClient::query_tables`], without OData metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QueryTablesResponse {
    /// Tables of the account.
    #[serde(default)]
    pub value: Vec<TableName>,
}

/// One entry of [`QueryTablesResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableName {
    /// Name of the table.
    #[serde(rename = "TableName")]
    pub table_name: String,
}

/// Parameters of [`TableServiceClient::create_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateTableParameters {
    /// Name of the new table.
    #[serde(rename = "TableName")]
    pub table_name: String,
}

impl CreateTableParameters {
    /// Create parameters for the given table name.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
        }
    }
}

/// TableServiceClient runs operations against the table service of an account.
///
/// Requests are signed with [`TableSigner`] and errors are decoded from
/// `{"odata.error": ...}` bodies.
#[derive(Debug, Clone)]
pub struct TableServiceClient {
    client: Client,
    signer: TableSigner,
}

impl TableServiceClient {
    pub(crate) fn new(client: Client) -> Self {
        let signer = TableSigner::new(client.account_name());
        Self { client, signer }
    }

    fn base_headers(&self) -> Result<HeaderMap> {
        let mut headers = self.client.standard_headers()?;
        headers.insert(ACCEPT, HeaderValue::from_static(NO_METADATA));
        Ok(headers)
    }

    fn json_headers(&self) -> Result<HeaderMap> {
        let mut headers = self.base_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Uri> {
        self.client.endpoint(TABLE_SERVICE, path, &[])
    }

    async fn exec(
        &self,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<StorageResponse> {
        self.client
            .exec(method, uri, headers, body, &self.signer, ErrorFormat::Json)
            .await
    }

    /// List the tables of the account.
    ///
    /// - [Query Tables](https://docs.microsoft.com/en-us/rest/api/storageservices/query-tables)
    pub async fn query_tables(&self) -> Result<QueryTablesResponse> {
        let uri = self.endpoint("/Tables")?;
        let resp = self
            .exec(Method::GET, uri, self.base_headers()?, Bytes::new())
            .await?;
        resp.json()
    }

    /// Create a new table.
    ///
    /// - [Create Table](https://docs.microsoft.com/en-us/rest/api/storageservices/create-table)
    pub async fn create_table(&self, params: &CreateTableParameters) -> Result<()> {
        if params.table_name.is_empty() {
            return Err(Error::parameter_invalid("tableName"));
        }

        let body = serde_json::to_vec(params).map_err(|e| {
            Error::serialization_failed("storage: failed to serialize create table parameters")
                .with_source(e)
        })?;
        let uri = self.endpoint("Tables")?;
        let resp = self
            .exec(Method::POST, uri, self.json_headers()?, body.into())
            .await?;
        check_response_code(resp.status, &[StatusCode::CREATED, StatusCode::NO_CONTENT])
    }

    /// Delete a table and all of its entities.
    ///
    /// - [Delete Table](https://docs.microsoft.com/en-us/rest/api/storageservices/delete-table)
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        if table_name.is_empty() {
            return Err(Error::parameter_invalid("tableName"));
        }

        let uri = self.endpoint(&format!("Tables('{}')", odata_quote(table_name)))?;
        let resp = self
            .exec(Method::DELETE, uri, self.base_headers()?, Bytes::new())
            .await?;
        check_response_code(resp.status, &[StatusCode::NO_CONTENT])
    }

    /// Insert a new entity into a table.
    ///
    /// - [Insert Entity](https://docs.microsoft.com/en-us/rest/api/storageservices/insert-entity)
    pub async fn insert_entity<E>(&self, table_name: &str, entity: &E) -> Result<()>
    where
        E: TableEntity + ?Sized,
    {
        if table_name.is_empty() {
            return Err(Error::parameter_invalid("tableName"));
        }
        let body = entity.to_json()?;

        let uri = self.endpoint(table_name)?;
        let resp = self
            .exec(Method::POST, uri, self.json_headers()?, body.into())
            .await?;
        check_response_code(resp.status, &[StatusCode::CREATED, StatusCode::NO_CONTENT])
    }

    /// Fetch a single entity and return its properties.
    ///
    /// - [Query Entities](https://docs.microsoft.com/en-us/rest/api/storageservices/query-entities)
    pub async fn query_entity(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<MapTableEntity> {
        let uri = self.endpoint(&entity_path(table_name, partition_key, row_key)?)?;
        let resp = self
            .exec(Method::GET, uri, self.base_headers()?, Bytes::new())
            .await?;
        check_response_code(resp.status, &[StatusCode::OK])?;

        let properties: serde_json::Map<String, serde_json::Value> = resp.json()?;
        Ok(properties.into())
    }

    /// Delete an entity, whatever its current ETag.
    ///
    /// - [Delete Entity](https://docs.microsoft.com/en-us/rest/api/storageservices/delete-entity1)
    pub async fn delete_entity(
        &self,
        table_name: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<()> {
        let uri = self.endpoint(&entity_path(table_name, partition_key, row_key)?)?;
        let mut headers = self.base_headers()?;
        headers.insert(IF_MATCH, HeaderValue::from_static("*"));

        let resp = self
            .exec(Method::DELETE, uri, headers, Bytes::new())
            .await?;
        check_response_code(resp.status, &[StatusCode::NO_CONTENT])
    }
}

/// `<table>(PartitionKey='<pk>',RowKey='<rk>')`
fn entity_path(table_name: &str, partition_key: &str, row_key: &str) -> Result<String> {
    if table_name.is_empty() {
        return Err(Error::parameter_invalid("tableName"));
    }
    if partition_key.is_empty() {
        return Err(Error::parameter_invalid("partitionKey"));
    }
    if row_key.is_empty() {
        return Err(Error::parameter_invalid("rowKey"));
    }

    Ok(format!(
        "{table_name}(PartitionKey='{}',RowKey='{}')",
        odata_quote(partition_key),
        odata_quote(row_key)
    ))
}

/// Single quotes inside OData string literals are doubled.
fn odata_quote(s: &str) -> String {
    s.replace('\'', "''")
}
