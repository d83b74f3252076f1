use azstore::{
    Client, Config, CreateTableParameters, EdmType, MapTableEntity, ServiceError,
};
use azstore_core::{Context, OsEnv, Result};
use azstore_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    if ctx.env_var("AZURE_STORAGE_ACCOUNT_NAME").is_none()
        || ctx.env_var("AZURE_STORAGE_ACCOUNT_KEY").is_none()
    {
        println!("Set AZURE_STORAGE_ACCOUNT_NAME and AZURE_STORAGE_ACCOUNT_KEY to run this example");
        return Ok(());
    }

    let config = Config::default().from_env(&ctx).with_defaults();
    let client = Client::new(ctx, config)?;
    let tables = client.table_service();

    println!("Creating table demotable");
    tables
        .create_table(&CreateTableParameters::new("demotable"))
        .await?;

    let entity = MapTableEntity::new()
        .with_property("PartitionKey", "mypartitionkey")
        .with_property("RowKey", "myrowkey")
        .with_property("Address", "Mountain View")
        .with_typed_property("Age", "23", EdmType::Int64);
    tables.insert_entity("demotable", &entity).await?;

    let got = tables
        .query_entity("demotable", "mypartitionkey", "myrowkey")
        .await?;
    for (k, v) in got.iter() {
        println!("  {k} = {v}");
    }

    tables
        .delete_entity("demotable", "mypartitionkey", "myrowkey")
        .await?;
    match tables
        .delete_entity("demotable", "mypartitionkey", "myrowkey")
        .await
    {
        Err(err) => match ServiceError::from_error(&err) {
            Some(e) => println!("Second delete failed as expected: {}", e.code()),
            None => return Err(err),
        },
        Ok(()) => println!("Second delete unexpectedly succeeded"),
    }

    tables.delete_table("demotable").await?;
    println!("Deleted table demotable");

    Ok(())
}
