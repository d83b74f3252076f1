use std::time::Duration;

use anyhow::Result;
use azstore_core::time::{format_http_date, now};
use azstore_core::{Context, OsEnv};
use azstore_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .user_agent("azstore-example/0.1")
        .build()?;

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv);

    let account = ctx
        .env_var("AZURE_STORAGE_ACCOUNT_NAME")
        .unwrap_or_else(|| "myaccount".to_string());
    let url = format!("https://{account}.blob.core.windows.net/?comp=list");
    println!("Sending unsigned GET {url}");

    // The service rejects unsigned requests, the error document shows the transport works.
    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri(&url)
        .header("x-ms-version", "2014-02-14")
        .header("x-ms-date", format_http_date(now()))
        .body(Bytes::new())?;

    match ctx.http_send(req).await {
        Ok(resp) => {
            println!("Response status: {}", resp.status());
            for (name, value) in resp.headers() {
                println!("  {name}: {value:?}");
            }
            println!("{}", String::from_utf8_lossy(resp.body()));
        }
        Err(e) => eprintln!("Request failed: {e}"),
    }

    Ok(())
}
