use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    sotd_api::run().await.context("sotd-api server failed")
}
