use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    keyfill_cli::cli::app::run().await
}
