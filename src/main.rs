use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    fieldsense_cli::cli::app::run().await
}
