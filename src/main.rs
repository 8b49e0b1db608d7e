use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    shortcut_search::run().await
}
