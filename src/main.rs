#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fb_autoreply::cli::app::run().await
}
