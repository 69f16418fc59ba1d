#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizhub::run().await {
        eprintln!("quizhub fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
