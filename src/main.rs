use sealnote::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present, before any configuration is read from the
    // environment. A missing file is not an error.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    cli::run_cli().await
}
