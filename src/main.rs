use tracing_subscriber::EnvFilter;

// Pipeline stages run one after another on a single thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aurasync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    aurasync::cli::run().await
}
