//! sigboost - boosted-tree signal/background training

use sigboost::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigboost=info".into()),
        )
        .init();

    let cli = Cli::parse_normalized();
    run(&cli)
}
