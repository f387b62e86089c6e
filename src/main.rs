//! ingress-modernizr - Convert Kubernetes Ingress to Gateway API resources

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ingress_modernizr::{Cli, TOOL_NAME};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries manifests, so logs go to stderr. Quiet by default
    // because this usually runs as a Helm post-renderer.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", TOOL_NAME, e);
            ExitCode::FAILURE
        }
    }
}
