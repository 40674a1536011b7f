//! Picforge CLI tool
//!
//! Command-line interface for the picforge image transforms and the
//! background-removal relay server.

#[cfg(feature = "cli")]
use picforge::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
