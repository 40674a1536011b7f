//! Picforge CLI tool
//!
//! Command-line interface for the image transforms and the relay server.

use super::config::CliConfigBuilder;
use crate::{
    config::{EncodeSettings, Quality},
    relay::{self, ImagePayload, RelayClient, RelayConfig, CREDENTIAL_ENV_VAR},
    session::EditorSession,
    tracing_config,
    transform::{self, ResizeTarget},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Image transform and background-removal relay tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "picforge")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resize an image (height derived from aspect ratio when omitted)
    Resize {
        /// Input image file
        input: PathBuf,

        /// Target width in pixels
        #[arg(long)]
        width: u32,

        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Output file [default: <input>_edited.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Re-encode an image at a lower quality
    Compress {
        /// Input image file
        input: PathBuf,

        /// Quality fraction (0.1-1.0)
        #[arg(short, long, default_value = "0.7")]
        quality: Quality,

        /// Output file [default: <input>_edited.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an image to another format
    Convert {
        /// Input image file
        input: PathBuf,

        /// Target format
        #[arg(short, long, value_enum)]
        format: CliOutputFormat,

        /// Output file [default: <input>_edited.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove the background via the upstream service (credential from env)
    RemoveBg {
        /// Input image file
        input: PathBuf,

        /// Output file [default: <input>_edited.png]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the relay HTTP server
    Serve {
        /// Address to bind, as host:port
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum CliOutputFormat {
    Png,
    Jpeg,
    Webp,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_config::init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match cli.command {
        Command::Resize {
            input,
            width,
            height,
            output,
        } => {
            let target = ResizeTarget { width, height };
            run_transform(&input, output, Quality::default(), |session| {
                session.resize(&target)
            })
        },
        Command::Compress {
            input,
            quality,
            output,
        } => run_transform(&input, output, quality, |_| Ok(())),
        Command::Convert {
            input,
            format,
            output,
        } => {
            let settings = EncodeSettings::for_format(CliConfigBuilder::output_format(format));
            run_convert(&input, output, &settings)
        },
        Command::RemoveBg { input, output } => run_remove_bg(&input, output).await,
        Command::Serve { bind } => run_serve(&bind).await,
    }
}

/// Load a session from a file, apply one transform and write the result
/// encoded at the given quality
fn run_transform<F>(
    input: &Path,
    output: Option<PathBuf>,
    export_quality: Quality,
    apply: F,
) -> Result<()>
where
    F: FnOnce(&mut EditorSession) -> crate::error::Result<()>,
{
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");

    let mut session = EditorSession::load(file_name, &bytes)?;
    apply(&mut session)?;

    let output = output.unwrap_or_else(|| {
        CliConfigBuilder::default_output_path(input, session.format().extension())
    });
    let encoded = session.export(export_quality)?;
    std::fs::write(&output, encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let (width, height) = session.dimensions();
    info!(
        input = %input.display(),
        output = %output.display(),
        width,
        height,
        format = %session.format(),
        "transform complete"
    );
    Ok(())
}

/// Convert a file to another format, encoding exactly once
///
/// Lossy targets would pick up generational loss from a second encode, so
/// the converted bytes are written as produced rather than exported through
/// the session again.
fn run_convert(input: &Path, output: Option<PathBuf>, settings: &EncodeSettings) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");

    let session = EditorSession::load(file_name, &bytes)?;
    let encoded = transform::convert(session.image(), settings)?;

    let output = output.unwrap_or_else(|| {
        CliConfigBuilder::default_output_path(input, settings.format.extension())
    });
    std::fs::write(&output, encoded)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        format = %settings.format,
        "conversion complete"
    );
    Ok(())
}

async fn run_remove_bg(input: &Path, output: Option<PathBuf>) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let file_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image.png")
        .to_string();

    let client = RelayClient::new(RelayConfig::from_env())?;
    let result = client
        .remove_background(ImagePayload::with_file_name(bytes, file_name))
        .await?;

    // Upstream always returns PNG
    let output = output.unwrap_or_else(|| CliConfigBuilder::default_output_path(input, "png"));
    std::fs::write(&output, result)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(input = %input.display(), output = %output.display(), "background removed");
    Ok(())
}

async fn run_serve(bind: &str) -> Result<()> {
    let addr = CliConfigBuilder::parse_bind_addr(bind)?;

    let config = RelayConfig::from_env();
    if !config.has_credential() {
        warn!(
            "{CREDENTIAL_ENV_VAR} is not set; relay requests will fail with a configuration error"
        );
    }

    let client = RelayClient::new(config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    relay::start_server(listener, client)
        .await
        .context("Relay server exited with an error")
}
