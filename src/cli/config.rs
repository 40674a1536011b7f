//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::CliOutputFormat;
use crate::config::OutputFormat;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Map the CLI format enum to the library output format
    pub(crate) fn output_format(format: CliOutputFormat) -> OutputFormat {
        match format {
            CliOutputFormat::Png => OutputFormat::Png,
            CliOutputFormat::Jpeg => OutputFormat::Jpeg,
            CliOutputFormat::Webp => OutputFormat::WebP,
        }
    }

    /// Default output path next to the input: `<stem>_edited.<ext>`,
    /// matching the session's download naming.
    pub(crate) fn default_output_path(input: &Path, extension: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("image");
        input.with_file_name(format!("{stem}_edited.{extension}"))
    }

    /// Parse the serve bind address
    pub(crate) fn parse_bind_addr(bind: &str) -> Result<SocketAddr> {
        bind.parse()
            .with_context(|| format!("Invalid bind address '{bind}' (expected host:port)"))
    }
}
