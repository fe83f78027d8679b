//! The `iris describe` command.

use clap::{Args, ValueEnum};
use iris_core::{Config, OutputFormat, ReportWriter, VisionIntake};
use std::io;
use std::sync::Arc;

use crate::rate_limit::GovernorHook;

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum Format {
    /// Markdown-style report, summary on stderr (default)
    #[default]
    Text,
    /// One JSON object with summary, content, descriptions and errors
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Arguments for the `describe` command.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Image files to describe, in order
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Maximum number of images to describe (overrides config)
    #[arg(long)]
    pub max_images: Option<usize>,

    /// Per-image model timeout in milliseconds (overrides config)
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl DescribeArgs {
    /// Apply command-line overrides on top of the loaded config.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(max_images) = self.max_images {
            config.intake.max_images = max_images;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.intake.vision_timeout_ms = timeout_ms;
        }
    }
}

/// Execute the describe command.
pub async fn execute(args: DescribeArgs, mut config: Config) -> anyhow::Result<()> {
    args.apply_overrides(&mut config);
    config.validate()?;

    let mut intake = VisionIntake::new(&config);
    if let Some(hook) = GovernorHook::from_config(&config.rate_limit) {
        tracing::debug!("Pacing model calls at {}/min", hook.requests_per_minute());
        intake = intake.with_rate_limiter(Arc::new(hook));
    }

    tracing::debug!(
        "Describing {} path(s), max {} image(s)",
        args.paths.len(),
        intake.limits().max_images
    );
    let report = intake.run(&args.paths).await;

    let mut writer = ReportWriter::new(io::stdout().lock(), args.format.into(), args.pretty);
    writer.write(&report)?;

    if report.is_aborted() {
        anyhow::bail!("{}", report.summary());
    }
    if args.format == Format::Text {
        eprintln!("{}", report.summary());
    }
    Ok(())
}
