// SPDX-License-Identifier: PMPL-1.0-or-later
//! a11yscore CLI - evaluate HTML pages against WCAG rule categories

use a11yscore::config::{load_options, CheckOptions};
use a11yscore::model::{Category, Report};
use a11yscore::orchestrator::AccessibilityChecker;
use a11yscore::report::{render, OutputFormat};
use a11yscore::scanner;
use a11yscore::source::{is_remote, FilePageSource, HttpPageSource, PageSource};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// WCAG accessibility rule engine and weighted scoring
#[derive(Parser)]
#[command(name = "a11yscore")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single page (file path or http(s) URL)
    Check {
        /// File path or URL to evaluate
        target: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Evaluate every HTML file under a directory
    Scan {
        /// Directory to scan
        dir: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Skip the ARIA checker
    #[arg(long)]
    no_aria: bool,

    /// Skip the semantic checker
    #[arg(long)]
    no_semantic: bool,

    /// Skip the image checker
    #[arg(long)]
    no_image: bool,

    /// Skip the media checker
    #[arg(long)]
    no_media: bool,

    /// Skip the visual checker
    #[arg(long)]
    no_visual: bool,

    /// Seconds to wait for a remote page
    #[arg(long)]
    wait_time: Option<u64>,

    /// Options file (TOML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json")]
    format: FormatArg,

    /// Output file (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Exit with status 1 when any total score is below this value
    #[arg(long)]
    fail_under: Option<f64>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

impl CommonArgs {
    /// Config file first, then command-line overrides
    fn options(&self) -> anyhow::Result<CheckOptions> {
        let mut options = match &self.config {
            Some(path) => load_options(path)?,
            None => CheckOptions::default(),
        };

        let disabled = [
            (Category::Aria, self.no_aria),
            (Category::Semantic, self.no_semantic),
            (Category::Image, self.no_image),
            (Category::Media, self.no_media),
            (Category::Visual, self.no_visual),
        ];
        for (category, off) in disabled {
            if off {
                options.set_enabled(category, false);
            }
        }

        if let Some(secs) = self.wait_time {
            options.wait_time = secs;
        }
        Ok(options)
    }
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("a11yscore=debug")
    } else {
        EnvFilter::new("a11yscore=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let checker = AccessibilityChecker::new();

    let (reports, common) = match cli.command {
        Commands::Check { target, common } => {
            init_logging(common.verbose);
            let options = common.options()?;
            let source: Box<dyn PageSource> = if is_remote(&target) {
                Box::new(HttpPageSource::new()?)
            } else {
                Box::new(FilePageSource::new())
            };
            let report = checker.check_page(source.as_ref(), &target, &options).await?;
            (vec![report], common)
        }

        Commands::Scan { dir, common } => {
            init_logging(common.verbose);
            let options = common.options()?;
            let reports = scanner::scan_directory(&checker, &dir, &options).await?;
            (reports, common)
        }
    };

    let rendered = render(&reports, common.format.into());
    write_output(&rendered, common.output.as_deref())?;

    if let Some(threshold) = common.fail_under {
        if below_threshold(&reports, threshold) {
            std::process::exit(1);
        }
    }

    Ok(())
}

fn below_threshold(reports: &[Report], threshold: f64) -> bool {
    reports.iter().any(|r| r.total_score < threshold)
}

/// Write output to file or stdout
fn write_output(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(p) => {
            std::fs::write(p, content)?;
            eprintln!("Report written to {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
