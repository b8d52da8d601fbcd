//! CLI binary for wiki2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ScrapeConfig` and prints the run report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wiki2pdf::{
    scrape, ArgTopic, ProgressCallback, PromptTopic, RenderProgressCallback, ScrapeConfig,
    ScrapeError, ScrapeOutput, TopicProvider, DEFAULT_BASE_URL,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the image list plus one line per
/// image that could not be used.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; `on_render_start` gives it a length.
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Fetching");
        bar.set_message("article…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_render_start(&self, total_images: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} images  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total_images as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Images");
        self.bar.set_message("");
    }

    fn on_image_start(&self, index: usize, _total: usize, _url: &str) {
        self.bar.set_message(format!("#{}", index + 1));
    }

    fn on_image_rendered(&self, _index: usize, _total: usize, _url: &str) {
        self.bar.inc(1);
    }

    fn on_image_error(&self, _index: usize, _total: usize, error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), dim(error)));
        self.bar.inc(1);
    }

    fn on_render_complete(&self, rendered: usize, failed: usize) {
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!("{} {} images embedded", green("✔"), bold(&rendered.to_string()));
        } else {
            eprintln!(
                "{} {} images embedded  ({} skipped)",
                cyan("⚠"),
                bold(&rendered.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scrape a topic into the current directory
  wiki2pdf "Albert Einstein"

  # Prompt for the topic interactively
  wiki2pdf

  # Write into another directory, text only
  wiki2pdf Cat -o out/ --no-images

  # Machine-readable report
  wiki2pdf Cat --json > cat.json

OUTPUT FILES:
  <topic>_enhanced_wikipedia.pdf   article with TOC, bookmarks and images
  <topic>_wikipedia_summary.csv    Topic,Content summary row

ENVIRONMENT VARIABLES:
  WIKI2PDF_OUTPUT_DIR   Output directory
  WIKI2PDF_BASE_URL     Article base URL (another language edition, a mirror)
  WIKI2PDF_TIMEOUT      HTTP timeout in seconds
  RUST_LOG              Log filter, overrides -v / -q
"#;

/// Scrape a Wikipedia article into an illustrated PDF and a CSV summary.
#[derive(Parser, Debug)]
#[command(
    name = "wiki2pdf",
    version,
    about = "Scrape a Wikipedia article into an illustrated PDF and a CSV summary",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Article topic, e.g. "Albert Einstein". Prompted for when omitted.
    topic: Option<String>,

    /// Directory for the PDF and CSV.
    #[arg(short, long, env = "WIKI2PDF_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Base URL the topic is appended to.
    #[arg(long, env = "WIKI2PDF_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP timeout per request in seconds.
    #[arg(long, env = "WIKI2PDF_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Leave the image block out of the PDF.
    #[arg(long, env = "WIKI2PDF_NO_IMAGES")]
    no_images: bool,

    /// Print the run report as JSON (ScrapeOutput).
    #[arg(long, env = "WIKI2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "WIKI2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WIKI2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the report.
    #[arg(short, long, env = "WIKI2PDF_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs while it is on screen.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.quiet && !cli.json {
        println!("{}", bold("Enhanced Wikipedia Scraper"));
        println!("{}", dim("=========================="));
    }

    // ── Topic ────────────────────────────────────────────────────────────
    let topic = match cli.topic.clone() {
        Some(t) => ArgTopic(t).topic(),
        None => PromptTopic::stdio().topic(),
    }
    .context("No topic to scrape")?;

    if !cli.quiet && !cli.json {
        println!("Scraping topic: {}", cyan(&topic));
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress && !cli.no_images {
        Some(CliProgressCallback::new() as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = scrape(&topic, &config).map_err(fatal)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_report(&output);
    }

    Ok(())
}

/// Flatten a fatal error so `main` reports it as a single `Error:` line.
fn fatal(e: ScrapeError) -> anyhow::Error {
    anyhow::anyhow!("{e}")
}

/// Map CLI args to `ScrapeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ScrapeConfig> {
    let mut builder = ScrapeConfig::builder()
        .base_url(cli.base_url.clone())
        .output_dir(&cli.output_dir)
        .timeout_secs(cli.timeout)
        .include_images(!cli.no_images);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

fn print_report(output: &ScrapeOutput) {
    let doc = &output.document;
    println!();
    println!("{} Scraping completed successfully!", green("✔"));
    println!("Title:                {}", bold(&doc.title));
    println!("Number of sections:   {}", doc.sections.len());
    println!(
        "Number of images:     {}  {}",
        doc.images.len(),
        dim(&format!("({} embedded)", output.render.images_embedded))
    );
    println!("Number of references: {}", doc.references.len());
    println!();
    println!("Sections:");
    for line in output.outline() {
        println!("  - {line}");
    }
    println!();
    println!("PDF saved as:         {}", output.pdf_path.display());
    println!("Summary CSV saved as: {}", output.csv_path.display());
    println!(
        "{}",
        dim(&format!(
            "{} pages, {}ms",
            output.render.pages, output.total_duration_ms
        ))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_error_reports_without_cause_chain() {
        let err = fatal(ScrapeError::OutputWriteFailed {
            path: PathBuf::from("out/Cat_enhanced_wikipedia.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let report = format!("{err:?}");
        assert_eq!(err.chain().count(), 1);
        assert!(!report.contains('\n'), "got: {report}");
        assert!(report.contains("denied"));
    }

    #[test]
    fn cli_flags_map_onto_config() {
        let cli = Cli::parse_from(["wiki2pdf", "Cat", "-o", "out", "--no-images", "--timeout", "5"]);
        let config = build_config(&cli, None).unwrap();
        assert_eq!(cli.topic.as_deref(), Some("Cat"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.timeout_secs, 5);
        assert!(!config.include_images);
    }
}
