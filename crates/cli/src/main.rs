mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hitboard_core::application::{RecordingServiceImpl, RenderServiceImpl, SiteCheckServiceImpl};
use hitboard_core::config::{self, HitboardConfig};
use hitboard_core::matcher::KeywordMatcher;
use hitboard_core::ports::{DocumentFetcher, RecordRepository, RowWriter};
use html_adapter::HtmlWriterAdapter;
use http_adapter::CurlDocumentFetcher;
use json_adapter::JsonRecordRepository;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Keeps a history of keyword hits and renders it as an HTML table
#[derive(Parser, Debug)]
#[command(name = "hitboard")]
#[command(about = "Records keyword hits in a JSON history and renders it as an HTML table")]
struct Cli {
    /// Config file (defaults to ./hitboard.toml when present)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the results file as an HTML page
    Render {
        /// Results file to read
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Path where the HTML page will be written
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Scan text for the configured keywords and store a hit
    Record {
        /// Where the text was published
        #[arg(long = "url", required = true)]
        url: String,

        /// File holding the extracted text; `-` or omitted reads stdin
        #[arg(long = "text-file")]
        text_file: Option<PathBuf>,
    },
    /// Fetch every watched url and store the ones mentioning a keyword
    Check {
        /// Check these urls instead of the configured list (repeatable)
        #[arg(long = "url")]
        urls: Vec<String>,
    },
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("hitboard error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.as_deref();
    match cli.command {
        Command::InitConfig { force } => {
            let path = config::config_path(config_file);
            config::write_default(&path, force)
                .with_context(|| format!("writing {}", path.display()))
        }
        Command::Render { input, output } => render(&load_config(config_file)?, input, output),
        Command::Record { url, text_file } => {
            record(&load_config(config_file)?, &url, text_file.as_deref())
        }
        Command::Check { urls } => check(&load_config(config_file)?, urls),
    }
}

fn load_config(path: Option<&Path>) -> Result<HitboardConfig> {
    config::load(path).context("loading configuration")
}

fn render(cfg: &HitboardConfig, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| cfg.results_file.clone());
    let output = output.unwrap_or_else(|| cfg.output_file.clone());

    // Instantiate concrete implementations of secondary adapters
    let repository: Box<dyn RecordRepository> =
        Box::new(JsonRecordRepository::new(&input, cfg.on_malformed));
    let row_writer: Box<dyn RowWriter> =
        Box::new(HtmlWriterAdapter::new(&output, cfg.page_title.clone()));

    let service = RenderServiceImpl::new(repository, row_writer);
    let count = service
        .execute_render()
        .with_context(|| format!("rendering {}", input.display()))?;

    println!("Rendered {} records to {}", count, output.display());
    Ok(())
}

fn keyword_matcher(cfg: &HitboardConfig) -> Result<KeywordMatcher> {
    let matcher = KeywordMatcher::new(&cfg.keywords)?;
    if matcher.is_empty() {
        anyhow::bail!("no keywords configured; add `keywords = [...]` to the config file");
    }
    Ok(matcher)
}

fn check(cfg: &HitboardConfig, urls: Vec<String>) -> Result<()> {
    let matcher = keyword_matcher(cfg)?;
    let urls = if urls.is_empty() { cfg.urls.clone() } else { urls };
    if urls.is_empty() {
        anyhow::bail!("no urls to check; add `urls = [...]` to the config file or pass --url");
    }

    let repository: Box<dyn RecordRepository> =
        Box::new(JsonRecordRepository::new(&cfg.results_file, cfg.on_malformed));
    let fetcher: Box<dyn DocumentFetcher> =
        Box::new(CurlDocumentFetcher::new(Duration::from_secs(cfg.fetch_timeout_secs)));
    let service = SiteCheckServiceImpl::new(repository, fetcher, matcher);

    let now = chrono::Local::now().naive_local();
    let summary = service
        .execute_check(&urls, now)
        .with_context(|| format!("updating {}", cfg.results_file.display()))?;

    for url in &summary.failed {
        println!("Could not fetch {}", url);
    }
    println!(
        "Checked {} urls: {} hits, {} failed",
        summary.checked,
        summary.hits.len(),
        summary.failed.len()
    );
    Ok(())
}

fn record(cfg: &HitboardConfig, url: &str, text_file: Option<&Path>) -> Result<()> {
    let matcher = keyword_matcher(cfg)?;

    let text = read_text(text_file)?;
    tracing::debug!(url, chars = text.chars().count(), "scanning text");

    let repository: Box<dyn RecordRepository> =
        Box::new(JsonRecordRepository::new(&cfg.results_file, cfg.on_malformed));
    let service = RecordingServiceImpl::new(repository, matcher);

    let now = chrono::Local::now().naive_local();
    match service
        .record_hit(url, &text, now)
        .with_context(|| format!("updating {}", cfg.results_file.display()))?
    {
        Some(hit) => println!("Keyword found; recorded {} at {}", hit.url, hit.timestamp),
        None => println!("No keyword found in {}", url),
    }
    Ok(())
}

fn read_text(text_file: Option<&Path>) -> Result<String> {
    match text_file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading text from stdin")?;
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_with_overrides() {
        let cli = Cli::try_parse_from(["hitboard", "-v", "render", "-i", "in.json", "-o", "out.html"])
            .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Render { input, output } => {
                assert_eq!(input, Some(PathBuf::from("in.json")));
                assert_eq!(output, Some(PathBuf::from("out.html")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_record_requires_url() {
        assert!(Cli::try_parse_from(["hitboard", "record"]).is_err());
        let cli = Cli::try_parse_from([
            "hitboard", "record", "--url", "https://a/b.pdf", "--text-file", "-",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Record { .. }));
    }

    #[test]
    fn test_parse_check_with_repeated_urls() {
        let cli = Cli::try_parse_from([
            "hitboard", "check", "--url", "https://a/1.pdf", "--url", "https://b/",
        ])
        .unwrap();
        match cli.command {
            Command::Check { urls } => assert_eq!(urls, vec!["https://a/1.pdf", "https://b/"]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_without_urls_is_error() {
        let cfg = HitboardConfig {
            keywords: vec!["edital".to_string()],
            ..HitboardConfig::default()
        };
        let err = check(&cfg, Vec::new()).unwrap_err();
        assert!(err.to_string().starts_with("no urls to check"));
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["hitboard", "init-config", "--force", "-c", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::InitConfig { force: true }));
    }

    #[test]
    fn test_read_text_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("texto.txt");
        std::fs::write(&path, "conteúdo").unwrap();
        assert_eq!(read_text(Some(&path)).unwrap(), "conteúdo");
    }

    #[test]
    fn test_read_text_missing_file_has_context() {
        let err = read_text(Some(Path::new("/nonexistent/texto.txt"))).unwrap_err();
        assert!(format!("{:#}", err).starts_with("reading /nonexistent/texto.txt"));
    }
}
