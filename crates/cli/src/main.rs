//! CLI tool for translating PowerPoint decks and replacing their fonts.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use deck_core::{
    EngineConfig, FontProgressEvent, GlossaryItem, Phase, PresentationFormat, Progress,
    ProgressEvent,
};
use deck_llm::ChatTranslator;
use deck_pptx::DeckEngine;
use log::{debug, info, warn};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Translate PowerPoint decks while keeping their layout.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate every slide of a .pptx file
    Translate(TranslateArgs),
    /// Set one typeface for all text in a .pptx file
    Fonts(FontsArgs),
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Target language, e.g. "French" or "Simplified Chinese"
    #[arg(short, long)]
    lang: String,

    /// Output file (default: <input>_<lang>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Paragraphs translated at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long)]
    base_url: Option<String>,

    /// API key
    #[arg(long, env = "DECK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Forced translation, as term=translation (repeatable)
    #[arg(short, long = "glossary", value_name = "TERM=TRANSLATION")]
    glossary: Vec<String>,
}

#[derive(Args, Debug)]
struct FontsArgs {
    /// Input PowerPoint file (.pptx)
    input: PathBuf,

    /// Typeface to apply, e.g. "Noto Sans"
    #[arg(short, long)]
    font: String,

    /// Output file (default: <input>_<font>.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let result = match cli.command {
        Command::Translate(args) => translate(args).await,
        Command::Fonts(args) => fonts(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("operation failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn translate(args: TranslateArgs) -> Result<()> {
    let config = build_config(&args)?;
    let bytes = read_deck(&args.input)?;

    let translator = ChatTranslator::new(&config.provider)
        .context("Failed to set up the translation provider")?;
    let engine = DeckEngine::from_config(&config);

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let (progress, mut events) = Progress::channel(config.translation.progress_capacity.max(1));
    let reporter = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            report_progress(&event);
        }
    });

    let output = engine
        .translate_deck(&bytes, &translator, &progress, &cancel)
        .await;
    drop(progress);
    let _ = reporter.await;

    let output =
        output.with_context(|| format!("Failed to translate {}", args.input.display()))?;

    let output_path = get_output_path(&args.input, args.output.as_ref(), &args.lang)?;
    write_output(&output_path, &output.bytes)?;

    let fallbacks = output.units.iter().filter(|u| u.fell_back).count();
    if fallbacks > 0 {
        warn!("{} paragraphs kept their original text", fallbacks);
    }
    println!(
        "Translated {} paragraphs: {} -> {} characters",
        output.units.len(),
        output.summary.original_chars,
        output.summary.translated_chars
    );
    println!("Written to: {}", output_path.display());

    Ok(())
}

async fn fonts(args: FontsArgs) -> Result<()> {
    let bytes = read_deck(&args.input)?;

    let (progress, mut events) = Progress::channel(16);
    let reporter = tokio::spawn(async move {
        while let Some(FontProgressEvent { message, percent }) = events.recv().await {
            info!("[{:>3}%] {}", percent, message);
        }
    });

    let output = DeckEngine::new()
        .replace_fonts(&bytes, &args.font, &progress)
        .await;
    drop(progress);
    let _ = reporter.await;

    let output =
        output.with_context(|| format!("Failed to replace fonts in {}", args.input.display()))?;

    let output_path = get_output_path(&args.input, args.output.as_ref(), &args.font)?;
    write_output(&output_path, &output)?;
    println!("Written to: {}", output_path.display());

    Ok(())
}

/// Merge the configuration file, if any, with command-line overrides.
fn build_config(args: &TranslateArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    config.provider.target_language = args.lang.clone();
    if let Some(concurrency) = args.concurrency {
        config.translation.concurrency = concurrency;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.translation.inter_batch_delay_ms = delay_ms;
    }
    if let Some(model) = &args.model {
        config.provider.model = model.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.provider.base_url = base_url.clone();
    }
    if let Some(api_key) = &args.api_key {
        config.provider.api_key = api_key.clone();
    }
    for entry in &args.glossary {
        config.provider.glossary.push(parse_glossary_entry(entry)?);
    }

    debug!("Effective configuration: {:?}", config.translation);
    Ok(config)
}

fn parse_glossary_entry(entry: &str) -> Result<GlossaryItem> {
    match entry.split_once('=') {
        Some((term, translation)) if !term.trim().is_empty() => Ok(GlossaryItem {
            term: term.trim().to_string(),
            translation: translation.trim().to_string(),
        }),
        _ => bail!("Invalid glossary entry '{}', expected TERM=TRANSLATION", entry),
    }
}

/// Read an input deck, rejecting anything that is not PPTX.
fn read_deck(input_path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let format = PresentationFormat::from_magic(&bytes)
        .or_else(|| {
            input_path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(PresentationFormat::from_extension)
        })
        .ok_or_else(|| anyhow::anyhow!("Could not detect file format"))?;

    match format {
        PresentationFormat::Pptx => Ok(bytes),
        PresentationFormat::Ppt => {
            bail!("Legacy .ppt files are not supported, save the deck as .pptx first")
        }
    }
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current batch");
            cancel.cancel();
        }
    });
}

fn report_progress(event: &ProgressEvent) {
    match event.phase {
        Phase::SlideStarted => info!(
            "Slide {}/{}: {}",
            event.index + 1,
            event.total,
            event.detail
        ),
        Phase::UnitStarted => debug!(
            "[{}/{}] {}",
            event.index + 1,
            event.total,
            event.detail
        ),
        Phase::UnitFinished => info!(
            "[{}/{}] -> {} ({} / {} chars)",
            event.index + 1,
            event.total,
            event.detail,
            event.stats.original_chars,
            event.stats.translated_chars
        ),
        Phase::Packaging => info!("Repackaging ({})", event.detail),
        Phase::Done => info!("Done"),
    }
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output: Option<&PathBuf>, suffix: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        }
        return Ok(path.clone());
    }

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_filename = format!("{}_{}.pptx", stem, file_name_safe(suffix));

    Ok(match input_path.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    })
}

fn file_name_safe(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_glossary_entry() {
        let item = parse_glossary_entry("Roadmap = Feuille de route").unwrap();
        assert_eq!(item.term, "Roadmap");
        assert_eq!(item.translation, "Feuille de route");
        assert!(parse_glossary_entry("no separator").is_err());
        assert!(parse_glossary_entry("=x").is_err());
    }

    #[test]
    fn test_default_output_path() {
        let path = get_output_path(Path::new("talks/q3 review.pptx"), None, "Simplified Chinese").unwrap();
        assert_eq!(path, PathBuf::from("talks/q3 review_Simplified_Chinese.pptx"));

        let path = get_output_path(Path::new("deck.pptx"), None, "Noto Sans").unwrap();
        assert_eq!(path, PathBuf::from("deck_Noto_Sans.pptx"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "deck",
            "translate",
            "deck.pptx",
            "--lang",
            "German",
            "--concurrency",
            "3",
            "--delay-ms",
            "0",
            "-g",
            "Deck=Foliensatz",
        ]);
        let Command::Translate(args) = cli.command else {
            panic!("expected translate");
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.provider.target_language, "German");
        assert_eq!(config.translation.concurrency, 3);
        assert_eq!(config.translation.inter_batch_delay_ms, 0);
        assert_eq!(config.provider.glossary.len(), 1);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
