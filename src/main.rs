use anyhow::{Context, Result};
use clap::Parser;
use codetranslate::normalize::estimate_time;
use codetranslate::{CodeTranslator, Config, Direction};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "codetranslate")]
#[command(version, about = "Japanese/English translation for software-engineering text")]
#[command(long_about = "Translate prose between Japanese and English with a local Ollama model, leaving inline and fenced code untouched.")]
struct Cli {
    /// Text to translate (reads stdin when omitted)
    text: Option<String>,

    /// Translation direction: ja_to_en, en_to_ja
    #[arg(short, long, default_value = "ja_to_en")]
    direction: Direction,

    /// Model name (overrides TRANSLATEGEMMA_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Glossary JSON file
    #[arg(short, long)]
    glossary: Option<PathBuf>,

    /// Ollama server URL (overrides OLLAMA_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Only check that the backend serves the model
    #[arg(long)]
    check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn read_input(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            Ok(buf)
        }
    }
}

fn spinner(estimated_secs: u64) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Translating (about {}s)...", estimated_secs));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(host) = cli.host {
        config.ollama_host = host;
    }
    if let Some(glossary) = cli.glossary {
        config.glossary_path = glossary;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    debug!("Model:    {}", config.model);
    debug!("Host:     {}", config.ollama_host);
    debug!("Glossary: {}", config.glossary_path.display());

    let translator = CodeTranslator::from_config(&config);

    if cli.check {
        let status = translator.check_connection().await;
        if status.ok {
            println!("{}", style(&status.message).green());
            return Ok(());
        }
        eprintln!("{}", style(&status.message).red());
        std::process::exit(1);
    }

    let text = read_input(cli.text)?;

    let estimated = estimate_time(text.chars().count());
    let progress = (estimated > 0).then(|| spinner(estimated));

    let result = translator.translate(&text, cli.direction).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        );
    } else {
        if let Some(ref warning) = result.warning {
            eprintln!("{}", style(warning).yellow());
        }
        if result.error {
            eprintln!("{}", style(&result.translated).red());
        } else {
            println!("{}", result.translated);
        }
    }

    if result.error {
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_direction() {
        let cli = Cli::parse_from(["codetranslate", "-d", "en_to_ja", "hello"]);
        assert_eq!(cli.direction, Direction::EnToJa);
        assert_eq!(cli.text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_cli_rejects_invalid_direction() {
        assert!(Cli::try_parse_from(["codetranslate", "-d", "fr_to_de", "hello"]).is_err());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["codetranslate"]);
        assert_eq!(cli.direction, Direction::JaToEn);
        assert!(cli.text.is_none());
        assert!(!cli.json);
        assert!(!cli.check);
    }

    #[test]
    fn test_read_input_prefers_argument() {
        assert_eq!(read_input(Some("テスト".to_string())).unwrap(), "テスト");
    }
}
