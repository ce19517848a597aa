// sumtopic - summarize long documents and classify them into topics
use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use sumtopic::analysis::{length_budget, truncate_chars, validate, Pipeline};
use sumtopic::app::{self, App};
use sumtopic::config::AppConfig;
use sumtopic::models::ModelRegistry;
use sumtopic::types::{word_count, Outcome, RawInput, TextStats};
use sumtopic::{debug_log, debug_trace, logging, pdf_extraction};

#[derive(Parser, Debug)]
#[command(name = "sumtopic")]
#[command(version, about = "Summarize long text or PDFs and classify the topic", long_about = None)]
struct Args {
    /// Config file (default: $SUMTOPIC_CONFIG, ./sumtopic.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not reload the config file when it changes
    #[arg(long, global = true)]
    no_watch: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (the default)
    Tui {
        /// Load both models before showing the UI
        #[arg(long)]
        preload: bool,
    },
    /// Summarize and classify once, printing the result
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Word and character counts plus the length budget, without loading models
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(ClapArgs, Debug)]
#[group(multiple = false)]
struct InputArgs {
    /// PDF file to extract text from
    #[arg(long)]
    pdf: Option<PathBuf>,
    /// Plain text file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Text given directly on the command line
    #[arg(long)]
    text: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let (mut config, config_path) = AppConfig::load(args.config.as_deref())?;
    if args.no_watch {
        config.ui.watch_config = false;
    }
    logging::init(&config.logging);
    debug_log(format!(
        "sumtopic {} starting (config: {})",
        env!("CARGO_PKG_VERSION"),
        config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    ));

    match args.command.unwrap_or(Command::Tui { preload: false }) {
        Command::Tui { preload } => run_tui(config, config_path, preload).await,
        Command::Analyze { input, format } => run_analyze(&config, &input, format),
        Command::Stats { input } => run_stats(&config, &input),
    }
}

async fn run_tui(config: AppConfig, config_path: Option<PathBuf>, preload: bool) -> Result<ExitCode> {
    if !atty::is(atty::Stream::Stdout) {
        bail!("the interactive UI needs a terminal; use `sumtopic analyze` instead");
    }
    let registry = Arc::new(ModelRegistry::new(config.models.clone()));
    if preload {
        println!("Loading models from {} ...", config.models.dir.display());
        registry.preload()?;
    }

    logging::set_echo_stderr(false);
    let mut app = App::new(config, config_path, registry);
    let result = app::run(&mut app).await;
    logging::set_echo_stderr(true);
    result?;
    Ok(ExitCode::SUCCESS)
}

fn read_input(input: &InputArgs) -> Result<RawInput> {
    if let Some(path) = &input.pdf {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok(RawInput::Pdf { name, bytes });
    }
    if let Some(path) = &input.file {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(RawInput::Text(text));
    }
    if let Some(text) = &input.text {
        return Ok(RawInput::Text(text.clone()));
    }
    if atty::is(atty::Stream::Stdin) {
        bail!("no input: pass --pdf, --file or --text, or pipe text on stdin");
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text).context("reading stdin")?;
    Ok(RawInput::Text(text))
}

fn run_analyze(config: &AppConfig, input: &InputArgs, format: OutputFormat) -> Result<ExitCode> {
    let raw = read_input(input)?;
    let registry = ModelRegistry::new(config.models.clone());
    let pipeline = Pipeline::new(&registry, &registry, config);
    let outcome = pipeline.run(&raw, &mut |state| debug_trace!("stage {:?}", state));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome),
    }

    Ok(match outcome {
        Outcome::Completed(_) => ExitCode::SUCCESS,
        Outcome::Rejected { .. } => ExitCode::from(2),
        Outcome::Failed(_) => ExitCode::FAILURE,
    })
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Completed(analysis) => {
            println!("📄 Summary");
            println!("{}", analysis.summary.text);
            println!("Summary length: {} words", analysis.summary.words);
            println!();
            println!("🏷 Topic Classification");
            println!("{}", analysis.topic.label);
            let filled = (analysis.topic.gauge_fraction() * 30.0).round() as usize;
            println!("[{}{}]", "█".repeat(filled), "░".repeat(30 - filled.min(30)));
            println!("{}", analysis.topic.score_caption());
        }
        Outcome::Rejected { message, .. } => eprintln!("⚠ {}", message),
        Outcome::Failed(failure) => {
            eprintln!("❌ {}", failure.message);
            eprintln!("{}", failure.detail);
        }
    }
}

fn run_stats(config: &AppConfig, input: &InputArgs) -> Result<ExitCode> {
    let text = match &input.pdf {
        Some(path) => {
            let pdf = pdf_extraction::read_pdf(path)?;
            println!("Pages: {}", pdf.pages);
            pdf.text
        }
        None => match read_input(input)? {
            RawInput::Text(text) => text,
            RawInput::Pdf { name, bytes } => pdf_extraction::extract_text_from_bytes(&name, &bytes)?,
        },
    };
    let stats = TextStats::of(&text);
    println!("Word Count: {}", stats.words);
    println!("Character Count: {}", stats.chars);

    match validate(&text, config.limits.min_words) {
        Ok(_) => {
            let truncated = truncate_chars(&text, config.limits.max_chars);
            let words = word_count(truncated);
            let budget = length_budget(words, &config.budget);
            if truncated.len() < text.len() {
                println!("Truncated to {} characters ({} words)", config.limits.max_chars, words);
            }
            println!("Length budget: min {}, max {}", budget.min_length, budget.max_length);
            Ok(ExitCode::SUCCESS)
        }
        Err(warning) => {
            println!("⚠ {}", warning.message());
            Ok(ExitCode::from(2))
        }
    }
}
