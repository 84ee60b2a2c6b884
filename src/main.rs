//! # tinnhanh
//!
//! Command-line host for the drafting pipelines. Wires settings, telemetry,
//! credentials and the Gemini client together, runs one pipeline and prints
//! the result as JSON on stdout. Logs go to stderr.

#![deny(unsafe_code)]

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{error, info, warn, Level};

use tinnhanh_core::{
    ArticleConfig, EnvCredentials, GeneratedArticle, Length, RewriteLength, Topic,
};
use tinnhanh_engine::{
    expand, AbbreviationDictionary, DraftError, DraftSession, ModelSelection, SharedDictionary,
};
use tinnhanh_llm::{GeminiClient, GeminiConfig};
use tinnhanh_settings::{
    get_settings, init_settings, load_settings, DictionarySettings, TinnhanhSettings,
};
use tinnhanh_telemetry::{init_telemetry, TelemetryConfig};

/// Drafting assistant for short police-bulletin news articles.
#[derive(Parser, Debug)]
#[command(name = "tinnhanh", version, about)]
struct Cli {
    /// Log level (overrides settings; `RUST_LOG` still wins).
    #[arg(long, global = true)]
    log_level: Option<Level>,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand abbreviations and normalize spelling and time formats in a brief.
    Refine(InputArgs),
    /// Write an article from a brief.
    Generate(GenerateArgs),
    /// Rewrite an article (JSON, or title line followed by content).
    Rewrite(RewriteArgs),
    /// Inspect the abbreviation dictionary.
    Dict {
        #[command(subcommand)]
        action: DictAction,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Read from this file instead of stdin.
    #[arg(long, short)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value_t = Topic::Incident)]
    topic: Topic,

    #[arg(long, default_value_t = Length::Short)]
    length: Length,

    /// Reduce the victim's name to initials.
    #[arg(long)]
    abbreviate_victim: bool,

    /// Reduce the subject's name to initials.
    #[arg(long)]
    abbreviate_subject: bool,

    /// File holding a custom structure for `--topic other`.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Run the refine pipeline on the brief first.
    #[arg(long)]
    refine: bool,
}

#[derive(Args, Debug)]
struct RewriteArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long, default_value_t = RewriteLength::Equivalent)]
    target: RewriteLength,

    /// Extra instruction for the model.
    #[arg(long)]
    instruction: Option<String>,
}

#[derive(Subcommand, Debug)]
enum DictAction {
    /// Print the effective dictionary.
    List,
    /// Expand abbreviations without calling the model.
    Expand(InputArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (loaded, settings_error) = match load_settings() {
        Ok(settings) => (settings, None),
        Err(e) => (TinnhanhSettings::default(), Some(e)),
    };
    let _ = init_settings(loaded);
    let settings = get_settings();

    init_telemetry(&telemetry_config(&cli, settings));
    if let Some(e) = settings_error {
        warn!(error = %e, "settings file ignored, using defaults");
    }

    let dictionary = build_dictionary(&settings.dictionary);
    info!(entries = dictionary.len(), "dictionary loaded");

    let output = match cli.command {
        Command::Dict { action } => run_dict(action, &dictionary)?,
        Command::Refine(args) => {
            let session = build_session(settings, dictionary);
            session.set_brief(read_input(args.input.as_deref())?);
            let outcome = session.refine_brief().await.map_err(draft_failed)?;
            serde_json::to_value(outcome)?
        }
        Command::Generate(args) => {
            let session = build_session(settings, dictionary);
            run_generate(&session, args).await?
        }
        Command::Rewrite(args) => {
            let session = build_session(settings, dictionary);
            run_rewrite(&session, args).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn telemetry_config(cli: &Cli, settings: &TinnhanhSettings) -> TelemetryConfig {
    let log_level = cli
        .log_level
        .or_else(|| settings.logging.level.parse().ok())
        .unwrap_or(Level::INFO);
    // Modules with an unrecognized level name are left at the default.
    let module_levels = settings
        .logging
        .modules
        .iter()
        .filter_map(|(module, level)| Some((module.clone(), level.parse().ok()?)))
        .collect();
    TelemetryConfig {
        log_level,
        module_levels,
        json: cli.log_json || settings.logging.json,
    }
}

/// Built-in entries first (when enabled), then the configured ones, so a
/// configured entry wins over a built-in with the same abbreviation.
fn build_dictionary(settings: &DictionarySettings) -> AbbreviationDictionary {
    let mut dictionary = if settings.seed_defaults {
        AbbreviationDictionary::with_defaults()
    } else {
        AbbreviationDictionary::new()
    };
    for entry in &settings.entries {
        if dictionary.add(&entry.short, &entry.full).is_none() {
            warn!(short = %entry.short, "skipping blank dictionary entry");
        }
    }
    dictionary
}

fn build_session(settings: &TinnhanhSettings, dictionary: AbbreviationDictionary) -> DraftSession {
    let gemini = &settings.gemini;
    let config = GeminiConfig::new(&gemini.article_model)
        .with_base_url(&gemini.base_url)
        .with_timeout(Duration::from_millis(gemini.timeout_ms))
        .with_temperature(gemini.temperature);
    let client = GeminiClient::new(config, Arc::new(EnvCredentials));

    DraftSession::new(Arc::new(client), SharedDictionary::from(dictionary)).with_models(
        ModelSelection {
            refine: Some(gemini.refine_model.clone()),
            article: Some(gemini.article_model.clone()),
        },
    )
}

async fn run_generate(session: &DraftSession, args: GenerateArgs) -> Result<serde_json::Value> {
    session.set_brief(read_input(args.input.input.as_deref())?);

    let mut changes = Vec::new();
    if args.refine {
        let outcome = session.refine_brief().await.map_err(draft_failed)?;
        changes = outcome.changes;
    }

    let custom_template = match &args.template {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template: {}", path.display()))?,
        ),
        None => None,
    };
    let config = ArticleConfig {
        abbreviate_victim: args.abbreviate_victim,
        abbreviate_subject: args.abbreviate_subject,
        custom_template,
    };

    let article = session
        .generate_article(args.topic, args.length, &config)
        .await
        .map_err(draft_failed)?;

    if args.refine {
        Ok(json!({ "brief": session.brief(), "changes": changes, "article": article }))
    } else {
        Ok(serde_json::to_value(article)?)
    }
}

async fn run_rewrite(session: &DraftSession, args: RewriteArgs) -> Result<serde_json::Value> {
    let input = read_input(args.input.input.as_deref())?;
    let stored = match serde_json::from_str::<GeneratedArticle>(&input) {
        Ok(article) => session.set_article(article),
        Err(_) => session.set_editable_text(&input),
    };
    stored.map_err(draft_failed)?;

    let article = session
        .rewrite_article(args.target, args.instruction.as_deref())
        .await
        .map_err(draft_failed)?;
    Ok(serde_json::to_value(article)?)
}

fn run_dict(action: DictAction, dictionary: &AbbreviationDictionary) -> Result<serde_json::Value> {
    match action {
        DictAction::List => Ok(serde_json::to_value(dictionary.all())?),
        DictAction::Expand(args) => {
            let text = read_input(args.input.as_deref())?;
            Ok(serde_json::to_value(expand(&text, dictionary))?)
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display())),
        None => {
            let mut buf = String::new();
            let _ = std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn draft_failed(err: DraftError) -> anyhow::Error {
    error!(kind = err.error_kind(), error = %err, "pipeline failed");
    anyhow::anyhow!("{} ({err})", err.user_message())
}
