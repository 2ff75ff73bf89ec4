//! CLI interface for reflect

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::engine::ReflectionEngine;
use crate::progression::CaptureEvent;
use crate::prompts::PromptSource;
use crate::types::Category;

#[derive(Parser)]
#[command(name = "reflect")]
#[command(about = "Adaptive prompting and skill progression for reflective journaling", long_about = None)]
#[command(version)]
struct Cli {
    /// Use this config file instead of the platform default
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stage, counters and progress toward the next stage
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a saved journal entry
    Capture {
        /// Entry text (read from stdin when omitted)
        text: Option<String>,
        /// Read the entry from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
        /// The phase 2 question was answered
        #[arg(long)]
        phase2: bool,
        /// Category the entry was written for
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
        /// Domain label for distribution statistics
        #[arg(long)]
        domain: Option<String>,
        /// Override the counted word total
        #[arg(long)]
        words: Option<u32>,
    },
    /// Get the next prompt to write about
    Prompt {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a phase 2 follow-up question for a category
    Followup {
        #[arg(value_parser = parse_category)]
        category: Category,
        /// A detail from the phase 1 answer to refer back to
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Analyze an entry without recording it
    Signals {
        /// Entry text (read from stdin when omitted)
        text: Option<String>,
        /// Also ask the remote service for a quality assessment and questions
        #[arg(long)]
        remote: bool,
    },
    /// Show prompt cache fill per category
    Cache,
    /// Configure the engine
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Print the config file path
        #[arg(long)]
        path: bool,
        /// Set the generation model
        #[arg(long)]
        set_model: Option<String>,
        /// Set the chat completions base URL
        #[arg(long)]
        set_base_url: Option<String>,
        /// Enable remote generation
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Disable remote generation
        #[arg(long)]
        disable: bool,
        /// Reset configuration to defaults
        #[arg(long)]
        reset: bool,
    },
}

fn parse_category(s: &str) -> std::result::Result<Category, String> {
    Category::from_label(s).ok_or_else(|| {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category '{}', expected one of: {}", s, labels.join(", "))
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn read_text(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read entry file {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read entry from stdin")?;
    Ok(buf)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let config = load_config(cli.config.as_ref())?;
            show_status(&ReflectionEngine::from_config(&config), false)?;
        }
        Some(Commands::Status { json }) => {
            let config = load_config(cli.config.as_ref())?;
            show_status(&ReflectionEngine::from_config(&config), json)?;
        }
        Some(Commands::Capture { text, file, phase2, category, domain, words }) => {
            let config = load_config(cli.config.as_ref())?;
            let engine = ReflectionEngine::from_config(&config);
            let text = read_text(text, file)?;
            if text.trim().is_empty() {
                anyhow::bail!("Entry is empty");
            }

            let mut event = CaptureEvent::new(text).with_phase2(phase2);
            if let Some(words) = words {
                event = event.with_word_count(words);
            }
            if let Some(category) = category {
                event = event.with_category(category);
            }
            if let Some(domain) = &domain {
                event = event.with_domain(domain);
            }

            let change = engine.record_capture(&event);
            println!(
                "Recorded capture #{} ({} words, average {:.1})",
                change.capture_count, event.word_count, change.average_words
            );
            if let Some(stage) = change.advanced_to {
                println!("Advanced to stage {}!", stage);
            }
            if change.interpretation_drift {
                println!("Recent entries lean on interpretation. Try describing what you saw or heard first.");
            }
            if !change.persisted {
                println!("Warning: progress could not be saved and is kept for this session only.");
            }
        }
        Some(Commands::Prompt { json }) => {
            let config = load_config(cli.config.as_ref())?;
            let engine = ReflectionEngine::from_config(&config);
            let next = engine.next_prompt().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&next)?);
            } else {
                let source = match next.source {
                    PromptSource::Cache => "cached",
                    PromptSource::Generated => "generated",
                    PromptSource::Static => "built-in",
                };
                println!("[{}] ({})", next.category, source);
                println!();
                println!("{}", next.phase1);
                if let Some(phase2) = &next.phase2 {
                    println!();
                    println!("Then: {}", phase2);
                }
            }
        }
        Some(Commands::Followup { category, key }) => {
            let config = load_config(cli.config.as_ref())?;
            let engine = ReflectionEngine::from_config(&config);
            match engine.followup(category, key.as_deref()) {
                Some(question) => println!("{}", question),
                None => println!("No follow-up at this stage. Write freely."),
            }
        }
        Some(Commands::Signals { text, remote }) => {
            let text = read_text(text, None)?;
            let config = load_config(cli.config.as_ref())?;
            let engine = ReflectionEngine::from_config(&config);
            let signals = engine.signals(&text);

            println!("Causal markers:      {}", signals.causal_hits);
            println!("Perspective markers: {}", signals.perspective_hits);
            println!("Interpretation:      {}", if signals.has_interpretation { "yes" } else { "no" });
            println!("Sensory detail:      {}", if signals.has_sensory { "yes" } else { "no" });

            if remote {
                let quality = engine.assess_quality(&text).await;
                println!();
                println!(
                    "Quality ({}):",
                    if quality.is_assessed() { "assessed" } else { "unavailable, showing defaults" }
                );
                println!("  specificity:    {:?}", quality.specificity);
                println!("  sensory detail: {:?}", quality.sensory_detail);
                println!("  verbatim:       {}", quality.verbatim_presence);
                println!("  behavioral:     {:.2}", quality.behavioral_vs_emotional);
                for suggestion in &quality.suggestions {
                    println!("  - {}", suggestion);
                }

                let questions = engine.extract_questions(&text).await;
                if !questions.is_empty() {
                    println!();
                    println!("Questions to come back to:");
                    for question in questions {
                        println!("  - {}", question);
                    }
                }
            }
        }
        Some(Commands::Cache) => {
            let config = load_config(cli.config.as_ref())?;
            let engine = ReflectionEngine::from_config(&config);
            println!("Prompt cache (ready at {} prompts):", config.prompts.min_pool_size);
            for stat in engine.cache_stats() {
                println!(
                    "  {:<14} {:>3}  {}",
                    stat.category,
                    stat.size,
                    if stat.ready { "ready" } else { "" }
                );
            }
        }
        Some(Commands::Config { show, path, set_model, set_base_url, enable, disable, reset }) => {
            if reset {
                config::reset_config()?;
            }
            if let Some(model) = set_model {
                config::set_model(&model)?;
            }
            if let Some(url) = set_base_url {
                config::set_base_url(&url)?;
            }
            if enable {
                config::set_generation_enabled(true)?;
            }
            if disable {
                config::set_generation_enabled(false)?;
            }
            if path {
                println!("{}", config::config_path()?.display());
            }
            if show {
                config::show_config()?;
            }
        }
    }

    Ok(())
}

fn show_status(engine: &ReflectionEngine, json: bool) -> Result<()> {
    let status = engine.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let record = &status.record;
    println!("Stage {} of 4", status.stage);
    println!("  captures:          {}", record.capture_count);
    println!("  average words:     {:.1}", record.average_words());
    println!("  phase 2 completed: {} ({:.0}%)", record.phase2_completion_count, record.phase2_rate() * 100.0);
    println!("  causal rate:       {:.2}", record.causal_rate());
    println!("  perspective rate:  {:.2}", record.perspective_rate());

    match &status.progress {
        Some(thresholds) => {
            println!();
            println!("Toward stage {}:", status.stage.number() + 1);
            for t in thresholds {
                println!(
                    "  [{}] {:<18} {:.2} / {:.2}",
                    if t.met { "x" } else { " " },
                    t.name,
                    t.current,
                    t.required
                );
            }
        }
        None => println!("\nFinal stage reached."),
    }

    if status.interpretation_drift {
        println!("\nRecent entries lean on interpretation over observation.");
    }
    if !status.generation_available {
        println!("\nRemote generation off: prompts come from the cache and built-in lists.");
    }
    Ok(())
}
