//! CLI tool for turning text into a PowerPoint deck built on a template.

use anyhow::{bail, Context, Result};
use autodeck_core::{OutlinePlan, Provider, OUTPUT_FILENAME};
use autodeck_outline::{GeneratorConfig, OutlineGenerator};
use autodeck_pptx::{DeckReader, DeckRenderer};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Turn free text into a slide deck using a language model and a template.
#[derive(Parser, Debug)]
#[command(name = "autodeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a model for a slide plan and render it onto a template
    Generate {
        /// Text to turn into slides (`-` reads stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Template deck (.pptx or .potx)
        #[arg(short, long)]
        template: PathBuf,

        /// Model provider: openai, anthropic or gemini
        #[arg(short, long)]
        provider: Provider,

        /// Extra instructions for the model (tone, audience, length)
        #[arg(short, long, default_value = "")]
        guidance: String,

        /// API key (default: the provider's usual environment variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Model to use instead of the provider default
        #[arg(long)]
        model: Option<String>,

        /// API base URL to use instead of the provider default
        #[arg(long)]
        base_url: Option<String>,

        /// Output deck
        #[arg(short, long, default_value = OUTPUT_FILENAME)]
        output: PathBuf,

        /// Also save the slide plan as JSON
        #[arg(long)]
        plan_out: Option<PathBuf>,
    },

    /// Render a saved slide plan (JSON) without calling a model
    Render {
        /// Slide plan as written by `generate --plan-out`
        #[arg(long)]
        plan: PathBuf,

        /// Template deck (.pptx or .potx)
        #[arg(short, long)]
        template: PathBuf,

        /// Output deck
        #[arg(short, long, default_value = OUTPUT_FILENAME)]
        output: PathBuf,
    },

    /// Print the titles and bullets of a deck
    Inspect {
        /// Deck to read (.pptx)
        deck: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args.command) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate {
            input,
            template,
            provider,
            guidance,
            api_key,
            model,
            base_url,
            output,
            plan_out,
        } => {
            let text = read_input(&input)?;
            if text.trim().is_empty() {
                bail!("Please provide text input");
            }
            let api_key = api_key
                .or_else(|| std::env::var(provider.api_key_env()).ok())
                .filter(|k| !k.trim().is_empty())
                .with_context(|| {
                    format!(
                        "Please provide an API key (--api-key or {})",
                        provider.api_key_env()
                    )
                })?;
            let template_bytes = read_file(&template)?;

            let mut config = GeneratorConfig::new();
            if let Some(model) = &model {
                config = config.with_model(provider, model);
            }
            if let Some(base_url) = &base_url {
                config = config.with_base_url(provider, base_url);
            }

            eprintln!("Generating presentation outline with {}...", provider);
            let plan = OutlineGenerator::new()
                .with_config(config)
                .generate(&text, &guidance, &api_key, provider)?;
            eprintln!("  Planned {} slides", plan.len());

            if let Some(path) = &plan_out {
                let json = serde_json::to_string_pretty(&plan)?;
                fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::debug!("Slide plan written to {}", path.display());
            }

            render_to(&plan, &template_bytes, &output)
        }
        Command::Render {
            plan,
            template,
            output,
        } => {
            let json = fs::read_to_string(&plan)
                .with_context(|| format!("Failed to read {}", plan.display()))?;
            let plan: OutlinePlan = serde_json::from_str(&json)
                .with_context(|| format!("Invalid slide plan in {}", plan.display()))?;
            let template_bytes = read_file(&template)?;
            render_to(&plan, &template_bytes, &output)
        }
        Command::Inspect { deck } => inspect(&deck),
    }
}

fn render_to(plan: &OutlinePlan, template: &[u8], output: &Path) -> Result<()> {
    eprintln!("Creating presentation...");
    let deck = DeckRenderer::new().render(plan, template)?;
    fs::write(output, &deck.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    eprintln!(
        "Presentation created successfully! {} slides written to {}",
        deck.slide_count,
        output.display()
    );
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let bytes = read_file(path)?;
    let slides = DeckReader::new().read(&bytes)?;

    for slide in &slides {
        println!(
            "{}. {}",
            slide.number,
            slide.title().unwrap_or_else(|| "(untitled)".to_string())
        );
        for bullet in slide.bullets() {
            println!("   - {}", bullet);
        }
    }

    log::debug!("{} slides in {}", slides.len(), path.display());
    Ok(())
}

/// Input text from a file, or stdin for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to open {}", path.display()))
}
