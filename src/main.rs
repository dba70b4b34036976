use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use trip_planner::config::{Config, ContextPolicy};
use trip_planner::llm::Provider;
use trip_planner::trip::pipeline::failure_message;
use trip_planner::trip::{Month, TripPlan, TripRequest};
use trip_planner::{LlmOverride, build_pipeline, output};

fn make_llm_override(provider: Option<Provider>, model: Option<String>) -> Option<LlmOverride> {
    if provider.is_none() && model.is_none() {
        return None;
    }
    Some(LlmOverride { provider, model })
}

#[derive(Parser)]
#[command(
    name = "trip-planner",
    about = "Plan a trip: live weather, hotels and flights folded into an AI-written itinerary"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Fetch context for a destination and generate a day-by-day plan
    Plan {
        /// Destination city
        destination: String,

        /// Number of days (1-14)
        #[arg(short, long, default_value_t = 3)]
        days: u32,

        /// Month of travel (e.g. June, jun)
        #[arg(short, long, default_value = "January")]
        month: Month,

        /// Departure city [default: pipeline.default_origin from config]
        #[arg(long)]
        origin: Option<String>,

        /// Path to config file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Output path for the HTML page
        #[arg(short, long, default_value = "trip-plan.html")]
        output: PathBuf,

        /// Also print the plan as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Keep going when a weather/hotel/flight provider fails
        #[arg(long)]
        degrade: bool,

        /// LLM provider override: groq, anthropic, openrouter, openai
        #[arg(long)]
        provider: Option<Provider>,

        /// LLM model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Render an HTML page from a saved plan JSON (no API calls)
    Render {
        /// Path to a plan JSON file produced by `plan --json`
        #[arg(long)]
        plan: PathBuf,

        /// Output path for the HTML page
        #[arg(short, long, default_value = "trip-plan.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan {
            destination,
            days,
            month,
            origin,
            config,
            output,
            json,
            degrade,
            provider,
            model,
        } => {
            let mut cfg = load_config(&config)?;
            if degrade {
                cfg.pipeline.on_context_failure = ContextPolicy::Degrade;
            }
            cfg.validate()?;

            let origin = origin.unwrap_or_else(|| cfg.pipeline.default_origin.clone());
            let request = TripRequest::new(destination, days, month, origin)?;
            let llm_override = make_llm_override(provider, model);
            let pipeline = build_pipeline(&cfg, llm_override.as_ref())?;

            let plan = match pipeline.plan(&request).await {
                Ok(plan) => plan,
                Err(e) => {
                    eprintln!("{}", failure_message(&e));
                    std::process::exit(1);
                }
            };

            write_page(&plan, &output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
            Ok(())
        }
        Command::Render { plan, output } => {
            let plan: TripPlan = serde_json::from_str(&std::fs::read_to_string(&plan)?)?;
            write_page(&plan, &output)
        }
    }
}

/// A missing config file is fine; everything has a default or comes from the environment.
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Ok(Config::load(path)?)
    } else {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        Ok(Config::default())
    }
}

fn write_page(plan: &TripPlan, output_path: &Path) -> Result<()> {
    let html = output::render_trip_plan(plan)?;
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, &html)?;

    eprintln!(
        "Trip plan rendered: {} ({} hotels, {} flights{})",
        output_path.display(),
        plan.hotels.len(),
        plan.flights.len(),
        if plan.is_degraded() { ", degraded" } else { "" }
    );
    Ok(())
}
