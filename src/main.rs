use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use harvest_advisor::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use harvest_advisor::{
    analyze, build_baseline, compare, AnalysisRequest, EngineError, LeadRequest, Urgency,
};
use tracing::info;

mod dataset;
mod report;

#[derive(Parser)]
#[command(name = "harvest-advisor")]
#[command(about = "Seasonal price risk and post-harvest recommendations", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ./harvest-advisor.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the configured log level
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct Target {
    /// Price history CSV with commodity,year,month,price columns
    #[arg(long)]
    csv: PathBuf,
    #[arg(long)]
    commodity: String,
    /// Calendar month to assess (defaults to the current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
    /// Current price; defaults to the mean of the most recent records
    #[arg(long)]
    current_price: Option<f64>,
}

impl Target {
    fn request(&self) -> AnalysisRequest {
        let month = self.month.unwrap_or_else(|| Local::now().month());
        AnalysisRequest {
            commodity: self.commodity.clone(),
            target_month: month,
            current_price: self.current_price,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the seasonal baseline for a commodity
    Baseline {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        commodity: String,
    },
    /// Score price risk and recommend an action
    Assess {
        #[command(flatten)]
        target: Target,
        /// Emit the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compare sell-now, cold storage and solar drying for a per-unit price
    Compare {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        commodity: String,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        target: Target,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the buyer-matching lead payload as JSON
    Lead {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        quantity: f64,
        #[arg(long)]
        location: String,
        /// high, medium or low; follows the risk tier when omitted
        #[arg(long)]
        urgency: Option<String>,
    },
}

fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(config.logging.filter()?);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if let Some(engine) = error.downcast_ref::<EngineError>() {
                eprintln!("{}", engine.user_message());
            }
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            log_level: cli.log_level.clone(),
            ..ConfigOverrides::default()
        },
    })
    .context("failed to load configuration")?;
    init_logging(&config)?;
    let engine = &config.engine;

    match cli.command {
        Commands::Baseline { csv, commodity } => {
            let records = dataset::load_records(&csv)?;
            info!(records = records.len(), "loaded price history");
            let baseline = build_baseline(&records, &commodity)?;

            println!("Seasonal baseline for {}:", baseline.commodity);
            for (month, entry) in baseline.months.iter() {
                println!(
                    "- {:<9} {:>10.2} ({} observations)",
                    report::month_name(*month),
                    entry.average_price,
                    entry.observations
                );
            }
        }
        Commands::Assess { target, json } => {
            let records = dataset::load_records(&target.csv)?;
            info!(records = records.len(), "loaded price history");
            let analysis = analyze(&records, &target.request(), engine)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
                return Ok(());
            }

            let assessment = &analysis.assessment;
            let recommendation = &analysis.recommendation;
            println!(
                "{} in {}: {:+.1}% vs seasonal, {} (health {}/100, {})",
                analysis.commodity,
                report::month_name(analysis.target_month),
                assessment.deviation_pct,
                assessment.risk_tier,
                assessment.health_score,
                assessment.health_label
            );
            println!(
                "Suggested action: {} via {} ({})",
                recommendation.action, recommendation.infrastructure, recommendation.timeframe
            );
            println!("Reason: {}", recommendation.reason);
            for entry in analysis.comparison.entries.iter() {
                println!("- {}: {:.2}", entry.option, entry.net_value);
            }
            println!("Best payoff: {}", analysis.comparison.best);
        }
        Commands::Compare { price, commodity } => {
            let comparison = compare(price, &commodity, &engine.economics)?;
            println!(
                "Net value per {} units of {}:",
                comparison.reference_quantity,
                commodity.trim()
            );
            for entry in comparison.entries.iter() {
                println!("- {}: {:.2}", entry.option, entry.net_value);
            }
            println!("Best payoff: {}", comparison.best);
        }
        Commands::Report { target, out } => {
            let records = dataset::load_records(&target.csv)?;
            let analysis = analyze(&records, &target.request(), engine)?;
            let report = report::build_report(&analysis, Some(Local::now().date_naive()));
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Lead {
            target,
            quantity,
            location,
            urgency,
        } => {
            let urgency = urgency.as_deref().map(str::parse::<Urgency>).transpose()?;
            let records = dataset::load_records(&target.csv)?;
            let analysis = analyze(&records, &target.request(), engine)?;
            let lead = LeadRequest::from_analysis(&analysis, quantity, &location, urgency)?;
            println!("{}", serde_json::to_string_pretty(&lead)?);
        }
    }

    Ok(())
}
