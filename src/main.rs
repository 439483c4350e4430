//! Onboarding Wizard - command line driver
//!
//! Replays a JSON session script against the onboarding wizard and hands the
//! submitted payload to a sink.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use onboarding_wizard::attachment::photo_data_url;
use onboarding_wizard::config::WizardConfig;
use onboarding_wizard::onboarding::{onboarding_plan, onboarding_session, OnboardingPayload};
use onboarding_wizard::script;
use onboarding_wizard::sink::{JsonFileSink, PayloadSink, StdoutSink};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "onboarding-wizard",
    about = "Drive the employee onboarding wizard from the command line",
    version
)]
struct Cli {
    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a session script and deliver the submitted payload
    Run(RunArgs),
    /// Print the step definitions as JSON
    Schema,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON array of wizard commands
    #[arg(long)]
    script: PathBuf,
    /// Image attached as the employee photo
    #[arg(long)]
    photo: Option<PathBuf>,
    /// Write the payload here instead of the configured output
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => WizardConfig::load_from(path)?,
        None => WizardConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match cli.command {
        Command::Run(args) => run(args, &config).await,
        Command::Schema => print_schema(),
    }
}

async fn run(args: RunArgs, config: &WizardConfig) -> Result<()> {
    let commands = script::load(&args.script).await?;
    let mut session = onboarding_session()?;

    if let Some(photo) = &args.photo {
        let url = photo_data_url(photo, config.photo_max_bytes).await?;
        session.set_opaque(url)?;
    }

    let report = script::replay(&mut session, commands);
    for rejection in &report.rejected {
        tracing::warn!(
            index = rejection.index,
            command = rejection.command,
            "{}",
            rejection.message
        );
        for (path, message) in rejection.errors.iter() {
            tracing::warn!(field = path, "{message}");
        }
    }

    let Some(aggregate) = session.final_payload() else {
        bail!(
            "session not submitted: stopped at step {} of {}",
            session.current_position(),
            onboarding_plan()?.len()
        );
    };
    let payload = OnboardingPayload::from_aggregate(aggregate)?;

    let pretty = config.pretty_payload();
    let mut sink: Box<dyn PayloadSink> = match args.output.or_else(|| config.output_path.clone()) {
        Some(path) => Box::new(JsonFileSink::new(path, pretty)),
        None => Box::new(StdoutSink::new(pretty)),
    };
    sink.deliver(&payload).await?;
    tracing::info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        sink = %sink.describe(),
        "onboarding payload delivered"
    );
    Ok(())
}

fn print_schema() -> Result<()> {
    let steps: Vec<serde_json::Value> = onboarding_plan()?
        .iter()
        .map(|step| {
            serde_json::json!({
                "name": step.name,
                "title": step.title,
                "cardinality": step.cardinality,
                "opaqueField": step.opaque_field,
                "schema": step.schema,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}
