mod config;

use anyhow::{Context, Result};
use checkrelay_core::{
    BuildResult, CheckConclusion, CheckRunContext, CheckRunOutput, CheckRunRequest, CheckStatus,
    JsonFilePublishRecord, StatusChecksProperties,
};
use checkrelay_github::{GithubCredentials, GithubSessionProvider};
use checkrelay_publisher::{ChecksPublisher, ConsoleBuildLog, PublishOutcome, PublisherConfig};
use clap::{Args, Parser, Subcommand};
use crate::config::AppConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "checkrelay")]
#[command(about = "Publish build status to GitHub Checks, gated by organization membership")]
#[command(version = VERSION)]
struct Cli {
    /// Configuration file (defaults to ./checkrelay.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish one status transition of the current build
    Publish(PublishArgs),

    /// Print the check run ids recorded for a build
    Record {
        /// Path to the build's publish record
        #[arg(short, long, default_value = "checkrelay-record.json")]
        file: PathBuf,
    },
}

#[derive(Args)]
struct PublishArgs {
    /// Repository full name, e.g. owner/repo
    #[arg(long, env = "CHECKRELAY_REPOSITORY")]
    repository: String,

    /// Commit the check run is attached to
    #[arg(long, env = "GIT_COMMIT")]
    head_sha: String,

    /// Full name of the job, sent as the external id
    #[arg(long, env = "JOB_NAME")]
    job_name: String,

    /// URL of the build
    #[arg(long, env = "BUILD_URL", default_value = "")]
    build_url: String,

    /// Pull request author; empty for branch builds
    #[arg(long, env = "CHANGE_AUTHOR", default_value = "")]
    contributor: String,

    /// Check name (defaults to the configured name)
    #[arg(long)]
    name: Option<String>,

    /// Check status
    #[arg(long, default_value = "in_progress")]
    status: CheckStatus,

    /// Conclusion; implies a completed check
    #[arg(long, conflicts_with = "result")]
    conclusion: Option<CheckConclusion>,

    /// Build result, mapped to a conclusion; implies a completed check
    #[arg(long)]
    result: Option<BuildResult>,

    /// Output title
    #[arg(long)]
    title: Option<String>,

    /// Output summary
    #[arg(long)]
    summary: Option<String>,

    /// Output text
    #[arg(long)]
    text: Option<String>,

    /// Link shown on the check run (defaults to the build URL)
    #[arg(long)]
    details_url: Option<String>,

    /// Where check run ids of this build are kept between invocations
    #[arg(long, default_value = "checkrelay-record.json")]
    record: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Publish(args) => publish_command(cli.config, args).await?,
        Commands::Record { file } => record_command(file)?,
    }

    Ok(())
}

async fn publish_command(config_path: Option<PathBuf>, args: PublishArgs) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!("Configuration loaded successfully");

    let request = build_request(&args, &config.checks);
    let context = CheckRunContext::new(
        args.repository,
        args.head_sha,
        args.job_name,
        args.build_url,
    )
    .with_contributor(args.contributor);

    let mut credentials = GithubCredentials::new(config.github.token.clone());
    if let Some(uri) = &config.github.credential_api_url {
        credentials = credentials.with_api_uri(uri.clone());
    }
    let provider = GithubSessionProvider::with_default_api_url(credentials, &config.github.api_url);
    let publisher = ChecksPublisher::new(
        provider,
        PublisherConfig::new(config.github.organization.clone()).with_properties(config.checks),
    );

    let mut record = JsonFilePublishRecord::open_or_empty(&args.record);
    let mut log = ConsoleBuildLog::new(std::io::stdout());

    // Publishing is advisory: every outcome exits successfully
    match publisher.publish(&context, &mut record, &mut log, request).await {
        PublishOutcome::Published(reconciled) => info!(
            "Check run {} {}d with status {}",
            reconciled.id, reconciled.kind, reconciled.status
        ),
        PublishOutcome::Skipped(reason) => info!("Check run not published: {:?}", reason),
        PublishOutcome::Failed(message) => warn!("Check run publish failed: {}", message),
    }

    Ok(())
}

fn record_command(file: PathBuf) -> Result<()> {
    let record = JsonFilePublishRecord::open(&file)
        .with_context(|| format!("Failed to open publish record {}", file.display()))?;
    let json = serde_json::to_string_pretty(record.entries())?;
    println!("{}", json);
    Ok(())
}

/// Turn command line arguments into a check run request
fn build_request(args: &PublishArgs, properties: &StatusChecksProperties) -> CheckRunRequest {
    let name = args.name.clone().unwrap_or_else(|| properties.name.clone());
    let mut request = CheckRunRequest::new(name.clone(), args.status);

    let conclusion = args
        .conclusion
        .or_else(|| args.result.map(|result| properties.conclusion_for(result)));
    if let Some(conclusion) = conclusion {
        request = request.completed(conclusion);
    }

    if args.title.is_some() || args.summary.is_some() || args.text.is_some() {
        let mut output = CheckRunOutput::new(
            args.title.clone().unwrap_or(name),
            args.summary.clone().unwrap_or_default(),
        );
        if let Some(text) = &args.text {
            output = output.with_text(text.clone());
        }
        request = request.with_output(output);
    }

    if let Some(url) = &args.details_url {
        request = request.with_details_url(url.clone());
    }

    request
}
