mod analysis;
mod config;
mod pr;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

/// PR Review: scans the files changed in a pull request for security,
/// performance, style, maintainability and architecture issues and prints
/// review feedback with an overall score.
#[derive(Parser, Debug)]
#[command(name = "pr-review", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// Not required when --mock or --payload is used.
    pr_url: Option<String>,

    /// Read the pull request from a JSON payload file instead of GitHub
    #[arg(short, long, conflicts_with = "pr_url")]
    payload: Option<PathBuf>,

    /// Use a built-in sample pull request (no GitHub token needed)
    #[arg(long)]
    r#mock: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = report::OutputFormat::Terminal)]
    format: report::OutputFormat,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report title (overrides [report] title in .pr-review.toml)
    #[arg(short, long)]
    title: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    let payload = if cli.r#mock {
        info!("using mock PR data for demo");
        pr::parse_payload(include_str!("../tests/fixtures/sample_payload.json"))?
    } else if let Some(path) = cli.payload.as_deref() {
        info!(path = %path.display(), "loading PR payload from file");
        pr::load_payload(path)?
    } else {
        let pr_url = cli.pr_url.as_deref().ok_or(
            "PR URL is required unless --mock or --payload is used. Usage: pr-review <URL>, pr-review --payload <FILE> or pr-review --mock",
        )?;

        let _main_span = info_span!("pr_review", pr_url = %pr_url).entered();

        info!("parsing PR URL");
        let parsed_url = pr::parse_pr_url(pr_url)?;
        debug!(owner = %parsed_url.owner, repo = %parsed_url.repo, pr = parsed_url.pr_number, "parsed PR URL");

        info!("fetching pull request from GitHub");
        let fetched = pr::fetch_pull_request(&parsed_url, &config).await?;
        info!(files = fetched.changes.len(), author = %fetched.author, "fetched PR");
        fetched
    };

    info!(pr = %payload.id, title = %payload.title, "running analysis");
    let result = analysis::analyze_pull_request(&payload).await;

    let title = cli.title.as_deref().unwrap_or(config.report_title());
    info!(title, "generating feedback");
    let feedback = report::generate_feedback(&result, title);
    report::output(&feedback, cli.format, cli.output.as_deref())?;
    info!(
        score = feedback.summary_report.overall_score,
        issues = result.summary.total_issues,
        "done"
    );

    Ok(())
}
