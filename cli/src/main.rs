//! CLI for the YouTrack to Azure DevOps migrator.
//!
//! This tool copies YouTrack issues, with their comments and attachments,
//! into Azure DevOps work items.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use youtrack_devops_migrator::{
    DevOpsClient, FailurePolicy, IssueReport, IssueStatus, MigratorConfig, ProjectMigrator,
    RunSummary, RunnerError, SourceTracker, YouTrackClient,
};

/// YouTrack to Azure DevOps migrator - Copy issues into work items with provenance.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, default_value = "migrator.toml")]
    config: PathBuf,

    /// YouTrack permanent token. Overrides the configuration file and
    /// `YOUTRACK_TOKEN`.
    #[arg(long)]
    youtrack_token: Option<String>,

    /// Azure DevOps personal access token. Overrides the configuration file
    /// and `AZURE_DEVOPS_TOKEN`.
    #[arg(long)]
    devops_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Migrate every issue of a project.
    Migrate {
        /// Source project. Overrides `[run] project`.
        #[arg(long)]
        project: Option<String>,

        /// Maximum number of issues. Overrides `[run] issue-limit`.
        #[arg(long)]
        limit: Option<usize>,

        /// Keep going after an issue cannot be created.
        #[arg(long)]
        continue_on_failure: bool,
    },

    /// Migrate a single issue.
    Issue {
        /// Source issue identifier, e.g. DEMO-1.
        id: String,
    },

    /// Print the custom fields of an issue as JSON.
    Fields {
        /// Source issue identifier, e.g. DEMO-1.
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(Some(summary)) => {
            print_summary(&summary);

            if summary.aborted_at.is_some() {
                ExitCode::from(2)
            } else if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Ok(None) => ExitCode::from(0),
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic. Returns a summary for migration commands.
async fn run(args: Args) -> Result<Option<RunSummary>, RunnerError> {
    let mut config = MigratorConfig::load(&args.config)?;
    if let Some(token) = args.youtrack_token {
        config = config.with_source_token(token);
    }
    if let Some(token) = args.devops_token {
        config = config.with_destination_token(token);
    }

    let youtrack = YouTrackClient::new(config.source())?;

    let (project, limit, continue_on_failure) = match args.command {
        Command::Fields { id } => {
            let issue = youtrack.fetch_issue(&id).await?;
            println!(
                "{:#}",
                json!({ "id": issue.id, "customFields": issue.custom_fields })
            );
            return Ok(None);
        }
        Command::Issue { id } => {
            let devops = DevOpsClient::new(config.destination(), config.destination_token()?)?;
            let policy = config.mapping_policy();
            let runner = ProjectMigrator::new(&config, &youtrack, &devops, &policy)?;

            let report = runner.migrate_issue(&id).await;
            let mut summary = RunSummary {
                issues_discovered: 1,
                ..RunSummary::default()
            };
            summary.record(report);
            return Ok(Some(summary));
        }
        Command::Migrate {
            project,
            limit,
            continue_on_failure,
        } => (project, limit, continue_on_failure),
    };

    if let Some(project) = project {
        config = config.with_project(project);
    }
    if let Some(limit) = limit {
        config = config.with_issue_limit(limit)?;
    }
    if continue_on_failure {
        config = config.with_failure_policy(FailurePolicy::Continue);
    }

    let devops = DevOpsClient::new(config.destination(), config.destination_token()?)?;
    let policy = config.mapping_policy();
    let runner = ProjectMigrator::new(&config, &youtrack, &devops, &policy)?;
    let summary = runner
        .run(config.project()?, config.run().issue_limit)
        .await?;
    Ok(Some(summary))
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    if !summary.project.is_empty() {
        println!("  Project: {}", summary.project);
    }
    println!("  Issues discovered: {}", summary.issues_discovered);
    println!("  Issues migrated: {}", summary.issues_migrated);
    println!("  Issues incomplete: {}", summary.issues_incomplete);
    println!("  Issues not created: {}", summary.issues_not_created);
    println!("  Retries: {}", summary.retries);
    if let Some(issue) = &summary.aborted_at {
        println!("  Aborted at: {issue}");
    }

    for report in &summary.reports {
        print_report(report);
    }
}

fn print_report(report: &IssueReport) {
    match &report.status {
        IssueStatus::Migrated { .. } => {}
        IssueStatus::Incomplete {
            work_item_id,
            failures,
        } => {
            println!(
                "\n  {} -> #{work_item_id} (incomplete)",
                report.issue_id
            );
            for failure in failures {
                println!("    {}: {}", failure.step, failure.error);
            }
        }
        IssueStatus::NotCreated { error } => {
            println!("\n  {} (not created)", report.issue_id);
            println!("    {error}");
        }
    }
}
