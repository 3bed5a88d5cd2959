use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use inquire::Confirm;
use mediarename::{
    catalog::ImdbId,
    plan::{Mode, Plan, RenamePlanner, Renamer},
    tvmaze::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TvMazeClient},
    video::{MEDIA_EXTENSIONS, find_files},
};
use reqwest::Url;
use serde::Serialize;
use std::{path::PathBuf, time::Duration};
use tabled::{Table, Tabled, settings::Style};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(clap::Args, Debug)]
struct RenameArgs {
    /// IMDb ID of the show, e.g. tt0944947
    imdb: ImdbId,
    /// File or directory to search for episodes
    source: PathBuf,
    /// Library root, defaults to the parent of the source
    target: Option<PathBuf>,
    /// Apply the plan instead of only printing it
    #[arg(long)]
    commit: bool,
    /// Do not ask before applying
    #[arg(short, long)]
    yes: bool,
    /// Media extensions to consider
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
    /// Catalog API base URL
    #[arg(long, env = "MEDIARENAME_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: Url,
    /// HTTP timeout in seconds
    #[arg(long, env = "MEDIARENAME_TIMEOUT", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move files into the library
    Move(RenameArgs),
    /// Copy files into the library
    Copy(RenameArgs),
    /// Create hard links in the library
    Link(RenameArgs),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Tabled)]
struct RenameRow {
    #[tabled(rename = "Old")]
    old: String,
    #[tabled(rename = "New")]
    new: String,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Skipped")]
    path: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

#[derive(Serialize)]
struct JsonRename {
    old: String,
    new: String,
}

#[derive(Serialize)]
struct JsonSkipped {
    path: String,
    reason: String,
}

#[derive(Serialize)]
struct JsonPlan {
    renames: Vec<JsonRename>,
    skipped: Vec<JsonSkipped>,
}

// Paths go out lossily; a file name that is not UTF-8 must not abort the report.
fn plan_json(plan: &Plan) -> Result<String> {
    let out = JsonPlan {
        renames: plan
            .renames
            .iter()
            .map(|r| JsonRename {
                old: r.old.display().to_string(),
                new: r.new.display().to_string(),
            })
            .collect(),
        skipped: plan
            .skipped
            .iter()
            .map(|s| JsonSkipped {
                path: s.path.display().to_string(),
                reason: s.reason.to_string(),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn print_plan(plan: &Plan, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            println!("{}", plan_json(plan)?);
        }
        Format::Table => {
            if !plan.renames.is_empty() {
                let rows = plan.renames.iter().map(|r| RenameRow {
                    old: r.old.display().to_string(),
                    new: r.new.display().to_string(),
                });
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
            if !plan.skipped.is_empty() {
                let rows = plan.skipped.iter().map(|s| SkippedRow {
                    path: s.path.display().to_string(),
                    reason: s.reason.to_string(),
                });
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
    }

    let summary = format!(
        "{} to rename, {} skipped",
        plan.renames.len(),
        plan.skipped.len()
    );
    if plan.skipped.is_empty() {
        eprintln!("{}", summary.green());
    } else {
        eprintln!("{}", summary.yellow());
    }
    Ok(())
}

async fn organize(mode: Mode, args: RenameArgs) -> Result<()> {
    let target = args
        .target
        .as_deref()
        .or_else(|| args.source.parent())
        .context("Failed to determine target")?;

    let extensions: Vec<String> = if args.ext.is_empty() {
        MEDIA_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
    } else {
        args.ext.clone()
    };

    let files = find_files(&args.source, &extensions)?;
    if files.is_empty() {
        bail!("no files found to rename under {:?}", args.source);
    }

    let client = TvMazeClient::new(args.api_url.clone(), Duration::from_secs(args.timeout))
        .context("Failed to build HTTP client")?;
    let plan = RenamePlanner::new(client)
        .plan(&files, target, &args.imdb)
        .await?;

    print_plan(&plan, args.format)?;

    if args.commit && !args.yes && !plan.renames.is_empty() {
        let question = format!("{:?} {} files?", mode, plan.renames.len());
        if !Confirm::new(&question).with_default(false).prompt()? {
            return Ok(());
        }
    }

    let applied = Renamer::new(mode, args.commit).apply(&plan.renames)?;
    if args.commit {
        eprintln!("{}", format!("{applied} files written").green());
    } else {
        eprintln!("{}", "Dry run, pass --commit to apply".yellow());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Move(rename) => organize(Mode::Move, rename).await,
        Commands::Copy(rename) => organize(Mode::Copy, rename).await,
        Commands::Link(rename) => organize(Mode::Link, rename).await,
    }
}
