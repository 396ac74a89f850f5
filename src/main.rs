//! looper-report: HTML reports and status checks for looper projects

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use looper_report::config::{load_config, starter_config, CONFIG_FILENAME};
use looper_report::diagnostics::LogSink;
use looper_report::project::Project;
use looper_report::reporter::{ConsoleReporter, HtmlRenderer, JsonReporter, ReportBuilder};
use looper_report::status::summarize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Build cross-linked HTML reports for a looper project
#[derive(Parser, Debug)]
#[command(name = "looper-report")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project folder (default: current directory)
    path: Option<PathBuf>,

    /// Path to config file (default: search looper-report.json in the project folder and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Active subproject
    #[arg(long, global = true)]
    subproject: Option<String>,

    /// Output folder, overriding the config
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the HTML report and print the summary page path
    Report {
        /// Project folder (default: current directory)
        path: Option<PathBuf>,
    },

    /// Print the run status of every sample (exit 1 if any needs attention)
    Check {
        /// Project folder (default: current directory)
        path: Option<PathBuf>,

        /// Flag names to look for (default: every flag file)
        #[arg(long = "flag", value_name = "FLAG")]
        flags: Vec<String>,

        /// Output format as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Create looper-report.json with sensible defaults
    Init {
        /// Project name (default: folder name)
        #[arg(long)]
        name: Option<String>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(args: &Args) {
    let log_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(&args);

    match &args.command {
        None => run_report(&args, args.path.as_deref()),
        Some(Commands::Report { path }) => run_report(&args, path.as_deref().or(args.path.as_deref())),
        Some(Commands::Check { path, flags, json }) => {
            run_check(&args, path.as_deref().or(args.path.as_deref()), flags, *json)
        }
        Some(Commands::Init { name, dir }) => run_init(name.as_deref(), dir.as_deref()),
    }
}

/// Resolve the project from the folder, config file and CLI overrides
fn load_project(args: &Args, path: Option<&Path>) -> Result<Project> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let work_dir = match path {
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
        None => cwd.clone(),
    };
    if !work_dir.is_dir() {
        anyhow::bail!("Project folder not found: {}", work_dir.display());
    }

    let mut loaded = load_config(&work_dir, args.config.as_deref())?;
    // --output-dir is relative to where the command runs, not to the config file
    let output_dir = args
        .output_dir
        .as_ref()
        .map(|d| cwd.join(d).to_string_lossy().into_owned());
    loaded.config = loaded
        .config
        .merge_with_cli(args.subproject.as_deref(), output_dir.as_deref());

    Project::from_config(loaded, &LogSink)
}

fn run_report(args: &Args, path: Option<&Path>) -> Result<ExitCode> {
    let project = load_project(args, path)?;
    let renderer = HtmlRenderer::new();
    let index = ReportBuilder::new(&project, &renderer, &LogSink)
        .build()
        .context("Failed to build report")?;
    println!("{}", index.display());
    Ok(ExitCode::SUCCESS)
}

fn run_check(args: &Args, path: Option<&Path>, flags: &[String], json: bool) -> Result<ExitCode> {
    let project = load_project(args, path)?;
    let samples: Vec<(String, PathBuf)> = project
        .samples
        .iter()
        .map(|s| (s.clone(), project.sample_dir(s)))
        .collect();
    let summary = summarize(&samples, flags, &LogSink)?;

    if json {
        println!("{}", JsonReporter::new().pretty().report(&project.name, &summary));
    } else if args.quiet {
        ConsoleReporter::new().report_quiet(&project.name, &summary);
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }
        reporter.report(&project.name, &summary);
    }

    if summary.has_problems() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_init(name: Option<&str>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let name = match name {
        Some(n) => n.to_string(),
        None => std::path::absolute(dir)
            .ok()
            .and_then(|d| d.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string()),
    };

    let json = serde_json::to_string_pretty(&starter_config(&name))
        .context("Failed to serialize config")?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    std::fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("{} {}", "Created".green(), config_path.display());
    Ok(ExitCode::SUCCESS)
}
