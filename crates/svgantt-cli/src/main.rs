//! svgantt CLI - Gantt chart renderer
//!
//! Command-line interface for rendering JSON task lists to SVG, checking them
//! for data problems, and inspecting the date axis of a view mode.

mod diagnostics;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use svgantt_core::date;
use svgantt_core::{GanttOptions, Task, TaskResolver, ViewMode};
use svgantt_render::{Gantt, Renderer, SvgRenderer};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::diagnostics::{ExitCode, OutputFormat};

#[derive(Parser)]
#[command(name = "svgantt")]
#[command(author, version, about = "Gantt chart layout engine", long_about = None)]
struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every command that lays out a chart
#[derive(clap::Args)]
struct ChartArgs {
    /// Task file (JSON array of tasks)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Options file (.toml or .json)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// View mode, e.g. "Day", "Week", "Quarter Day"
    #[arg(long)]
    view_mode: Option<String>,

    /// Language tag for month names (ja, en)
    #[arg(long)]
    language: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a task file to SVG
    Render {
        #[command(flatten)]
        chart: ChartArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only draw the column table
        #[arg(long, conflicts_with = "timeline_only")]
        columns_only: bool,

        /// Only draw the timeline
        #[arg(long)]
        timeline_only: bool,
    },

    /// Report data problems in a task file
    Check {
        /// Task file (JSON array of tasks)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,
    },

    /// Print the visible window and axis labels for a view mode
    Ticks {
        #[command(flatten)]
        chart: ChartArgs,
    },
}

fn main() -> Result<std::process::ExitCode> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Some(Commands::Render {
            chart,
            output,
            columns_only,
            timeline_only,
        }) => {
            let gantt = build_chart(&chart)?;
            for diagnostic in gantt.diagnostics() {
                warn!("{}", diagnostic);
            }

            let mut renderer = SvgRenderer::new();
            if columns_only {
                renderer = renderer.columns_only();
            } else if timeline_only {
                renderer = renderer.timeline_only();
            }
            let svg = renderer.render(&gantt).context("Failed to render chart")?;

            match output {
                Some(path) => {
                    std::fs::write(&path, svg)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(path = %path.display(), "wrote chart");
                }
                None => println!("{}", svg),
            }
            Ok(ExitCode::Success.into())
        }
        Some(Commands::Check {
            file,
            format,
            strict,
        }) => {
            let tasks = load_tasks(&file)?;
            let schedule = TaskResolver::new().resolve(&tasks);
            let name = file.display().to_string();

            let stdout = std::io::stdout();
            let stderr = std::io::stderr();
            let written = match format {
                OutputFormat::Json => diagnostics::emit(
                    &mut stdout.lock(),
                    format,
                    &name,
                    schedule.tasks.len(),
                    &schedule.diagnostics,
                ),
                OutputFormat::Text => diagnostics::emit(
                    &mut stderr.lock(),
                    format,
                    &name,
                    schedule.tasks.len(),
                    &schedule.diagnostics,
                ),
            };
            written.context("Failed to write diagnostics")?;

            Ok(ExitCode::from_diagnostics(&schedule.diagnostics, strict).into())
        }
        Some(Commands::Ticks { chart }) => {
            let gantt = build_chart(&chart)?;
            let view = gantt.view();
            println!(
                "{} {} .. {} ({} ticks, {}px)",
                view.mode,
                date::to_string(view.start, false),
                date::to_string(view.end, false),
                view.ticks.len(),
                view.grid_width()
            );
            for label in gantt.date_labels() {
                println!(
                    "{}\t{}\t{}",
                    date::to_string(label.date, true),
                    label.lower_text,
                    label.upper_text
                );
            }
            Ok(ExitCode::Success.into())
        }
        None => {
            println!("svgantt - Gantt chart layout engine");
            println!("Run with --help for usage information");
            Ok(ExitCode::Success.into())
        }
    }
}

fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tasks: Vec<Task> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse tasks in {}", path.display()))?;
    debug!(path = %path.display(), tasks = tasks.len(), "loaded tasks");
    Ok(tasks)
}

fn load_options(path: Option<&Path>) -> Result<GanttOptions> {
    let Some(path) = path else {
        return Ok(GanttOptions::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let options = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&text)
            .with_context(|| format!("Invalid options in {}", path.display()))?,
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("Invalid options in {}", path.display()))?,
        _ => bail!(
            "Unsupported options file {} (expected .toml or .json)",
            path.display()
        ),
    };
    Ok(options)
}

fn build_chart(args: &ChartArgs) -> Result<Gantt> {
    let mut options = load_options(args.config.as_deref())?;
    if let Some(mode) = &args.view_mode {
        options.view_mode = mode.parse::<ViewMode>()?;
    }
    if let Some(language) = &args.language {
        options.language = language.clone();
    }

    let tasks = load_tasks(&args.file)?;
    let gantt = Gantt::new("#svgantt", &tasks, options).context("Invalid chart configuration")?;
    debug!(
        tasks = gantt.tasks().len(),
        view_mode = %gantt.view().mode,
        "chart ready"
    );
    Ok(gantt)
}
