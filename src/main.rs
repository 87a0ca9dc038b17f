//! Task graph workflow engine CLI.
//!
//! Offline inspection of project snapshot files produced by embedders of
//! the engine library: validate invariants, render a board, or pick the
//! next actionable task.

use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::fs::OpenOptions;
use task_graph_engine::cli::{Cli, Command, NextArgs, ShowArgs, ValidateArgs};
use task_graph_engine::config::EngineConfig;
use task_graph_engine::error::error_body;
use task_graph_engine::format::{
    OutputFormat, format_board_markdown, format_order_listing, format_task_markdown,
};
use task_graph_engine::store::{ProjectSnapshot, TaskStore};
use task_graph_engine::types::{Status, Task};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new().create(true).append(true).open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    let config = EngineConfig::load_or_default(cli.config.as_deref())?;

    let result = match cli.command {
        Command::Validate(args) => run_validate(&config, args),
        Command::Show(args) => run_show(&config, args),
        Command::Next(args) => run_next(&config, args),
    };

    if let Err(err) = result {
        let body = error_body(&err);
        eprintln!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(1);
    }
    Ok(())
}

fn run_validate(config: &EngineConfig, args: ValidateArgs) -> Result<()> {
    let snapshot = ProjectSnapshot::from_file(&args.file)?;
    let store = TaskStore::new(config.complexity.clone());
    let project = store.import_project(snapshot)?;
    let order = store.topological_order(&project)?;
    let tasks = order
        .iter()
        .map(|id| store.get_task(&project, id))
        .collect::<Result<Vec<_>, _>>()?;
    println!("OK: {} ({} tasks, dependency order valid)", project, order.len());
    print!("{}", format_order_listing(&tasks));
    Ok(())
}

fn run_show(config: &EngineConfig, args: ShowArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown format: {}", args.format))?;
    let path = args.resolve_file(&config.data_dir);
    let snapshot = ProjectSnapshot::from_file(&path)?;

    match format {
        OutputFormat::Json => println!("{}", snapshot.to_json_pretty()?),
        OutputFormat::Markdown => {
            let rows = board_rows(&snapshot);
            print!("{}", format_board_markdown(&snapshot.project, &rows));
        }
    }
    Ok(())
}

fn run_next(config: &EngineConfig, args: NextArgs) -> Result<()> {
    let path = args.resolve_file(&config.data_dir);
    let snapshot = ProjectSnapshot::from_file(&path)?;
    let store = TaskStore::new(config.complexity.clone());
    let project = store.import_project(snapshot)?;

    match store.next_task(&project)? {
        Some(task) => print!("{}", format_task_markdown(&task, &[])),
        None => println!("No actionable task."),
    }
    Ok(())
}

/// Blocked-by lists derived from the snapshot's own records.
fn board_rows(snapshot: &ProjectSnapshot) -> Vec<(&Task, Vec<String>)> {
    let by_id: HashMap<&str, &Task> = snapshot
        .tasks
        .iter()
        .map(|task| (task.id.as_str(), task))
        .collect();
    snapshot
        .tasks
        .iter()
        .map(|task| {
            let blocked_by: Vec<String> = task
                .depends_on
                .iter()
                .filter(|dep| {
                    by_id
                        .get(dep.as_str())
                        .is_none_or(|found| found.status != Status::Done)
                })
                .cloned()
                .collect();
            (task, blocked_by)
        })
        .collect()
}
