use anyhow::{Context, Result, bail};
use appendix_async_runtime::{BatchCommand, BatchUpdate, RunLogger, worker_task};
use appendix_batch::{BatchOptions, ExecutionHost, InputFile, parse_name};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "apxb", about = "Assemble appendix scans into page-capped PDF batches", version)]
struct Cli {
    /// Log debug detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render batches, write them with a manifest
    Run {
        /// Input files (PDF, PNG or JPEG) - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Page budget per batch
        #[arg(long)]
        target_pages: Option<usize>,

        /// Text appended to every page header
        #[arg(long)]
        header: Option<String>,

        /// Also write appendix_batches.zip
        #[arg(long)]
        zip: bool,

        /// JSON options file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show groups and planned batches without rendering
    Plan {
        /// Input files - can specify multiple
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Page budget per batch
        #[arg(long, default_value = "50")]
        target_pages: usize,
    },

    /// Print the ordering key parsed from each filename
    Keys {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    RunLogger::default()
        .with_level(level)
        .with_echo(true)
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Run {
            input,
            output,
            target_pages,
            header,
            zip,
            config,
        } => {
            let mut options = match config {
                Some(path) => BatchOptions::load(&path)
                    .await
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => BatchOptions::default(),
            };
            if let Some(target_pages) = target_pages {
                options.target_pages = target_pages;
            }
            if let Some(header) = header {
                options.header_text = header;
            }
            options.validate()?;

            run(input, output, options, zip).await?;
        }

        Commands::Plan {
            input,
            target_pages,
        } => {
            plan(input, target_pages).await?;
        }

        Commands::Keys { names } => {
            for name in names {
                match parse_name(&name) {
                    Some(key) => println!(
                        "{name}: appendix {} (order {}), part {}{}",
                        key.appendix_label,
                        key.appendix_order,
                        key.part_index
                            .map_or_else(|| "-".to_string(), |p| p.to_string()),
                        key.part_total
                            .map_or_else(String::new, |t| format!(" of {t}")),
                    ),
                    None => println!("{name}: not an appendix name"),
                }
            }
        }
    }

    Ok(())
}

/// Drive one run through the background worker
async fn run(input: Vec<PathBuf>, output: PathBuf, options: BatchOptions, zip: bool) -> Result<()> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx, ExecutionHost::Background));

    command_tx.send(BatchCommand::Enqueue { paths: input })?;
    command_tx.send(BatchCommand::Run { options })?;
    command_tx.send(BatchCommand::Save {
        dir: output.clone(),
    })?;
    if zip {
        command_tx.send(BatchCommand::Bundle {
            output_path: output.join(appendix_batch::constants::BUNDLE_FILE_NAME),
        })?;
    }
    drop(command_tx);

    let mut errors = Vec::new();
    while let Some(update) = update_rx.recv().await {
        match update {
            BatchUpdate::RunComplete {
                batches,
                pages,
                issues,
            } => {
                println!("Rendered {pages} pages into {batches} batch(es)");
                if !issues.is_empty() {
                    println!("{} file(s) had problems:", issues.len());
                    for issue in issues {
                        println!("  {issue}");
                    }
                }
            }
            BatchUpdate::Saved { paths } => {
                println!("Wrote {} file(s) → {}", paths.len(), output.display());
            }
            BatchUpdate::Bundled { path } => println!("Bundled → {}", path.display()),
            BatchUpdate::Error { message } => errors.push(message),
            _ => {}
        }
    }
    worker.await?;

    if let Some(first) = errors.into_iter().next() {
        bail!(first);
    }
    Ok(())
}

/// Print the batch plan without rendering anything
async fn plan(input: Vec<PathBuf>, target_pages: usize) -> Result<()> {
    let files: Vec<InputFile> = input.iter().map(InputFile::from_path).collect();
    let (groups, _) = appendix_batch::sort_into_groups(&files);
    log::info!("Found {} appendices", groups.len());

    for group in &groups {
        let names: Vec<&str> = group.items.iter().map(|item| item.name()).collect();
        println!("Appendix {}: {}", group.label, names.join(", "));
    }

    let (prepared, _) = appendix_batch::assemble::prepare_groups(groups).await;
    let plan = appendix_batch::plan_batches(prepared, target_pages)?;

    println!("Planned pages: {}", plan.total_pages);
    for batch in &plan.batches {
        println!(
            "  {} from Appendix {} (~{} pages, {} file(s))",
            appendix_batch::constants::batch_file_name(batch.number),
            batch.start_label,
            batch.pages,
            batch.jobs.len()
        );
    }
    Ok(())
}
