use anyhow::Context;
use clap::Parser;
use folder2vec::core::config::Config;
use folder2vec::pipeline::{run, RunOptions, RunSummary};
use folder2vec::ui::cli::{Cli, Commands, RunArgs};
use folder2vec::{Assignment, EmbeddingModel, Mode, Outcome};
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };

    match &cli.command {
        Commands::Preview(args) => handle_run(&config_path, args, Mode::Preview),
        Commands::Apply(args) => handle_run(&config_path, args, Mode::Apply),
        Commands::FetchModel { model_id } => handle_fetch(&config_path, model_id.as_deref()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("folder2vec=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn handle_run(config_path: &Path, args: &RunArgs, mode: Mode) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let options = RunOptions {
        mode,
        parallel: args.parallel,
    };

    let mut printer = RecordPrinter::new(std::io::stdout());
    let result = run(
        &args.root_path,
        &config,
        options,
        || EmbeddingModel::load(&config),
        |assignment, outcome| {
            if let Err(e) = printer.print(assignment, outcome) {
                tracing::warn!("Failed to write output: {}", e);
            }
        },
    );

    match result {
        Ok(summary) => {
            print_summary(&summary, mode);
            Ok(())
        }
        Err(e) if e.is_clean_exit() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e).context("Run aborted"),
    }
}

/// Writes one line per assignment. The preview header goes out with the first
/// planned move, so a run that exits early prints no header.
struct RecordPrinter<W: Write> {
    out: W,
    header_printed: bool,
}

impl<W: Write> RecordPrinter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            header_printed: false,
        }
    }

    fn print(&mut self, assignment: &Assignment, outcome: &Outcome) -> std::io::Result<()> {
        match outcome {
            Outcome::Planned => {
                if !self.header_printed {
                    writeln!(self.out, "Preview of file -> predicted folder:")?;
                    self.header_printed = true;
                }
                writeln!(
                    self.out,
                    "{} -> {}",
                    assignment.file_path.display(),
                    assignment.target_directory.display()
                )
            }
            Outcome::Moved { destination } => writeln!(
                self.out,
                "Moved: {} -> {}",
                assignment.file_path.display(),
                destination.display()
            ),
            Outcome::AlreadyInPlace => Ok(()),
        }
    }
}

fn print_summary(summary: &RunSummary, mode: Mode) {
    println!();
    match mode {
        Mode::Preview => println!("Preview complete!"),
        Mode::Apply => println!("✓ File moves complete!"),
    }
    println!("  Directories: {}", summary.directories);
    println!("  Files: {}", summary.files);
    if mode == Mode::Preview {
        println!("  Planned: {}", summary.planned);
    } else {
        println!("  Moved: {}", summary.moved);
        println!("  Already in place: {}", summary.unchanged);
    }
    if summary.skipped_files > 0 {
        println!("  Skipped (unreadable): {}", summary.skipped_files);
    }
    if summary.failed_moves > 0 {
        println!("  Failed moves: {}", summary.failed_moves);
    }
}

fn handle_fetch(config_path: &Path, model_id: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let model_id = model_id.unwrap_or(&config.model_id);

    println!("Downloading embedding model {} ...", model_id);
    EmbeddingModel::fetch(model_id, &config.model_dir)
        .with_context(|| format!("Failed to download {}", model_id))?;
    println!("✓ Model saved to {}", config.model_dir.display());

    Ok(())
}
