//! End-to-end run: catalog, discovery, provider load, classification and
//! execution, in that order.

use crate::actions::executor::{Executor, Mode, Outcome};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::indexing::catalog::build_catalog;
use crate::indexing::classifier::{Assignment, Classifier};
use crate::indexing::discovery::discover_files;
use crate::search::provider::EmbeddingProvider;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: Mode,
    /// Classify files across the rayon pool instead of one at a time
    pub parallel: bool,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub directories: usize,
    pub files: usize,
    pub planned: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub skipped_files: usize,
    pub failed_moves: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Planned => self.planned += 1,
            Outcome::AlreadyInPlace => self.unchanged += 1,
            Outcome::Moved { .. } => self.moved += 1,
        }
    }
}

/// Classify every eligible file under `root` and act on it according to
/// `options.mode`.
///
/// `load_provider` is only called once both the catalog and the file set are
/// known to be non-empty. Per-file failures are logged, counted and skipped;
/// anything fatal aborts the run. `on_record` sees each successful
/// assignment with its outcome as soon as it is executed.
pub fn run<P, F, R>(
    root: &Path,
    config: &Config,
    options: RunOptions,
    load_provider: F,
    mut on_record: R,
) -> Result<RunSummary>
where
    P: EmbeddingProvider,
    F: FnOnce() -> Result<P>,
    R: FnMut(&Assignment, &Outcome),
{
    let catalog = build_catalog(root, config)?;
    info!(directories = catalog.len(), "Built directory catalog");

    let files = discover_files(root, config)?;
    info!(files = files.len(), "Discovered eligible files");

    let provider = load_provider()?;
    let classifier = Classifier::new(&provider, &catalog, config)?;
    let executor = Executor::new(options.mode);

    let mut summary = RunSummary {
        directories: catalog.len(),
        files: files.len(),
        ..RunSummary::default()
    };

    let mut handle = |result: Result<Assignment>, summary: &mut RunSummary| -> Result<()> {
        let assignment = match result {
            Ok(assignment) => assignment,
            Err(e) if e.is_per_item() => {
                warn!("Skipped: {}", e);
                summary.skipped_files += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match executor.execute(&assignment) {
            Ok(outcome) => {
                summary.record(&outcome);
                on_record(&assignment, &outcome);
            }
            Err(e @ Error::MoveFailed { .. }) => {
                warn!("{}", e);
                summary.failed_moves += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    };

    if options.parallel {
        for result in classifier.classify_parallel(&files) {
            handle(result, &mut summary)?;
        }
    } else {
        for result in classifier.classify(&files) {
            handle(result, &mut summary)?;
        }
    }

    Ok(summary)
}
