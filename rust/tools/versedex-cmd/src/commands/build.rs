//! Build command implementation

use std::sync::Arc;

use anyhow::{Context, Result};
use versedex_text_index::{BackendRegistry, BuildOutcome, Corpus, LogProgress, spawn_build};

use super::{IndexArgs, load_corpus};
use crate::utils::format_size;

pub fn run(args: &IndexArgs) -> Result<()> {
    let config = args.config()?;
    let corpus = load_corpus(&config)?
        .context("--corpus (or corpus_root in the configuration) is required to build")?;
    let corpus: Arc<dyn Corpus> = Arc::new(corpus);

    let backend = BackendRegistry::with_defaults().for_config(&config)?;
    let builder = backend.create_builder(&config, corpus)?;

    let job = spawn_build(builder, Arc::new(LogProgress))?;
    let outcome = job
        .join()
        .with_context(|| format!("Failed to build index {}", config.index_root.display()))?;

    match outcome {
        BuildOutcome::Completed(stats) => {
            println!(
                "Indexed {} units into {}: {} words, {} of data in {:.2?}",
                stats.unit_count,
                config.index_root.display(),
                stats.word_count,
                format_size(stats.data_len),
                stats.elapsed
            );
            Ok(())
        }
        BuildOutcome::Cancelled => anyhow::bail!("Build was cancelled"),
    }
}
