//! Inspect command implementation

use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;
use versedex_text_index::{Corpus, IndexConfig, store::IndexStore};

use super::{IndexArgs, load_corpus};
use crate::utils::format_size;

#[derive(Serialize)]
struct InspectSummary {
    config: IndexConfig,
    word_count: usize,
    index_bytes: u64,
    data_bytes: u64,
    data_size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    largest_word: Option<WordInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    corpus: Option<CorpusInfo>,
}

#[derive(Serialize)]
struct WordInfo {
    word: String,
    encoded_bytes: u32,
}

#[derive(Serialize)]
struct CorpusInfo {
    unit_count: u32,
}

pub fn run(args: &IndexArgs) -> Result<()> {
    let summary = summarize(args)?;
    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    println!("{json}");
    Ok(())
}

fn summarize(args: &IndexArgs) -> Result<InspectSummary> {
    let config = args.config()?;
    let corpus = load_corpus(&config)?;
    let store = IndexStore::new(&config.index_root);
    let index = store
        .load()
        .with_context(|| format!("Failed to load index {}", store.root().display()))?;
    let index_bytes = fs::metadata(store.index_path())
        .with_context(|| format!("Failed to stat {}", store.index_path().display()))?
        .len();

    let largest_word = index
        .entries()
        .max_by_key(|(_, section)| section.length)
        .map(|(word, section)| WordInfo {
            word: word.to_string(),
            encoded_bytes: section.length,
        });

    Ok(InspectSummary {
        word_count: index.word_count(),
        index_bytes,
        data_bytes: index.data_len(),
        data_size: format_size(index.data_len()),
        largest_word,
        corpus: corpus.map(|corpus| CorpusInfo {
            unit_count: corpus.unit_count(),
        }),
        config,
    })
}
