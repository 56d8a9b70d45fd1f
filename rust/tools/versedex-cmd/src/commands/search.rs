//! Find, prefix, query and best-match commands

use anyhow::{Context, Result};
use versedex_ranges::ReferenceSet;
use versedex_text_index::{Corpus, MemoryCorpus};

use super::{IndexArgs, Session};
use crate::utils::parse_ordinals;

pub fn find(args: &IndexArgs, word: &str, show: bool) -> Result<()> {
    let session = args.open()?;
    let found = session.engine.searcher().find(word)?;
    print_units(&session, &found, show)
}

pub fn prefix(args: &IndexArgs, prefix: &str, limit: Option<usize>) -> Result<()> {
    let session = args.open()?;
    let words = session.engine.searcher().prefix_search(prefix);
    for word in words.take(limit.unwrap_or(usize::MAX)) {
        println!("{word}");
    }
    Ok(())
}

pub fn query(args: &IndexArgs, text: &str, within: Option<&str>, show: bool) -> Result<()> {
    let session = args.open()?;
    session.check_blur(text)?;
    let within = within.map(parse_ordinals).transpose()?;
    let found = session
        .engine
        .search(text, within.as_ref())
        .with_context(|| format!("Query failed: {text}"))?;
    print_units(&session, &found, show)
}

pub fn best_match(args: &IndexArgs, text: &str, limit: usize, within: Option<&str>) -> Result<()> {
    let session = args.open()?;
    let within = within.map(parse_ordinals).transpose()?;
    let tally = session.engine.best_match(text, within.as_ref())?;
    for (unit, hits) in tally.ranked(limit) {
        match session.corpus.as_ref() {
            Some(corpus) => println!(
                "{hits:>3}  {}: {}",
                reference(&session, unit),
                unit_text(corpus, unit)
            ),
            None => println!("{hits:>3}  {unit}"),
        }
    }
    Ok(())
}

fn print_units(session: &Session, units: &ReferenceSet, show: bool) -> Result<()> {
    println!("{} units: {units}", units.len());
    if show {
        let corpus = session.require_corpus()?;
        for unit in units {
            println!("{}: {}", reference(session, unit), unit_text(corpus, unit));
        }
    }
    Ok(())
}

fn reference(session: &Session, unit: u32) -> String {
    session
        .corpus
        .as_ref()
        .and_then(|corpus| corpus.reference_of(unit))
        .unwrap_or_else(|| unit.to_string())
}

fn unit_text(corpus: &MemoryCorpus, unit: u32) -> String {
    corpus.text_of(unit).unwrap_or_default()
}
