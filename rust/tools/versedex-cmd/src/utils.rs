//! Common utilities for versedex-cmd

use anyhow::{Context, Result};
use versedex_ranges::ReferenceSet;

/// Parses a list of ordinals and inclusive ranges such as `"1-31, 50"`, the
/// format a [`ReferenceSet`] displays as.
pub fn parse_ordinals(text: &str) -> Result<ReferenceSet> {
    let mut set = ReferenceSet::new();
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let parse = |s: &str| -> Result<u32> {
            let ordinal: u32 = s
                .trim()
                .parse()
                .with_context(|| format!("Invalid ordinal '{s}' in '{text}'"))?;
            if ordinal == 0 || ordinal > versedex_ranges::MAX_ORDINAL {
                anyhow::bail!("Ordinal {ordinal} is out of range in '{text}'");
            }
            Ok(ordinal)
        };
        match part.split_once('-') {
            Some((first, last)) => {
                let (first, last) = (parse(first)?, parse(last)?);
                if first > last {
                    anyhow::bail!("Empty range '{part}' in '{text}'");
                }
                set.add_range(first..last + 1);
            }
            None => set.add(parse(part)?),
        }
    }
    Ok(set)
}

/// Formats file size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
