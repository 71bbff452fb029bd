use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::text::collapse_whitespace;

pub fn load_dictionary(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read dictionary: {}", path.display()))?;
    let dictionary: HashMap<String, String> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse dictionary: {}", path.display()))?;
    info!("dictionary: {} entries from {}", dictionary.len(), path.display());
    Ok(dictionary)
}

pub fn load_pair_tables(source_path: &Path, target_path: &Path) -> Result<HashMap<String, String>> {
    let source = read_table(source_path)?;
    let target = read_table(target_path)?;
    let pairs = build_pairs(&source, &target);
    info!(
        "dictionary: {} pairs from {} source / {} target rows",
        pairs.len(),
        source.len(),
        target.len()
    );
    Ok(pairs)
}

/// On duplicate source text the lowest id wins. Numeric ids compare by value
/// and sort before non-numeric ids, which compare as strings.
pub fn build_pairs(
    source: &HashMap<String, String>,
    target: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut ordered = source.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| compare_ids(a.0, b.0));
    let mut pairs = HashMap::with_capacity(ordered.len());
    for (id, source_text) in ordered {
        let Some(target_text) = target.get(id) else {
            continue;
        };
        let key = strip_placeholders(source_text);
        let value = strip_placeholders(target_text);
        if key.is_empty() || value.is_empty() {
            debug!("dictionary: skipping empty row {}", id);
            continue;
        }
        pairs.entry(key).or_insert(value);
    }
    pairs
}

pub fn strip_placeholders(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let mut output = String::with_capacity(text.len());
    let mut idx = 0;
    while idx < chars.len() {
        let ch = chars[idx];
        let close = match ch {
            '{' => Some('}'),
            '<' => Some('>'),
            _ => None,
        };
        if let Some(close) = close
            && let Some(offset) = chars[idx + 1..].iter().position(|c| *c == close)
        {
            idx += offset + 2;
            output.push(' ');
            continue;
        }
        output.push(ch);
        idx += 1;
    }
    collapse_whitespace(&output)
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn read_table(path: &Path) -> Result<HashMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read phrase table: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse phrase table: {}", path.display()))
}
