use anyhow::{Context, Result, anyhow};
use std::path::Path;

pub mod cache;
pub mod dictionary;
pub mod distance;
pub mod error;
pub mod fingerprint;
pub mod index;
pub mod logging;
pub mod matcher;
pub mod ocr;
pub mod pipeline;
pub mod settings;
pub mod text;

#[cfg(test)]
mod test_util;

pub use cache::{EvictionCache, KeyStore};
pub use error::Error;
pub use fingerprint::{Fingerprint, FingerprintConfig};
pub use matcher::{FuzzyMatcher, MatchConfig, MatchResult, PhraseMatch};
pub use ocr::{BBoxPx, OcrEngine, OcrOutput};
pub use pipeline::{FrameOutcome, FramePipeline};
pub use text::Script;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub lang: Option<String>,
    pub dictionary_path: Option<String>,
    pub source_table_path: Option<String>,
    pub target_table_path: Option<String>,
    pub settings_path: Option<String>,
    pub fingerprint_path: Option<String>,
}

pub fn run(config: Config, input: Option<String>) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    if let Some(lang) = config.lang.as_deref() {
        settings.language = lang.to_string();
    }

    if let Some(path) = config.fingerprint_path.as_deref() {
        let image = image::open(path)
            .with_context(|| format!("failed to decode image: {}", path))?;
        return Ok(settings.fingerprint.compute(&image).to_string());
    }

    let dictionary = load_dictionary(&config)?;
    let input = input.unwrap_or_default();
    if input.trim().is_empty() {
        return Err(anyhow!("stdin is empty"));
    }

    let matcher = FuzzyMatcher::new(dictionary, settings.script(), settings.matcher.clone());
    let result = matcher.find_match_with_header_separated(&input);
    Ok(format_match_output(&result))
}

pub fn format_match_output(result: &MatchResult) -> String {
    if result.is_empty() {
        return "no match".to_string();
    }
    let mut lines = Vec::new();
    if !result.header.is_empty() {
        lines.push(format!("header: {}", result.header));
    }
    if !result.content.is_empty() {
        lines.push(format!("content: {}", result.content));
        lines.push(format!("key: {}", result.key));
    }
    lines.join("\n")
}

fn load_dictionary(config: &Config) -> Result<std::collections::HashMap<String, String>> {
    match (
        config.dictionary_path.as_deref(),
        config.source_table_path.as_deref(),
        config.target_table_path.as_deref(),
    ) {
        (Some(path), None, None) => dictionary::load_dictionary(Path::new(path)),
        (None, Some(source), Some(target)) => {
            dictionary::load_pair_tables(Path::new(source), Path::new(target))
        }
        (None, None, None) => Err(anyhow!(
            "no dictionary given (use --dictionary or --source-table with --target-table)"
        )),
        _ => Err(anyhow!(
            "--dictionary cannot be combined with phrase tables, and --source-table requires --target-table"
        )),
    }
}
