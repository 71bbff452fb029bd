use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fingerprint::{FingerprintConfig, MAX_HASH_SIZE};
use crate::matcher::MatchConfig;
use crate::text::Script;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub language: String,
    pub script: Option<Script>,
    pub matcher: MatchConfig,
    pub fingerprint: FingerprintConfig,
    pub frame_cache_capacity: usize,
    pub text_cache_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            script: None,
            matcher: MatchConfig::default(),
            fingerprint: FingerprintConfig::default(),
            frame_cache_capacity: 20,
            text_cache_capacity: 20,
        }
    }
}

impl Settings {
    pub fn script(&self) -> Script {
        self.script.unwrap_or_else(|| Script::from_lang_code(&self.language))
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    system: Option<SystemSettings>,
    matcher: Option<MatcherSettings>,
    cache: Option<CacheSettings>,
    fingerprint: Option<FingerprintSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    language: Option<String>,
    script: Option<Script>,
}

#[derive(Debug, Default, Deserialize)]
struct MatcherSettings {
    acceptance_divisor: Option<f64>,
    parallel_threshold: Option<usize>,
    containment_min_query_len: Option<usize>,
    containment_min_key_len: Option<usize>,
    reverse_containment_min_key_len: Option<usize>,
    short_query_len: Option<usize>,
    long_key_ratio: Option<usize>,
    truncate_min_query_len: Option<usize>,
    truncate_key_ratio: Option<usize>,
    speaker_max_words: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CacheSettings {
    frame_capacity: Option<usize>,
    text_capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FingerprintSettings {
    hash_size: Option<u32>,
    max_distance: Option<u32>,
    crop: Option<bool>,
    foreground_threshold: Option<u8>,
    crop_padding: Option<u32>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings
                .merge_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
        }
    }

    Ok(settings)
}

impl Settings {
    pub fn merge_str(&mut self, content: &str) -> Result<()> {
        let parsed: SettingsFile = toml::from_str(content)?;
        self.merge(parsed);
        Ok(())
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(system) = incoming.system {
            if let Some(language) = system.language {
                if !language.trim().is_empty() {
                    self.language = language.trim().to_string();
                }
            }
            if let Some(script) = system.script {
                self.script = Some(script);
            }
        }
        if let Some(matcher) = incoming.matcher {
            let config = &mut self.matcher;
            if let Some(divisor) = matcher.acceptance_divisor {
                if divisor > 0.0 && divisor.is_finite() {
                    config.acceptance_divisor = divisor;
                }
            }
            if let Some(value) = matcher.parallel_threshold {
                config.parallel_threshold = value;
            }
            if let Some(value) = matcher.containment_min_query_len {
                config.containment_min_query_len = value;
            }
            if let Some(value) = matcher.containment_min_key_len {
                config.containment_min_key_len = value;
            }
            if let Some(value) = matcher.reverse_containment_min_key_len {
                config.reverse_containment_min_key_len = value;
            }
            if let Some(value) = matcher.short_query_len {
                config.short_query_len = value;
            }
            if let Some(value) = matcher.long_key_ratio {
                if value > 0 {
                    config.long_key_ratio = value;
                }
            }
            if let Some(value) = matcher.truncate_min_query_len {
                config.truncate_min_query_len = value;
            }
            if let Some(value) = matcher.truncate_key_ratio {
                if value > 0 {
                    config.truncate_key_ratio = value;
                }
            }
            if let Some(value) = matcher.speaker_max_words {
                config.speaker_max_words = value;
            }
        }
        if let Some(cache) = incoming.cache {
            if let Some(capacity) = cache.frame_capacity {
                if capacity > 0 {
                    self.frame_cache_capacity = capacity;
                }
            }
            if let Some(capacity) = cache.text_capacity {
                if capacity > 0 {
                    self.text_cache_capacity = capacity;
                }
            }
        }
        if let Some(fingerprint) = incoming.fingerprint {
            let config = &mut self.fingerprint;
            if let Some(size) = fingerprint.hash_size {
                if (1..=MAX_HASH_SIZE).contains(&size) {
                    config.hash_size = size;
                }
            }
            if let Some(distance) = fingerprint.max_distance {
                config.max_distance = distance;
            }
            if let Some(crop) = fingerprint.crop {
                config.crop = crop;
            }
            if let Some(threshold) = fingerprint.foreground_threshold {
                config.foreground_threshold = threshold;
            }
            if let Some(padding) = fingerprint.crop_padding {
                config.crop_padding = padding;
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".screen-phrase-matcher"))
        }
    })
}
