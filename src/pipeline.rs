use std::sync::Arc;

use anyhow::Result;
use image::DynamicImage;
use tracing::{debug, warn};

use crate::cache::EvictionCache;
use crate::error;
use crate::fingerprint::{self, Fingerprint, FingerprintConfig};
use crate::matcher::{FuzzyMatcher, MatchResult};
use crate::ocr::OcrEngine;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutcome {
    pub result: MatchResult,
    pub text: String,
    pub ocr_invoked: bool,
    pub matcher_invoked: bool,
}

pub struct FramePipeline<E> {
    matcher: Arc<FuzzyMatcher>,
    engine: E,
    fingerprint: FingerprintConfig,
    frames: EvictionCache<Fingerprint, String>,
    texts: EvictionCache<String, MatchResult>,
}

impl<E: OcrEngine> FramePipeline<E> {
    pub fn new(matcher: Arc<FuzzyMatcher>, engine: E, settings: &Settings) -> error::Result<Self> {
        Ok(Self {
            matcher,
            engine,
            fingerprint: settings.fingerprint.clone(),
            frames: EvictionCache::new(settings.frame_cache_capacity)?,
            texts: EvictionCache::new(settings.text_cache_capacity)?,
        })
    }

    pub fn process(&mut self, image: &DynamicImage) -> Result<FrameOutcome> {
        let hash = self.fingerprint.compute(image);
        let (text, ocr_invoked) = match self.cached_text(&hash) {
            Some(text) => {
                debug!("pipeline: frame {} unchanged, skipping OCR", hash);
                (text, false)
            }
            None => {
                let output = self.engine.recognize(image)?;
                debug!(
                    "pipeline: OCR returned {} chars in {} boxes",
                    output.text.chars().count(),
                    output.boxes.len()
                );
                self.frames.put(hash, output.text.clone());
                (output.text, true)
            }
        };

        let (result, matcher_invoked) = self.match_text(&text);
        Ok(FrameOutcome {
            result,
            text,
            ocr_invoked,
            matcher_invoked,
        })
    }

    pub fn match_text(&mut self, text: &str) -> (MatchResult, bool) {
        if text.trim().is_empty() {
            return (MatchResult::default(), false);
        }
        let key = text.to_string();
        if let Some(hit) = self.texts.get(&key) {
            debug!("pipeline: text cache hit");
            return (hit.clone(), false);
        }
        let result = self.matcher.find_match_with_header_separated(text);
        self.texts.put(key, result.clone());
        (result, true)
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.texts.clear();
    }

    pub fn frame_cache_len(&self) -> usize {
        self.frames.len()
    }

    pub fn text_cache_len(&self) -> usize {
        self.texts.len()
    }

    fn cached_text(&mut self, hash: &Fingerprint) -> Option<String> {
        if let Some(text) = self.frames.get(hash) {
            return Some(text.clone());
        }
        let max_distance = self.fingerprint.max_distance;
        let nearest = match fingerprint::find_nearest(hash, &self.frames, max_distance) {
            Ok(nearest) => nearest,
            Err(err) => {
                warn!("pipeline: {}; treating frame as new", err);
                None
            }
        }?;
        self.frames.get(&nearest).cloned()
    }
}
