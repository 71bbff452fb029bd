use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::distance;
use crate::index::BigramIndex;
use crate::text::{self, Script};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub acceptance_divisor: f64,
    pub parallel_threshold: usize,
    pub containment_min_query_len: usize,
    pub containment_min_key_len: usize,
    pub reverse_containment_min_key_len: usize,
    pub short_query_len: usize,
    pub long_key_ratio: usize,
    pub truncate_min_query_len: usize,
    pub truncate_key_ratio: usize,
    pub speaker_max_words: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            acceptance_divisor: 1.5,
            parallel_threshold: 200,
            containment_min_query_len: 10,
            containment_min_key_len: 1,
            reverse_containment_min_key_len: 20,
            short_query_len: 10,
            long_key_ratio: 3,
            truncate_min_query_len: 10,
            truncate_key_ratio: 2,
            speaker_max_words: 4,
        }
    }
}

#[derive(Debug, Clone)]
struct DictionaryEntry {
    key: String,
    value: String,
    length: usize,
    normalized: String,
    chars: Box<[char]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseMatch {
    pub key: String,
    pub value: String,
    pub distance: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub header: String,
    pub content: String,
    pub key: String,
}

impl MatchResult {
    fn new(header: String, body: Option<PhraseMatch>) -> Self {
        match body {
            Some(found) => Self {
                header,
                content: found.value,
                key: found.key,
            },
            None => Self {
                header,
                ..Self::default()
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.content.is_empty()
    }
}

#[derive(Debug)]
pub struct FuzzyMatcher {
    entries: Vec<DictionaryEntry>,
    index: BigramIndex,
    exact: HashMap<String, usize>,
    script: Script,
    config: MatchConfig,
}

impl FuzzyMatcher {
    pub fn new<I>(dictionary: I, script: Script, config: MatchConfig) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut pairs = dictionary.into_iter().collect::<Vec<_>>();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.dedup_by(|a, b| a.0 == b.0);

        let mut entries = Vec::with_capacity(pairs.len());
        let mut exact = HashMap::with_capacity(pairs.len());
        let mut skipped = 0usize;
        for (key, value) in pairs {
            let normalized = text::normalize(&key, script);
            if normalized.is_empty() {
                skipped += 1;
                continue;
            }
            let chars = normalized.chars().collect::<Box<[char]>>();
            exact.entry(normalized.clone()).or_insert(entries.len());
            entries.push(DictionaryEntry {
                key,
                value,
                length: chars.len(),
                normalized,
                chars,
            });
        }

        let index = BigramIndex::build(entries.iter().map(|entry| &*entry.chars));
        info!(
            "matcher: {} entries, {} bigrams, {} short keys ({} blank keys skipped)",
            entries.len(),
            index.bigram_count(),
            index.short_keys().len(),
            skipped
        );

        Self {
            entries,
            index,
            exact,
            script,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    pub fn lookup_exact(&self, input: &str) -> Option<&str> {
        let normalized = text::normalize(input, self.script);
        self.exact
            .get(&normalized)
            .map(|&idx| self.entries[idx].value.as_str())
    }

    pub fn find_closest_match(&self, input: &str) -> Option<PhraseMatch> {
        let normalized = text::normalize(input, self.script);
        if normalized.is_empty() {
            return None;
        }
        if let Some(&idx) = self.exact.get(&normalized) {
            return Some(self.phrase_match(idx, 0));
        }

        let chars = normalized.chars().collect::<Vec<_>>();
        let limit = max_accepted_distance(chars.len(), self.config.acceptance_divisor)?;
        let candidates = self.index.candidates(&chars);
        if candidates.is_empty() {
            debug!("matcher: no candidates for {:?}", normalized);
            return None;
        }

        let query = Query {
            text: &normalized,
            chars: &chars,
        };
        let best = if candidates.len() > self.config.parallel_threshold {
            self.search_parallel(&query, &candidates, limit)
        } else {
            self.search_sequential(&query, &candidates, limit)
        };

        let (distance, idx) = best?;
        if distance as f64 >= chars.len() as f64 / self.config.acceptance_divisor {
            return None;
        }
        debug!(
            "matcher: {:?} -> {:?} (distance {}, {} candidates)",
            normalized,
            self.entries[idx].key,
            distance,
            candidates.len()
        );
        Some(self.phrase_match(idx, distance))
    }

    pub fn find_match_with_header_separated(&self, text: &str) -> MatchResult {
        let lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        match lines.as_slice() {
            [] => return MatchResult::default(),
            [single] => return MatchResult::new(String::new(), self.find_closest_match(single)),
            _ => {}
        }

        let body_start = self.body_start(&lines);
        let header = lines[..body_start]
            .iter()
            .filter_map(|line| self.lookup_exact(line))
            .collect::<Vec<_>>()
            .join(" ");
        let body = lines[body_start..].join(" ");
        MatchResult::new(header, self.find_closest_match(&body))
    }

    fn body_start(&self, lines: &[&str]) -> usize {
        let mut longest = 0;
        let mut longest_len = 0;
        for (idx, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            if len > longest_len {
                longest = idx;
                longest_len = len;
            }
        }
        if longest + 1 < lines.len() && self.looks_like_speaker(lines[longest]) {
            longest + 1
        } else {
            longest
        }
    }

    fn looks_like_speaker(&self, line: &str) -> bool {
        text::is_latin_text(line)
            && text::is_title_case(line)
            && line.split_whitespace().count() <= self.config.speaker_max_words
    }

    fn search_sequential(
        &self,
        query: &Query<'_>,
        candidates: &[usize],
        limit: usize,
    ) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for &idx in candidates {
            let bound = match best {
                Some((distance, _)) => distance - 1,
                None => limit,
            };
            if let Some(distance) = self.score(query, &self.entries[idx], bound) {
                best = Some((distance, idx));
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    fn search_parallel(
        &self,
        query: &Query<'_>,
        candidates: &[usize],
        limit: usize,
    ) -> Option<(usize, usize)> {
        let best: Mutex<Option<(usize, usize)>> = Mutex::new(None);
        let bound = AtomicUsize::new(limit);
        let stop = AtomicBool::new(false);

        candidates.par_iter().for_each(|&idx| {
            if stop.load(Ordering::Relaxed) {
                return;
            }
            let current = bound.load(Ordering::Relaxed);
            let Some(distance) = self.score(query, &self.entries[idx], current) else {
                return;
            };
            let mut guard = best.lock().unwrap_or_else(PoisonError::into_inner);
            let better = (*guard).is_none_or(|held| (distance, idx) < held);
            if better {
                *guard = Some((distance, idx));
                bound.fetch_min(distance, Ordering::Relaxed);
            }
            drop(guard);
            if distance == 0 {
                stop.store(true, Ordering::Relaxed);
            }
        });

        best.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn score(&self, query: &Query<'_>, entry: &DictionaryEntry, bound: usize) -> Option<usize> {
        let config = &self.config;
        let input_len = query.chars.len();
        let key_len = entry.length;

        if input_len < config.short_query_len
            && key_len >= config.long_key_ratio.saturating_mul(input_len)
        {
            return None;
        }

        if input_len > config.containment_min_query_len
            && ((key_len >= config.containment_min_key_len
                && query.text.contains(entry.normalized.as_str()))
                || (key_len > config.reverse_containment_min_key_len
                    && entry.normalized.contains(query.text)))
        {
            return Some(0);
        }

        let mut key: &[char] = &entry.chars;
        if input_len > config.truncate_min_query_len
            && key_len > config.truncate_key_ratio.saturating_mul(input_len)
        {
            key = &key[..input_len];
        }

        if key.len().abs_diff(input_len) > bound {
            return None;
        }
        let distance = distance::bounded(query.chars, key, bound);
        (distance <= bound).then_some(distance)
    }

    fn phrase_match(&self, idx: usize, distance: usize) -> PhraseMatch {
        let entry = &self.entries[idx];
        PhraseMatch {
            key: entry.key.clone(),
            value: entry.value.clone(),
            distance,
        }
    }
}

struct Query<'a> {
    text: &'a str,
    chars: &'a [char],
}

pub fn max_accepted_distance(input_len: usize, divisor: f64) -> Option<usize> {
    if input_len == 0 || divisor.is_nan() || divisor <= 0.0 {
        return None;
    }
    let max = (input_len as f64 / divisor).ceil() - 1.0;
    (max >= 0.0).then_some(max as usize)
}
