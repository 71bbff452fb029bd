use std::collections::HashMap;
use std::sync::Arc;

use screen_phrase_matcher::fingerprint::{fingerprint, hamming_distance};
use screen_phrase_matcher::matcher::max_accepted_distance;
use screen_phrase_matcher::{EvictionCache, FuzzyMatcher, MatchConfig, Script};

use image::{DynamicImage, Rgb, RgbImage};

fn dictionary(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn noisy_line_matches_dictionary_entry() {
    let matcher = FuzzyMatcher::new(
        dictionary(&[("We can hear you!", "我们听得到！！")]),
        Script::Latin,
        MatchConfig::default(),
    );
    let found = matcher.find_closest_match("We ca heal you").expect("match");
    assert_eq!(found.key, "We can hear you!");
    assert_eq!(found.value, "我们听得到！！");
    assert!(found.distance < 10);
}

#[test]
fn speaker_header_and_body_are_split() {
    let matcher = FuzzyMatcher::new(
        dictionary(&[
            ("Choiseul", "舒瓦瑟尔"),
            (
                "Raimondo, nothing could go wrong here, right?",
                "雷蒙多，这不会出什么问题的，对吧？",
            ),
        ]),
        Script::Latin,
        MatchConfig::default(),
    );
    let result = matcher.find_match_with_header_separated(
        "Choiseul\nFontaine ResearchInstitute Administrative Officer\nRaimondo, nothing could go wrong here, right?",
    );
    assert_eq!(result.header, "舒瓦瑟尔");
    assert_eq!(result.key, "Raimondo, nothing could go wrong here, right?");
    assert_eq!(result.content, "雷蒙多，这不会出什么问题的，对吧？");
}

#[test]
fn least_recently_used_entry_is_evicted() {
    let mut cache = EvictionCache::new(2).expect("cache");
    cache.put("A", 1);
    cache.put("B", 2);
    assert_eq!(cache.get(&"A"), Some(&1));
    cache.put("C", 3);
    assert!(!cache.contains(&"B"));
    assert!(cache.contains(&"A"));
    assert!(cache.contains(&"C"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn black_frames_hash_equal_and_split_frame_differs() {
    let black = DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 40, Rgb([0, 0, 0])));
    let other_black = DynamicImage::ImageRgb8(RgbImage::from_pixel(90, 40, Rgb([0, 0, 0])));
    let split = DynamicImage::ImageRgb8(RgbImage::from_fn(90, 40, |x, _| {
        if x < 45 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
    }));

    let a = fingerprint(&black, 8);
    let b = fingerprint(&other_black, 8);
    let c = fingerprint(&split, 8);
    assert_eq!(hamming_distance(&a, &b), Ok(0));
    let distance = hamming_distance(&a, &c).expect("comparable");
    assert!(distance > 0 && distance <= 64);
}

#[test]
fn no_shared_fragment_returns_empty_result() {
    let matcher = FuzzyMatcher::new(
        dictionary(&[("Hello", "你好"), ("World", "世界")]),
        Script::Latin,
        MatchConfig::default(),
    );
    assert_eq!(matcher.find_closest_match("zzqqxx"), None);
    let result = matcher.find_match_with_header_separated("zzqqxx");
    assert!(result.is_empty());
    assert_eq!(result.key, "");
}

#[test]
fn distance_at_acceptance_boundary_is_rejected() {
    let config = MatchConfig::default();
    let matcher = FuzzyMatcher::new(
        dictionary(&[("abcdef", "value")]),
        Script::Latin,
        config.clone(),
    );
    let query = "abwxyz";
    let boundary = query.chars().count() as f64 / config.acceptance_divisor;
    assert_eq!(
        screen_phrase_matcher::distance::distance(query, "abcdef", usize::MAX) as f64,
        boundary
    );
    assert_eq!(max_accepted_distance(6, config.acceptance_divisor), Some(3));
    assert_eq!(matcher.find_closest_match(query), None);
}

#[test]
fn shared_matcher_serves_concurrent_queries() {
    let mut pairs = HashMap::new();
    for i in 0..300 {
        pairs.insert(
            format!("line {i} of the prologue dialogue"),
            format!("序章台词 {i}"),
        );
    }
    let matcher = Arc::new(FuzzyMatcher::new(pairs, Script::Latin, MatchConfig::default()));
    let handles = (0..4)
        .map(|worker| {
            let matcher = Arc::clone(&matcher);
            std::thread::spawn(move || {
                let i = worker * 70 + 5;
                let query = format!("line {i} of the prolog dialoque");
                matcher.find_closest_match(&query).map(|found| found.key)
            })
        })
        .collect::<Vec<_>>();
    for (worker, handle) in handles.into_iter().enumerate() {
        let key = handle.join().expect("worker");
        let i = worker * 70 + 5;
        assert_eq!(key, Some(format!("line {i} of the prologue dialogue")));
    }
}
