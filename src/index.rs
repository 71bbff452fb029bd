use std::collections::{HashMap, HashSet};

pub type Bigram = [char; 2];

#[derive(Debug, Default)]
pub struct BigramIndex {
    postings: HashMap<Bigram, Vec<usize>>,
    short_keys: Vec<usize>,
}

impl BigramIndex {
    pub fn build<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a [char]>,
    {
        let mut postings: HashMap<Bigram, Vec<usize>> = HashMap::new();
        let mut short_keys = Vec::new();
        let mut seen = HashSet::new();

        for (idx, key) in keys.into_iter().enumerate() {
            if key.len() < 2 {
                short_keys.push(idx);
                continue;
            }
            seen.clear();
            for pair in key.windows(2) {
                let bigram = [pair[0], pair[1]];
                if seen.insert(bigram) {
                    postings.entry(bigram).or_default().push(idx);
                }
            }
        }

        Self {
            postings,
            short_keys,
        }
    }

    pub fn bigram_count(&self) -> usize {
        self.postings.len()
    }

    pub fn short_keys(&self) -> &[usize] {
        &self.short_keys
    }

    pub fn candidates(&self, input: &[char]) -> Vec<usize> {
        if input.len() < 2 {
            return self.short_keys.clone();
        }

        let mut found = HashSet::new();
        for pair in input.windows(2) {
            if let Some(list) = self.postings.get(&[pair[0], pair[1]]) {
                found.extend(list.iter().copied());
            }
        }
        found.extend(self.short_keys.iter().copied());

        let mut candidates = found.into_iter().collect::<Vec<_>>();
        candidates.sort_unstable();
        candidates
    }
}
