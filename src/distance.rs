/// Exact edit distance when it is `<= threshold`, otherwise `threshold + 1`.
pub fn distance(a: &str, b: &str, threshold: usize) -> usize {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    bounded(&a, &b, threshold)
}

pub fn bounded(a: &[char], b: &[char], threshold: usize) -> usize {
    let over = threshold.saturating_add(1);
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.len() <= threshold { long.len() } else { over };
    }
    if long.len() - short.len() > threshold {
        return over;
    }

    let mut prev = (0..=short.len()).collect::<Vec<usize>>();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &sc) in short.iter().enumerate() {
            let substitution = prev[j] + usize::from(lc != sc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            let value = substitution.min(deletion).min(insertion);
            curr[j + 1] = value;
            row_min = row_min.min(value);
        }
        if row_min > threshold {
            return over;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let result = prev[short.len()];
    if result > threshold { over } else { result }
}
