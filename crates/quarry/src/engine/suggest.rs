/// Returns the candidate closest to `provided` by edit distance, if any is
/// close enough to be a likely typo.
///
/// A candidate qualifies when its distance is below both `1.1 * len(provided)`
/// and `3 * len(candidate)` for the shortest candidate.
pub(crate) fn closest<'a>(
    provided: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let candidates: Vec<&str> = candidates.into_iter().collect();
    let provided: Vec<char> = provided.chars().collect();

    let shortest = candidates.iter().map(|c| c.chars().count()).min()?;
    let mut threshold = f64::min(provided.len() as f64 * 1.1, (shortest * 3) as f64);
    let mut best = None;

    for candidate in candidates {
        let distance = levenshtein_with_max(candidate, &provided, threshold.ceil() as usize);

        if (distance as f64) < threshold {
            threshold = distance as f64;
            best = Some(candidate);
        }
    }

    best
}

/// Edit distance between `value` and `needle`, giving up with `max + 1` once
/// every path exceeds `max`.
fn levenshtein_with_max(value: &str, needle: &[char], max: usize) -> usize {
    if max == 0 {
        return if value.chars().eq(needle.iter().copied()) {
            0
        } else {
            1
        };
    }

    let n = needle.len();
    if n == 0 {
        return value.chars().count();
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for (i, c) in value.chars().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];

        for j in 1..=n {
            let cost = usize::from(c != needle[j - 1]);
            let d = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            curr[j] = d;
            row_min = row_min.min(d);
        }

        if row_min > max {
            return max + 1;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
