// Fuzzy matching utilities for "did you mean" suggestions

/// Calculate Levenshtein distance between two strings
/// Returns the minimum number of single-character edits (insertions, deletions, substitutions)
/// needed to transform one string into another
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let s1_len = s1_chars.len();
    let s2_len = s2_chars.len();

    if s1_len == 0 {
        return s2_len;
    }
    if s2_len == 0 {
        return s1_len;
    }

    // Two rolling rows instead of the full matrix
    let mut prev: Vec<usize> = (0..=s2_len).collect();
    let mut curr = vec![0; s2_len + 1];

    for i in 1..=s1_len {
        curr[0] = i;
        for j in 1..=s2_len {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1)          // deletion
                .min(curr[j - 1] + 1)        // insertion
                .min(prev[j - 1] + cost);    // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[s2_len]
}

/// Check if needle is a substring of haystack (case-insensitive)
pub fn is_substring_match(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Closest candidate within `max_distance` edits (case-insensitive).
/// Prefix matches win over edit distance.
pub fn closest_match<'a, I>(search: &str, candidates: I, max_distance: usize) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let search_lower = search.to_lowercase();
    let mut best: Option<(usize, &'a str)> = None;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        let distance = if candidate_lower.starts_with(&search_lower) && !search_lower.is_empty() {
            0
        } else {
            levenshtein_distance(&search_lower, &candidate_lower)
        };
        if distance <= max_distance && best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, name)| name.to_string())
}
