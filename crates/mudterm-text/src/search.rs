//! Case-insensitive keyword search over character slices.
//!
//! Offsets are character indices, matching [`StyledText`](crate::StyledText)
//! indexing.

#[inline]
fn same_ignoring_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn matches_at(haystack: &[char], needle: &[char], at: usize) -> bool {
    haystack[at..at + needle.len()]
        .iter()
        .zip(needle)
        .all(|(&h, &n)| same_ignoring_case(h, n))
}

/// First match starting at or after `from`.
#[must_use]
pub fn find_ignore_case(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last = haystack.len() - needle.len();
    (from..=last).find(|&at| matches_at(haystack, needle, at))
}

/// Last match starting strictly before `before`.
#[must_use]
pub fn rfind_ignore_case(haystack: &[char], needle: &[char], before: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let last = haystack.len() - needle.len();
    (0..before.min(last + 1))
        .rev()
        .find(|&at| matches_at(haystack, needle, at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn finds_forward_ignoring_case() {
        let hay = chars("Take my Love, take my land");
        let needle = chars("take");
        assert_eq!(find_ignore_case(&hay, &needle, 0), Some(0));
        assert_eq!(find_ignore_case(&hay, &needle, 1), Some(14));
        assert_eq!(find_ignore_case(&hay, &needle, 15), None);
        assert_eq!(find_ignore_case(&hay, &chars("LOVE"), 0), Some(8));
    }

    #[test]
    fn finds_backward() {
        let hay = chars("take my love, take my land");
        let needle = chars("e");
        assert_eq!(rfind_ignore_case(&hay, &needle, hay.len()), Some(17));
        assert_eq!(rfind_ignore_case(&hay, &needle, 17), Some(11));
        assert_eq!(rfind_ignore_case(&hay, &needle, 3), None);
    }

    #[test]
    fn multi_char_lowercase_is_compared_whole() {
        // 'İ' lowercases to "i\u{307}", not to a plain 'i'.
        let hay = chars("İstanbul");
        assert_eq!(find_ignore_case(&hay, &chars("istanbul"), 0), None);
        assert_eq!(find_ignore_case(&hay, &chars("İSTANBUL"), 0), Some(0));
    }

    #[test]
    fn empty_or_long_needle_never_matches() {
        let hay = chars("zoe");
        assert_eq!(find_ignore_case(&hay, &[], 0), None);
        assert_eq!(rfind_ignore_case(&hay, &chars("zoe washburne"), 3), None);
    }
}
