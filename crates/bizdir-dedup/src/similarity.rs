//! Similarity scoring for duplicate detection
//!
//! The ratio is the classic sequence-matching measure: find the longest
//! common block, recurse on the pieces to its left and right, and score
//! `2 * matched / (len(a) + len(b))`.

use std::collections::HashMap;

use crate::normalization::fold_diacritics;

/// Similarity ratio of two strings in `[0, 1]`, compared case-insensitively
///
/// Returns 1.0 for strings that are identical after lowercasing (including two
/// empty strings) and 0.0 when they share no characters. Block decomposition
/// can depend on argument order, so both orders are scored and the larger
/// match count is used.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a, &b).max(matching_characters(&b, &a));
    2.0 * matched as f64 / total as f64
}

/// Name similarity, optionally ignoring diacritics
pub fn name_similarity(a: &str, b: &str, fold_diacritics_first: bool) -> f64 {
    if fold_diacritics_first {
        ratio(&fold_diacritics(a), &fold_diacritics(b))
    } else {
        ratio(a, b)
    }
}

/// Total size of the matching blocks between `a` and `b`
fn matching_characters(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Positions of each character in b, ascending
    let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b_positions.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = queue.pop() {
        let (i, j, size) = longest_match(a, &b_positions, a_lo, a_hi, b_lo, b_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if a_lo < i && b_lo < j {
            queue.push((a_lo, i, b_lo, j));
        }
        if i + size < a_hi && j + size < b_hi {
            queue.push((i + size, a_hi, j + size, b_hi));
        }
    }

    matched
}

/// Longest common block of `a[a_lo..a_hi]` and `b[b_lo..b_hi]`
///
/// Returns `(i, j, size)`; ties resolve to the earliest block in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b_positions: &HashMap<char, Vec<usize>>,
    a_lo: usize,
    a_hi: usize,
    b_lo: usize,
    b_hi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
    // Length of the match ending at a[i - 1], b[j]
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(a_hi).skip(a_lo) {
        let mut next_run_lengths = HashMap::new();
        if let Some(positions) = b_positions.get(c) {
            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }
                let size = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_run_lengths.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }
        run_lengths = next_run_lengths;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical() {
        assert_eq!(ratio("Pho Saigon", "Pho Saigon"), 1.0);
        assert_eq!(ratio("Pho Saigon", "PHO SAIGON"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_disjoint() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_known_values() {
        // one shared block "bcd": 2 * 3 / 8
        assert!(approx(ratio("abcd", "bcde"), 0.75));
        // "pho bistro" vs "pho bistro 2": 10 shared of 22 total chars
        assert!(approx(ratio("Pho Bistro", "Pho Bistro 2"), 20.0 / 22.0));
        // single substitution in 8 characters
        assert!(approx(ratio("top nail", "pro nail"), 12.0 / 16.0));
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // "abxcd" vs "abycd": blocks "ab" and "cd"
        assert!(approx(ratio("abxcd", "abycd"), 8.0 / 10.0));
    }

    #[test]
    fn test_symmetric_on_order_sensitive_input() {
        let pairs = [
            ("tide", "diet"),
            ("qabxcd", "abycdf"),
            ("Pho Pasteur II", "Pho Pasteur 4"),
        ];
        for (a, b) in pairs {
            assert_eq!(ratio(a, b), ratio(b, a), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_unicode() {
        assert_eq!(ratio("Phở Thiên Ẩn", "phở thiên ẩn"), 1.0);
        assert!(ratio("Phở", "Pho") < 1.0);
    }

    #[test]
    fn test_name_similarity_folding() {
        assert!(name_similarity("Mỹ Lan Restaurant", "My Lan Restaurant", false) < 1.0);
        assert_eq!(
            name_similarity("Mỹ Lan Restaurant", "My Lan Restaurant", true),
            1.0
        );
    }
}
