//! String similarity used to suggest corrections for unknown headlines.

/// Scores how alike two strings are, from 0 (nothing in common) to 100
/// (identical for the purposes of the scorer).
pub trait Similarity {
    /// Scores `left` against `right`.
    fn score(&self, left: &str, right: &str) -> u8;
}

/// Best ratio between the shorter string and any equally long window of the
/// longer one.
///
/// A misspelt or truncated headline ("SIGNALEMNT", "HÄNDELSE") still scores
/// high against its intended name. Comparison is case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatio;

impl Similarity for PartialRatio {
    fn score(&self, left: &str, right: &str) -> u8 {
        let left: Vec<char> = left.to_uppercase().chars().collect();
        let right: Vec<char> = right.to_uppercase().chars().collect();
        let (shorter, longer) = if left.len() <= right.len() {
            (left, right)
        } else {
            (right, left)
        };

        if shorter.is_empty() {
            return if longer.is_empty() { 100 } else { 0 };
        }

        longer
            .windows(shorter.len())
            .map(|window| ratio(&shorter, window))
            .max()
            .unwrap_or(0)
    }
}

/// `2 * matches / total` as a percentage, where matches is the length of the
/// longest common subsequence.
fn ratio(left: &[char], right: &[char]) -> u8 {
    let total = left.len() + right.len();
    if total == 0 {
        return 100;
    }
    let matches = longest_common_subsequence(left, right);
    let percent = (200 * matches + total / 2) / total;
    u8::try_from(percent).unwrap_or(100)
}

fn longest_common_subsequence(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0; right.len() + 1];
    let mut current = vec![0; right.len() + 1];

    for &l in left {
        for (j, &r) in right.iter().enumerate() {
            current[j + 1] = if l == r {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[right.len()]
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("BROTTET", "BROTTET", 100; "identical")]
    #[test_case("brottet", "BROTTET", 100; "case insensitive")]
    #[test_case("HÄNDELSE", "HÄNDELSEN", 100; "truncated")]
    #[test_case("XYZ", "ABC", 0; "disjoint")]
    #[test_case("", "", 100; "both empty")]
    #[test_case("", "ABC", 0; "one empty")]
    fn partial_ratio(left: &str, right: &str, expected: u8) {
        assert_eq!(PartialRatio.score(left, right), expected);
    }

    #[test]
    fn misspelling_scores_higher_than_unrelated_name() {
        let close = PartialRatio.score("SIGNALEMNT", "SIGNALEMENT");
        let far = PartialRatio.score("SIGNALEMNT", "SKADOR");
        assert!(close > far, "{close} <= {far}");
    }
}
