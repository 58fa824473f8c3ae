//! Accuracy and error statistics over a set of word comparisons.
//!
//! Word level numbers come straight from `exact_match`. Phoneme level numbers re-align each
//! mismatched word, but at the character level rather than the token level, so a multi-character
//! symbol like `oʊ` counts as two units. This keeps the numbers comparable with the scores users
//! have already seen, it does mean an error inside a compound symbol can be attributed slightly
//! wrongly.
use crate::align::{edit_script, AlignmentScoring, EditOp};
use crate::word_align::WordComparison;
use serde::{Deserialize, Serialize};

/// Aggregate scores for an utterance. Percentages are in `[0, 100]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub word_accuracy: f64,
    pub phoneme_accuracy: f64,
    pub phoneme_error_rate: f64,
    pub total_words: usize,
    pub correct_words: usize,
    pub total_phonemes: usize,
    pub correct_phonemes: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

/// Per-position counts from a character level comparison of one word
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct ErrorCounts {
    correct: usize,
    substitutions: usize,
    insertions: usize,
    deletions: usize,
}

fn count_errors(reference: &str, recognized: &str, scoring: &AlignmentScoring) -> ErrorCounts {
    let reference = reference.chars().collect::<Vec<char>>();
    let recognized = recognized.chars().collect::<Vec<char>>();
    let mut counts = ErrorCounts::default();
    for op in edit_script(&reference, &recognized, scoring) {
        match op {
            EditOp::Match => counts.correct += 1,
            EditOp::Substitute => counts.substitutions += 1,
            EditOp::Insert => counts.insertions += 1,
            EditOp::Delete => counts.deletions += 1,
        }
    }
    counts
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Computes metrics with the default alignment scores.
pub fn calculate(comparisons: &[WordComparison]) -> Metrics {
    calculate_with(comparisons, &AlignmentScoring::default())
}

/// Computes metrics, `scoring` is used for the character level re-alignment of mismatched words.
pub fn calculate_with(comparisons: &[WordComparison], scoring: &AlignmentScoring) -> Metrics {
    let mut metrics = Metrics {
        total_words: comparisons.len(),
        correct_words: comparisons.iter().filter(|x| x.exact_match).count(),
        ..Default::default()
    };

    for comparison in comparisons {
        let length = comparison.reference_phonemes.chars().count();
        metrics.total_phonemes += length;
        if comparison.exact_match {
            metrics.correct_phonemes += length;
        } else {
            let counts = count_errors(
                &comparison.reference_phonemes,
                &comparison.recognized_phonemes,
                scoring,
            );
            metrics.correct_phonemes += counts.correct;
            metrics.substitutions += counts.substitutions;
            metrics.insertions += counts.insertions;
            metrics.deletions += counts.deletions;
        }
    }

    metrics.word_accuracy = percentage(metrics.correct_words, metrics.total_words);
    metrics.phoneme_accuracy = percentage(metrics.correct_phonemes, metrics.total_phonemes);
    metrics.phoneme_error_rate = 100.0 - metrics.phoneme_accuracy;
    metrics
}

/// Character level accuracy for a single word. An empty reference scores 0.
pub fn word_phoneme_accuracy(comparison: &WordComparison, scoring: &AlignmentScoring) -> f64 {
    let length = comparison.reference_phonemes.chars().count();
    if comparison.exact_match {
        return percentage(length, length);
    }
    let counts = count_errors(
        &comparison.reference_phonemes,
        &comparison.recognized_phonemes,
        scoring,
    );
    percentage(counts.correct, length)
}

/// The words worth drilling: anything that wasn't an exact match or scored below `threshold`
/// percent phoneme accuracy. Words without a reference pronunciation are skipped as there's
/// nothing to practice.
pub fn practice_words<'a>(
    comparisons: &'a [WordComparison],
    threshold: f64,
    scoring: &AlignmentScoring,
) -> Vec<&'a WordComparison> {
    comparisons
        .iter()
        .filter(|x| !x.reference_phonemes.is_empty())
        .filter(|x| !x.exact_match || word_phoneme_accuracy(x, scoring) < threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(word: &str, reference: &str, recognized: &str) -> WordComparison {
        WordComparison {
            word: word.to_string(),
            reference_phonemes: reference.to_string(),
            recognized_phonemes: recognized.to_string(),
            exact_match: !reference.is_empty() && reference == recognized,
        }
    }

    #[test]
    fn no_comparisons() {
        let metrics = calculate(&[]);
        assert_eq!(metrics.total_words, 0);
        assert_eq!(metrics.word_accuracy, 0.0);
        assert_eq!(metrics.phoneme_accuracy, 0.0);
        assert_eq!(metrics.phoneme_error_rate, 100.0);
    }

    #[test]
    fn all_correct() {
        let comparisons = vec![
            comparison("hello", "hɛloʊ", "hɛloʊ"),
            comparison("world", "wɜrld", "wɜrld"),
        ];
        let metrics = calculate(&comparisons);
        assert_eq!(metrics.word_accuracy, 100.0);
        assert_eq!(metrics.phoneme_accuracy, 100.0);
        assert_eq!(metrics.phoneme_error_rate, 0.0);
        assert_eq!(metrics.total_phonemes, 10);
        assert_eq!(metrics.correct_phonemes, 10);
        assert_eq!(metrics.substitutions, 0);
        assert_eq!(metrics.insertions, 0);
        assert_eq!(metrics.deletions, 0);
    }

    #[test]
    fn counts_each_error_kind() {
        let comparisons = vec![
            // r dropped
            comparison("world", "wɜrld", "wɜld"),
            // t heard as d
            comparison("cat", "kæt", "kæd"),
            // extra s
            comparison("dog", "dɔɡ", "dɔɡs"),
        ];
        let metrics = calculate(&comparisons);
        assert_eq!(metrics.correct_words, 0);
        assert_eq!(metrics.deletions, 1);
        assert_eq!(metrics.substitutions, 1);
        assert_eq!(metrics.insertions, 1);
        assert_eq!(metrics.total_phonemes, 11);
        assert_eq!(metrics.correct_phonemes, 9);
        assert!((metrics.phoneme_accuracy - 9.0 / 11.0 * 100.0).abs() < 1e-9);
        assert_eq!(metrics.phoneme_error_rate, 100.0 - metrics.phoneme_accuracy);
    }

    #[test]
    fn empty_reference_word() {
        let comparisons = vec![comparison("um", "", "əm"), comparison("a", "ə", "ə")];
        let metrics = calculate(&comparisons);
        assert_eq!(metrics.word_accuracy, 50.0);
        assert_eq!(metrics.total_phonemes, 1);
        assert_eq!(metrics.insertions, 2);
        assert_eq!(metrics.phoneme_accuracy, 100.0);
    }

    #[test]
    fn bounds_hold() {
        let comparisons = vec![
            comparison("a", "abc", ""),
            comparison("b", "", "xyz"),
            comparison("c", "ab", "ba"),
            comparison("d", "ʃ", "ʃʃʃʃ"),
        ];
        let metrics = calculate(&comparisons);
        for value in [
            metrics.word_accuracy,
            metrics.phoneme_accuracy,
            metrics.phoneme_error_rate,
        ] {
            assert!((0.0..=100.0).contains(&value));
        }
        assert_eq!(metrics.phoneme_error_rate, 100.0 - metrics.phoneme_accuracy);
    }

    #[test]
    fn per_word_accuracy_and_practice() {
        let scoring = AlignmentScoring::default();
        let comparisons = vec![
            comparison("hello", "hɛloʊ", "hɛloʊ"),
            comparison("world", "wɜrld", "wɜld"),
            comparison("um", "", ""),
        ];
        assert_eq!(word_phoneme_accuracy(&comparisons[0], &scoring), 100.0);
        assert_eq!(word_phoneme_accuracy(&comparisons[1], &scoring), 80.0);
        assert_eq!(word_phoneme_accuracy(&comparisons[2], &scoring), 0.0);

        let practice = practice_words(&comparisons, 80.0, &scoring);
        assert_eq!(practice.len(), 1);
        assert_eq!(practice[0].word, "world");
    }
}
