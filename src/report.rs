//! Ties the pieces together for the common case: the user was asked to say something, here's the
//! reference pronunciation and what the recogniser heard, how did they do?
use crate::config::ScoringConfig;
use crate::metrics::{calculate_with, practice_words, Metrics};
use crate::phonemes::tokenize;
use crate::word_align::{align_per_word, Lexicon, WordComparison};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PronunciationReport {
    pub words: Vec<WordComparison>,
    pub metrics: Metrics,
    /// Words suggested for further practice, in utterance order
    pub practice_words: Vec<String>,
}

/// Scores a recognised phoneme string against the lexicon.
pub fn score_utterance(
    lexicon: &Lexicon,
    recognized: &str,
    config: &ScoringConfig,
) -> PronunciationReport {
    let recognized = tokenize(recognized);
    let words = align_per_word(lexicon, &recognized, &config.alignment);
    let metrics = calculate_with(&words, &config.alignment);
    let practice_words = practice_words(&words, config.practice_threshold, &config.alignment)
        .into_iter()
        .map(|x| x.word.clone())
        .collect();
    info!(
        "Scored {} words, word accuracy {:.1}% phoneme accuracy {:.1}%",
        metrics.total_words, metrics.word_accuracy, metrics.phoneme_accuracy
    );

    PronunciationReport {
        words,
        metrics,
        practice_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_hello_world() {
        let lexicon: Lexicon = [("hello", "h ɛ l oʊ"), ("world", "w ɜr l d")]
            .into_iter()
            .collect();
        let report = score_utterance(&lexicon, "h ɛ l oʊ w ɜ l d", &ScoringConfig::default());
        assert_eq!(report.words.len(), 2);
        assert_eq!(report.metrics.word_accuracy, 50.0);
        assert_eq!(report.practice_words, vec!["world".to_string()]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metrics"]["correctWords"], 1);
        assert_eq!(json["words"][1]["exactMatch"], false);
        assert_eq!(json["practiceWords"][0], "world");
    }
}
