//! Maps a flat stream of recognised phonemes back onto the words of the reference utterance.
//!
//! The recogniser gives us no word boundaries, so rather than aligning each word on its own (which
//! drifts as soon as one word is badly off) we flatten the reference, do one global alignment, and
//! then cut the alignment up using the known number of phonemes in each reference word. The
//! downside is that a bad misalignment early on can't be recovered from later.
use crate::align::{align, AlignmentScoring, GAP};
use crate::phonemes::{tokenize, Token};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A word in the reference utterance and its expected pronunciation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// Lowercase orthographic word
    pub word: String,
    /// Whitespace separated phonemes for this word alone
    pub phonemes: String,
}

impl LexiconEntry {
    pub fn new(word: impl Into<String>, phonemes: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            phonemes: phonemes.into(),
        }
    }
}

/// The pronunciation of a reference utterance, one entry per word in utterance order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LexiconEntry) {
        self.entries.push(entry);
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LexiconEntry> {
        self.entries.iter()
    }

    /// Every reference phoneme in utterance order
    pub fn flatten(&self) -> Vec<Token> {
        self.iter().flat_map(|e| tokenize(&e.phonemes)).collect()
    }
}

impl<W, P> FromIterator<(W, P)> for Lexicon
where
    W: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (W, P)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(w, p)| LexiconEntry::new(w, p))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a LexiconEntry;
    type IntoIter = std::slice::Iter<'a, LexiconEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// What was expected for a word against what was heard for it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordComparison {
    pub word: String,
    /// Reference phonemes joined with no separator
    pub reference_phonemes: String,
    /// Recognised phonemes attributed to this word, joined with no separator
    pub recognized_phonemes: String,
    pub exact_match: bool,
}

impl WordComparison {
    fn new(word: &str, reference: &[&str], recognized: &[&str]) -> Self {
        let reference_phonemes = reference.concat();
        let recognized_phonemes = recognized.concat();
        // A word with nothing to say never counts as a match, even if nothing was heard
        let exact_match =
            !reference_phonemes.is_empty() && reference_phonemes == recognized_phonemes;
        Self {
            word: word.to_string(),
            reference_phonemes,
            recognized_phonemes,
            exact_match,
        }
    }
}

/// Aligns the recognised phonemes against the lexicon and splits the result into one comparison
/// per lexicon entry, the output always has the same length as the lexicon.
///
/// Recognised phonemes aligned against a gap in the reference (insertions) are attributed to the
/// word owning the next reference phoneme. Insertions after the last reference phoneme fall in no
/// word's window and are dropped.
pub fn align_per_word<S: AsRef<str>>(
    lexicon: &Lexicon,
    recognized: &[S],
    scoring: &AlignmentScoring,
) -> Vec<WordComparison> {
    let mut reference: Vec<Token> = vec![];
    // Maps the index of a reference phoneme to the index of the word it belongs to
    let mut owner = vec![];
    for (word_index, entry) in lexicon.iter().enumerate() {
        let tokens = tokenize(&entry.phonemes);
        if tokens.is_empty() {
            warn!("No reference phonemes for '{}', it can't be matched", entry.word);
        }
        owner.extend(std::iter::repeat(word_index).take(tokens.len()));
        reference.extend(tokens);
    }

    if reference.is_empty() {
        return lexicon
            .iter()
            .map(|e| WordComparison::new(&e.word, &[], &[]))
            .collect();
    }

    let recognized = recognized
        .iter()
        .map(|x| x.as_ref().to_string())
        .collect::<Vec<Token>>();
    let alignment = align(&reference, &recognized, scoring, GAP.to_string());
    debug!(
        "Aligned {} reference phonemes against {} recognised in {} positions",
        reference.len(),
        recognized.len(),
        alignment.len()
    );

    let mut reference_buffers: Vec<Vec<&str>> = vec![vec![]; lexicon.len()];
    let mut recognized_buffers: Vec<Vec<&str>> = vec![vec![]; lexicon.len()];
    let mut seen = 0;
    for (expected, heard) in alignment.iter() {
        let word = match owner.get(seen) {
            Some(word) => *word,
            None => {
                debug!("Dropping '{}' recognised after the end of the reference", heard);
                continue;
            }
        };
        if !alignment.is_gap(expected) {
            reference_buffers[word].push(expected.as_str());
            seen += 1;
        }
        if !alignment.is_gap(heard) {
            recognized_buffers[word].push(heard.as_str());
        }
    }

    lexicon
        .iter()
        .zip(reference_buffers.iter().zip(recognized_buffers.iter()))
        .map(|(entry, (expected, heard))| WordComparison::new(&entry.word, expected, heard))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_world() -> Lexicon {
        [("hello", "h ɛ l oʊ"), ("world", "w ɜr l d")]
            .into_iter()
            .collect()
    }

    fn tokens(s: &str) -> Vec<String> {
        tokenize(s)
    }

    #[test]
    fn perfect_match() {
        let res = align_per_word(
            &hello_world(),
            &tokens("h ɛ l oʊ w ɜr l d"),
            &AlignmentScoring::default(),
        );
        assert_eq!(res.len(), 2);
        assert!(res.iter().all(|x| x.exact_match));
        assert_eq!(res[0].reference_phonemes, "hɛloʊ");
        assert_eq!(res[1].recognized_phonemes, "wɜrld");
    }

    #[test]
    fn one_word_substitution() {
        let res = align_per_word(
            &hello_world(),
            &tokens("h ɛ l oʊ w ɜ l d"),
            &AlignmentScoring::default(),
        );
        assert!(res[0].exact_match);
        assert!(!res[1].exact_match);
        assert_eq!(res[1].reference_phonemes, "wɜrld");
        assert_eq!(res[1].recognized_phonemes, "wɜld");
    }

    #[test]
    fn nothing_recognised() {
        let empty: Vec<String> = vec![];
        let res = align_per_word(&hello_world(), &empty, &AlignmentScoring::default());
        assert_eq!(res.len(), 2);
        assert!(res.iter().all(|x| !x.exact_match));
        assert!(res.iter().all(|x| x.recognized_phonemes.is_empty()));
        assert_eq!(res[0].reference_phonemes, "hɛloʊ");
    }

    #[test]
    fn empty_reference() {
        let lexicon: Lexicon = [("um", ""), ("er", " ")].into_iter().collect();
        let res = align_per_word(&lexicon, &tokens("ə m"), &AlignmentScoring::default());
        assert_eq!(res.len(), 2);
        for comparison in &res {
            assert!(!comparison.exact_match);
            assert!(comparison.reference_phonemes.is_empty());
            assert!(comparison.recognized_phonemes.is_empty());
        }

        let res = align_per_word(&Lexicon::new(), &tokens("ə m"), &AlignmentScoring::default());
        assert!(res.is_empty());
    }

    #[test]
    fn word_without_phonemes_in_middle() {
        let lexicon: Lexicon = [("a", "ə"), ("xyzzy", ""), ("cat", "k æ t")]
            .into_iter()
            .collect();
        let res = align_per_word(&lexicon, &tokens("ə k æ t"), &AlignmentScoring::default());
        assert_eq!(res.len(), 3);
        assert!(res[0].exact_match);
        assert!(!res[1].exact_match);
        assert!(res[1].recognized_phonemes.is_empty());
        assert!(res[2].exact_match);
    }

    #[test]
    fn trailing_insertions_are_dropped() {
        let res = align_per_word(
            &hello_world(),
            &tokens("h ɛ l oʊ w ɜr l d z"),
            &AlignmentScoring::default(),
        );
        assert!(res[0].exact_match);
        assert!(res[1].exact_match);
        assert_eq!(res[1].recognized_phonemes, "wɜrld");

        let res = align_per_word(
            &hello_world(),
            &tokens("h ɛ l oʊ w ɜr l d z z"),
            &AlignmentScoring::default(),
        );
        assert!(res.iter().all(|x| x.exact_match));
    }

    #[test]
    fn leading_insertions_go_to_first_word() {
        let res = align_per_word(
            &hello_world(),
            &tokens("ə h ɛ l oʊ w ɜr l d"),
            &AlignmentScoring::default(),
        );
        assert_eq!(res[0].recognized_phonemes, "əhɛloʊ");
        assert!(!res[0].exact_match);
        assert!(res[1].exact_match);
    }

    #[test]
    fn lexicon_from_json() {
        let json = r#"[{"word": "hello", "phonemes": "h ɛ l oʊ"}]"#;
        let lexicon: Lexicon = serde_json::from_str(json).unwrap();
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.flatten(), vec!["h", "ɛ", "l", "oʊ"]);
    }
}
