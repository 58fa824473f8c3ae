//! Dictionary lookup is the simplest way to get a reference pronunciation for a sentence. This
//! module loads the CMU pronouncing dictionary and turns its ARPAbet into the IPA phoneme strings
//! the rest of the crate works with.
//!
//! We don't try to pick between pronunciations of words with the same spelling, the first entry in
//! the dictionary wins. Getting this right needs the word in context which is a job for a proper
//! G2P model upstream.
use crate::phonemes::{arpa_to_ipa, Token};
use crate::text_normaliser::*;
use crate::word_align::{Lexicon, LexiconEntry};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, prelude::*};
use std::path::Path;
use tracing::{error, info, warn};

/// Pronunciation of a word as IPA tokens
pub type Pronunciation = Vec<Token>;

/// Type that wraps the dictionary, the underlying dictionary store is backed by a `BTreeMap`
#[derive(Debug, Default, Clone)]
pub struct CmuDictionary {
    /// One word may have multiple pronunciations
    dictionary: BTreeMap<String, Vec<Pronunciation>>,
}

impl CmuDictionary {
    /// Opens a dictionary from a file
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open dictionary {}", path.display()))?;
        let dictionary = Self::from_reader(io::BufReader::new(file))?;
        info!("Loaded {} words from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    /// Merge two dictionaries, handy for keeping user supplied pronunciations separate from the
    /// CMU dict file while still using both.
    pub fn merge(&mut self, other: CmuDictionary) {
        for (k, mut v) in other.dictionary.into_iter() {
            let pronunciations = self.dictionary.entry(k).or_default();
            for pronunc in v.drain(..) {
                if !pronunciations.contains(&pronunc) {
                    pronunciations.push(pronunc);
                }
            }
        }
    }

    /// Number of words in the dictionary
    pub fn len(&self) -> usize {
        self.dictionary.len()
    }

    /// Whether the dictionary is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses the dictionary from a reader, lines are `WORD  PH1 PH2 ...` with `;;;` comments.
    /// Entries containing a phone we can't map are skipped.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut dictionary: BTreeMap<String, Vec<Pronunciation>> = BTreeMap::new();

        'outer: for line in reader.lines() {
            let line = line?;
            if line.starts_with(";;;") {
                continue;
            }
            let mut data = line.split("  ");
            let word = match data.next() {
                Some(s) if !s.trim().is_empty() => dict_normalise(s),
                _ => continue,
            };
            let phonemes = match data.next() {
                Some(s) => s.split(' '),
                None => continue,
            };
            let mut pronounce = vec![];
            for (i, phone) in phonemes.filter(|x| !x.is_empty()).enumerate() {
                match arpa_to_ipa(phone) {
                    Ok(s) => pronounce.push(s.to_string()),
                    Err(e) => {
                        error!("Unable to parse phone {}: {} for word: {}", i, e, word);
                        continue 'outer;
                    }
                }
            }
            dictionary.entry(word).or_default().push(pronounce);
        }
        Ok(Self { dictionary })
    }

    /// All the entries in the dictionary are normalised, if the input already is we can skip the
    /// extra normalisation pass.
    #[inline(always)]
    pub fn get_pronunciations_normalised(&self, word: &str) -> Option<&Vec<Pronunciation>> {
        self.dictionary.get(word)
    }

    /// Pass a word into the dictionary that hasn't yet been normalised.
    pub fn get_pronunciations(&self, word: &str) -> Option<&Vec<Pronunciation>> {
        self.get_pronunciations_normalised(&normalise_text(word))
    }

    /// First listed pronunciation of a word
    pub fn get_pronunciation(&self, word: &str) -> Option<&Pronunciation> {
        self.get_pronunciations(word).and_then(|x| x.first())
    }

    /// Builds the reference lexicon for some text. Words that aren't in the dictionary are still
    /// included, with no phonemes, so the lexicon lines up with what the user was asked to say.
    pub fn lexicon(&self, text: &str) -> Lexicon {
        let mut lexicon = Lexicon::new();
        for word in words(text) {
            let phonemes = match self.get_pronunciation(&word) {
                Some(p) => p.join(" "),
                None => {
                    warn!("'{}' is not in the dictionary", word);
                    String::new()
                }
            };
            lexicon.push(LexiconEntry::new(word, phonemes));
        }
        lexicon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(s: &str) -> CmuDictionary {
        CmuDictionary::from_reader(io::Cursor::new(s.to_string())).unwrap()
    }

    #[test]
    fn parse_entries() {
        let dict = dictionary(
            ";;; comment line\nHELLO  HH AH0 L OW1\nHELLO(2)  HH EH0 L OW1\nWORLD  W ER1 L D\nBAD  B XX D",
        );
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get_pronunciations("hello").unwrap().len(), 2);
        assert_eq!(
            dict.get_pronunciation("Hello").unwrap(),
            &vec!["h", "ə", "l", "oʊ"]
        );
        assert_eq!(dict.get_pronunciation("world").unwrap(), &vec!["w", "ɝ", "l", "d"]);
        assert!(dict.get_pronunciations("bad").is_none());
    }

    #[test]
    fn dictionary_merge() {
        let mut base = dictionary("RUSTNATION  R AH1 S T N EY1 SH AH0 N\nRUST  R AH1 S T");
        let to_merge = dictionary(
            "RUSTNATION  R AH1 S T N EY1 SH AH0 N\nRUSTNATION  R AH1 S N EY1 SH AH0 N\nUST  UH1 S T",
        );

        assert_eq!(base.len(), 2);
        assert_eq!(to_merge.get_pronunciations("RUSTNATION").unwrap().len(), 2);

        base.merge(to_merge);
        assert_eq!(base.len(), 3);
        assert_eq!(base.get_pronunciations("RUSTNATION").unwrap().len(), 2);
        assert_eq!(base.get_pronunciations("RUST").unwrap().len(), 1);
        assert_eq!(base.get_pronunciations("UST").unwrap().len(), 1);
    }

    #[test]
    fn build_lexicon() {
        let dict = dictionary("HELLO  HH AH0 L OW1\nWORLD  W ER1 L D");
        let lexicon = dict.lexicon("Hello, brave world!");
        let entries = lexicon.iter().collect::<Vec<_>>();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].word, "hello");
        assert_eq!(entries[0].phonemes, "h ə l oʊ");
        assert_eq!(entries[1].word, "brave");
        assert!(entries[1].phonemes.is_empty());
        assert_eq!(entries[2].phonemes, "w ɝ l d");
    }
}
