//! Rule based syllabification of a phoneme sequence, used to show learners how an utterance breaks
//! down and to highlight syllables during playback.
//!
//! The process is:
//!
//! 1. Normalise the phonemes. Stress marks and tie bars are removed, diphthongs and affricates that
//!    were split into two tokens are merged back together, and a schwa followed by a sonorant that
//!    ends the syllable (the "le" in "bottle") is collapsed into a syllabic consonant.
//! 2. Find the nuclei, every vowel or syllabic consonant is the centre of one syllable.
//! 3. Split the consonants between two nuclei using the maximal onset principle. The next syllable
//!    takes as many consonants as possible as long as they rise in sonority, with an exception for
//!    `s` + voiceless stop (+ liquid) clusters like "spr" and "st" which English allows despite
//!    the dip.
//!
//! Consonants before the first nucleus are all onset and those after the last are all coda.
//!
//! This only ever feeds a display so nothing here returns an error. Input we can't make sense of
//! gives an empty list of syllables.
use crate::phonemes::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Pairs of tokens that should be a single phoneme, and what they merge into.
const COMPOUNDS: &[(&str, &str, &str)] = &[
    ("a", "ɪ", "aɪ"),
    ("a", "ʊ", "aʊ"),
    ("e", "ɪ", "eɪ"),
    ("o", "ʊ", "oʊ"),
    ("ɔ", "ɪ", "ɔɪ"),
    ("ə", "ʊ", "əʊ"),
    ("ɪ", "ə", "ɪə"),
    ("e", "ə", "eə"),
    ("ʊ", "ə", "ʊə"),
    ("t", "ʃ", "tʃ"),
    ("d", "ʒ", "dʒ"),
];

/// When a phoneme was spoken, in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhonemeTiming {
    pub phoneme: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syllable {
    /// The phonemes joined together
    pub text: String,
    /// Normalised phonemes making up the syllable: onset, nucleus then coda
    pub phonemes: Vec<Token>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// A normalised phoneme and the range of input phonemes it was built from.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Segment {
    phoneme: Token,
    source: RangeInclusive<usize>,
}

impl Segment {
    fn merge(first: &Segment, second: &Segment, phoneme: Token) -> Self {
        Self {
            phoneme,
            source: *first.source.start()..=*second.source.end(),
        }
    }
}

fn compound(first: &str, second: &str) -> Option<&'static str> {
    COMPOUNDS
        .iter()
        .find(|(a, b, _)| *a == first && *b == second)
        .map(|(_, _, merged)| *merged)
}

fn normalise_segments<S: AsRef<str>>(phonemes: &[S]) -> Vec<Segment> {
    let cleaned = phonemes
        .iter()
        .enumerate()
        .map(|(i, p)| Segment {
            phoneme: strip_marks(p.as_ref().trim()),
            source: i..=i,
        })
        .filter(|s| !s.phoneme.is_empty())
        .collect::<Vec<_>>();

    let mut merged: Vec<Segment> = Vec::with_capacity(cleaned.len());
    let mut i = 0;
    while i < cleaned.len() {
        match cleaned
            .get(i + 1)
            .and_then(|next| compound(&cleaned[i].phoneme, &next.phoneme))
        {
            Some(phoneme) => {
                merged.push(Segment::merge(
                    &cleaned[i],
                    &cleaned[i + 1],
                    phoneme.to_string(),
                ));
                i += 2;
            }
            None => {
                merged.push(cleaned[i].clone());
                i += 1;
            }
        }
    }

    let mut result: Vec<Segment> = Vec::with_capacity(merged.len());
    let mut i = 0;
    while i < merged.len() {
        let current = &merged[i];
        let collapses = current.phoneme == SCHWA
            && result.last().map(|x| !is_nucleus(&x.phoneme)).unwrap_or(false)
            && merged
                .get(i + 1)
                .map(|x| can_be_syllabic(&x.phoneme))
                .unwrap_or(false)
            && merged
                .get(i + 2)
                .map(|x| !is_nucleus(&x.phoneme))
                .unwrap_or(true);
        if collapses {
            let sonorant = &merged[i + 1];
            result.push(Segment::merge(
                current,
                sonorant,
                syllabic(&sonorant.phoneme),
            ));
            i += 2;
        } else {
            result.push(current.clone());
            i += 1;
        }
    }
    result
}

/// The phoneme sequence the syllabifier actually works on. Concatenating the phonemes of the
/// syllables returned by [`syllabify`] always gives this sequence back.
pub fn normalise<S: AsRef<str>>(phonemes: &[S]) -> Vec<Token> {
    normalise_segments(phonemes)
        .into_iter()
        .map(|s| s.phoneme)
        .collect()
}

/// `s` followed by a voiceless stop and optionally a liquid. These onsets break the sonority rule
/// but are fine in English: "spring", "street", "sky".
fn is_s_cluster(cluster: &[&str]) -> bool {
    matches!(cluster.len(), 2 | 3)
        && cluster[0] == "s"
        && matches!(cluster[1], "p" | "t" | "k")
        && cluster
            .get(2)
            .map(|x| SonorityClass::of(x) == SonorityClass::Liquid)
            .unwrap_or(true)
}

/// Whether the consonants can start a syllable. Sonority must never fall from left to right.
pub fn is_valid_onset(cluster: &[&str]) -> bool {
    if cluster.is_empty() || is_s_cluster(cluster) {
        return true;
    }
    cluster
        .windows(2)
        .all(|pair| SonorityClass::of(pair[0]).rises_to(SonorityClass::of(pair[1])))
}

/// How many consonants from the end of the run go to the following syllable's onset.
fn onset_length(run: &[&str]) -> usize {
    (0..=run.len())
        .rev()
        .find(|len| is_valid_onset(&run[run.len() - len..]))
        .unwrap_or(0)
}

fn usable_timings<'a>(
    timings: Option<&'a [PhonemeTiming]>,
    phoneme_count: usize,
) -> Option<&'a [PhonemeTiming]> {
    let timings = timings?;
    if timings.len() < phoneme_count {
        warn!(
            "Only {} timings for {} phonemes, syllable timing omitted",
            timings.len(),
            phoneme_count
        );
        None
    } else {
        Some(timings)
    }
}

fn build_syllables(
    segments: &[Segment],
    timings: Option<&[PhonemeTiming]>,
) -> anyhow::Result<Vec<Syllable>> {
    let nuclei = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| is_nucleus(&s.phoneme))
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    if nuclei.is_empty() {
        anyhow::bail!("no syllable nucleus in {} phonemes", segments.len());
    }

    // Index of the first segment in each syllable, the first syllable takes the leading consonants
    let mut starts = vec![0];
    for pair in nuclei.windows(2) {
        let run = segments[pair[0] + 1..pair[1]]
            .iter()
            .map(|s| s.phoneme.as_str())
            .collect::<Vec<_>>();
        starts.push(pair[1] - onset_length(&run));
    }

    let mut syllables = Vec::with_capacity(starts.len());
    for (k, start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(segments.len());
        let parts = &segments[*start..end];
        let (first, last) = match (parts.first(), parts.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => anyhow::bail!("syllable {} has no phonemes", k),
        };
        let phonemes = parts
            .iter()
            .map(|s| s.phoneme.clone())
            .collect::<Vec<Token>>();
        let (start_time, end_time) = match timings {
            Some(t) => (
                Some(t[*first.source.start()].start),
                Some(t[*last.source.end()].end),
            ),
            None => (None, None),
        };
        syllables.push(Syllable {
            text: phonemes.concat(),
            phonemes,
            start_time,
            end_time,
        });
    }
    Ok(syllables)
}

/// Splits a phoneme sequence into syllables.
///
/// `timings`, if given, should have one entry per input phoneme (before normalisation). Each
/// syllable then spans from the start of its first phoneme to the end of its last. If there are
/// fewer timings than phonemes the timing is left out.
pub fn syllabify<S: AsRef<str>>(
    phonemes: &[S],
    timings: Option<&[PhonemeTiming]>,
) -> Vec<Syllable> {
    let segments = normalise_segments(phonemes);
    if segments.is_empty() {
        return vec![];
    }
    let timings = usable_timings(timings, phonemes.len());
    match build_syllables(&segments, timings) {
        Ok(syllables) => syllables,
        Err(e) => {
            debug!("Unable to syllabify: {}", e);
            vec![]
        }
    }
}

/// Syllabifies a phoneme string. Whitespace separated text is tokenised as usual, without
/// whitespace the text is split into grapheme clusters and the compound merging rebuilds the
/// multi-character phonemes.
pub fn syllabify_text(text: &str, timings: Option<&[PhonemeTiming]>) -> Vec<Syllable> {
    let tokens = if text.chars().any(char::is_whitespace) {
        tokenize(text)
    } else {
        text.graphemes(true).map(|g| g.to_string()).collect()
    };
    syllabify(&tokens, timings)
}
