//! Phonemes come into this crate as strings of IPA symbols. Upstream these come from a G2P model
//! or dictionary (the reference) and from a phoneme recogniser (what was actually said). We treat
//! a phoneme as an opaque token compared by exact string equality, the only place we look inside
//! one is when classifying it for syllabification.
//!
//! For finding out about phonemes and how they're grouped I rely on Wikipedia, the sonority
//! hierarchy in particular is a simplification and different linguists will rank things
//! differently.
use anyhow::Error;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::cmp::Ordering;

/// An atomic phonetic symbol. May be more than one character, diphthongs and affricates are
/// written as one token.
pub type Token = String;

/// Combining vertical line below, marks a consonant acting as a syllable nucleus e.g. `l̩`.
pub const SYLLABIC_MARK: char = '\u{0329}';

/// Combining double inverted breve, the tie bar in `t͡ʃ`.
pub const TIE_BAR: char = '\u{0361}';

/// The neutral vowel
pub const SCHWA: &str = "ə";

/// Splits a phoneme string into tokens.
///
/// If there's any whitespace this is taken as the segmentation and the non-empty pieces are
/// returned as is. Otherwise we fall back to a scan which groups runs of IPA letters, diacritics,
/// length and stress marks together and makes every other character its own token. This fallback
/// is a tolerance layer for recognisers that don't space their output, it makes no attempt to work
/// out where one phoneme ends and the next begins.
pub fn tokenize(text: &str) -> Vec<Token> {
    if text.chars().any(char::is_whitespace) {
        text.split_whitespace().map(|x| x.to_string()).collect()
    } else {
        static IPA_RUN: OnceCell<Regex> = OnceCell::new();
        let ipa_run = IPA_RUN.get_or_init(|| {
            // Latin letters, the loose IPA letters outside the IPA extensions block, the IPA
            // extensions and spacing modifiers (stress, length, aspiration) and combining
            // diacritics (tie bars, syllabic mark, nasalisation etc).
            Regex::new(concat!(
                r"[a-zA-Z",
                r"\x{00E6}\x{00E7}\x{00F0}\x{00F8}\x{0127}\x{014B}\x{0153}",
                r"\x{01C0}-\x{01C3}\x{03B2}\x{03B8}\x{03C7}\x{1D7B}\x{2C71}",
                r"\x{0250}-\x{02FF}\x{0300}-\x{036F}]+|.",
            ))
            .expect("IPA token regex is valid")
        });
        ipa_run
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Sonority ranking for consonants, from least to most sonorous. Vowels sit above everything and
/// only exist here so every phoneme can be given a class.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum SonorityClass {
    /// Plosives and affricates. `p`, `t`, `k`, `tʃ`
    Stop,
    /// `f`, `s`, `ʃ`, `h`
    Fricative,
    /// `m`, `n`, `ŋ`
    Nasal,
    /// `l`, `r`, `ɹ`
    Liquid,
    /// Semi-vowels, `w` and `j`
    Glide,
    /// Vowels and syllabic consonants
    Nucleus,
}

impl SonorityClass {
    /// Numeric rank, 0 is least sonorous
    pub fn rank(&self) -> u8 {
        match self {
            Self::Stop => 0,
            Self::Fricative => 1,
            Self::Nasal => 2,
            Self::Liquid => 3,
            Self::Glide => 4,
            Self::Nucleus => 5,
        }
    }

    /// Whether moving from `self` to `next` doesn't drop in sonority
    pub fn rises_to(&self, next: SonorityClass) -> bool {
        self.rank().cmp(&next.rank()) != Ordering::Greater
    }

    /// Classifies a consonant. Anything we don't recognise is treated as a stop, the least
    /// permissive choice when checking onsets.
    pub fn of(phoneme: &str) -> Self {
        if is_nucleus(phoneme) {
            return Self::Nucleus;
        }
        let base = strip_marks(phoneme);
        match base.as_str() {
            "p" | "b" | "t" | "d" | "k" | "ɡ" | "g" | "q" | "c" | "ɟ" | "ʔ" | "tʃ" | "dʒ" | "ts"
            | "dz" | "ɾ" => Self::Stop,
            "f" | "v" | "θ" | "ð" | "s" | "z" | "ʃ" | "ʒ" | "h" | "x" | "ɣ" | "χ" | "ç" | "ɸ"
            | "β" | "ɦ" => Self::Fricative,
            "m" | "n" | "ŋ" | "ɲ" | "ɱ" | "ɴ" => Self::Nasal,
            "l" | "r" | "ɹ" | "ɫ" | "ɻ" | "ʎ" | "ɭ" | "ʁ" | "ɽ" => Self::Liquid,
            "w" | "j" | "ɥ" | "ʍ" | "ɰ" => Self::Glide,
            _ => Self::Stop,
        }
    }
}

/// Removes stress marks and tie bars, everything else about the token is kept.
pub fn strip_marks(phoneme: &str) -> String {
    phoneme
        .chars()
        .filter(|c| !matches!(*c, 'ˈ' | 'ˌ' | '\'' | TIE_BAR | '\u{035C}'))
        .collect()
}

fn is_vowel_char(c: char) -> bool {
    matches!(
        c,
        'a' | 'e'
            | 'i'
            | 'o'
            | 'u'
            | 'y'
            | 'æ'
            | 'ɑ'
            | 'ɒ'
            | 'ɐ'
            | 'ɔ'
            | 'ə'
            | 'ɘ'
            | 'ɚ'
            | 'ɛ'
            | 'ɜ'
            | 'ɝ'
            | 'ɞ'
            | 'ɤ'
            | 'ɨ'
            | 'ɪ'
            | 'ɯ'
            | 'ɵ'
            | 'ø'
            | 'œ'
            | 'ɶ'
            | 'ʉ'
            | 'ʊ'
            | 'ʌ'
            | 'ʏ'
    )
}

/// A vowel is any token whose first letter (ignoring stress) is a vowel. This covers length marks
/// (`iː`), diphthongs (`oʊ`) and r-coloured vowels written with a trailing `r` (`ɜr`).
pub fn is_vowel(phoneme: &str) -> bool {
    strip_marks(phoneme)
        .chars()
        .next()
        .map(is_vowel_char)
        .unwrap_or(false)
}

/// A consonant carrying the syllabic mark
pub fn is_syllabic_consonant(phoneme: &str) -> bool {
    phoneme.contains(SYLLABIC_MARK) && !is_vowel(phoneme)
}

/// Whether the token can be the nucleus of a syllable
pub fn is_nucleus(phoneme: &str) -> bool {
    is_vowel(phoneme) || is_syllabic_consonant(phoneme)
}

/// Sonorant consonants that absorb a preceding schwa to become syllabic
pub fn can_be_syllabic(phoneme: &str) -> bool {
    matches!(phoneme, "l" | "n" | "m")
}

/// Marks a consonant as syllabic
pub fn syllabic(phoneme: &str) -> Token {
    let mut s = phoneme.to_string();
    s.push(SYLLABIC_MARK);
    s
}

/// Converts an ARPAbet phone as found in CMU dict to IPA. The stress number is used to pick the
/// reduced vowel for AH and ER, otherwise it's dropped.
pub fn arpa_to_ipa(arpa: &str) -> anyhow::Result<&'static str> {
    let (phone, stress) = match arpa.char_indices().find(|(_, c)| c.is_ascii_digit()) {
        Some((i, _)) => (&arpa[..i], Some(&arpa[i..])),
        None => (arpa, None),
    };
    let unstressed = stress == Some("0");
    let ipa = match phone {
        "AA" => "ɑ",
        "AE" => "æ",
        "AH" if unstressed => "ə",
        "AH" => "ʌ",
        "AO" => "ɔ",
        "AW" => "aʊ",
        "AX" => "ə",
        "AY" => "aɪ",
        "EH" => "ɛ",
        "ER" if unstressed => "ɚ",
        "ER" => "ɝ",
        "EY" => "eɪ",
        "IH" => "ɪ",
        "IY" => "i",
        "OW" => "oʊ",
        "OY" => "ɔɪ",
        "UH" => "ʊ",
        "UW" => "u",
        "B" => "b",
        "CH" => "tʃ",
        "D" => "d",
        "DH" => "ð",
        "DX" => "ɾ",
        "F" => "f",
        "G" => "ɡ",
        "HH" => "h",
        "JH" => "dʒ",
        "K" => "k",
        "L" => "l",
        "M" => "m",
        "N" => "n",
        "NG" => "ŋ",
        "P" => "p",
        "Q" => "ʔ",
        "R" => "ɹ",
        "S" => "s",
        "SH" => "ʃ",
        "T" => "t",
        "TH" => "θ",
        "V" => "v",
        "W" => "w",
        "Y" => "j",
        "Z" => "z",
        "ZH" => "ʒ",
        _ => {
            return Err(Error::msg("invalid phone")
                .context(format!("{} is not a valid ARPABET phone", arpa)))
        }
    };
    Ok(ipa)
}
