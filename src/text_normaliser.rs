//! Very light text normalisation. We only need enough to split a reference sentence into words and
//! look those words up in a pronunciation dictionary, anything like number expansion is the job of
//! whatever produced the reference text.
use deunicode::deunicode;
use once_cell::sync::OnceCell;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into lowercase orthographic words. Apostrophes are kept inside words so "don't"
/// stays as one word.
pub fn words(text: &str) -> Vec<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

/// Normalises a word into the form used as a dictionary key.
pub fn normalise_text(x: &str) -> String {
    let mut s = deunicode(x);
    s.retain(valid_char);
    s.make_ascii_uppercase();

    s
}

/// Dictionary entries can contain a version suffix for alternative pronunciations, i.e.
/// `TOMATO(2)`, this strips it before normalising.
pub fn dict_normalise(x: &str) -> String {
    static VERSION_REGEX: OnceCell<Regex> = OnceCell::new();
    let version_regex =
        VERSION_REGEX.get_or_init(|| Regex::new(r#"\(\d+\)$"#).expect("version regex is valid"));

    normalise_text(&version_regex.replace_all(x, ""))
}

fn valid_char(x: char) -> bool {
    !r#"!"£$%^&*()-_=+[{]};:@#~,<.>/?|\`¬"#.contains(x) && !x.is_whitespace()
}
