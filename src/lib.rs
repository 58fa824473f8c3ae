use std::env;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{Layer, Registry};

pub mod align;
pub mod cmu_dict;
pub mod config;
pub mod metrics;
pub mod phonemes;
pub mod report;
pub mod syllables;
pub mod text_normaliser;
pub mod word_align;

pub use align::{align, edit_script, AlignedPair, AlignmentScoring, EditOp, GAP};
pub use cmu_dict::CmuDictionary;
pub use config::ScoringConfig;
pub use metrics::{calculate, Metrics};
pub use phonemes::{tokenize, SonorityClass, Token};
pub use report::{score_utterance, PronunciationReport};
pub use syllables::{syllabify, syllabify_text, PhonemeTiming, Syllable};
pub use word_align::{align_per_word, Lexicon, LexiconEntry, WordComparison};

pub fn setup_logging() -> anyhow::Result<()> {
    let filter = match env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_env("RUST_LOG"),
        _ => EnvFilter::new("xd_pronounce=info,pronounce=info"),
    };

    let fmt = tracing_subscriber::fmt::Layer::default().with_writer(std::io::stderr);

    let subscriber = filter.and_then(fmt).with_subscriber(Registry::default());

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
