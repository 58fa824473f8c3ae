use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use xd_pronounce::*;

#[derive(Parser, Debug)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a recognised phoneme string against a reference
    Score {
        /// JSON lexicon, a list of `{"word": .., "phonemes": ..}` in utterance order
        #[clap(long, conflicts_with_all = ["text", "dictionary"])]
        lexicon: Option<PathBuf>,
        /// Reference text, looked up in the dictionary to build the lexicon
        #[clap(long, short, requires = "dictionary")]
        text: Option<String>,
        /// CMU pronouncing dictionary
        #[clap(long, short)]
        dictionary: Option<PathBuf>,
        /// Phonemes the recogniser produced, preferably whitespace separated
        #[clap(long, short)]
        recognized: String,
        /// JSON scoring config
        #[clap(long, short)]
        config: Option<PathBuf>,
    },
    /// Split a phoneme string into syllables
    Syllabify {
        /// Phonemes to split
        #[clap(long, short)]
        phonemes: String,
        /// JSON list of `{"phoneme": .., "start": .., "end": ..}` for each phoneme
        #[clap(long)]
        timings: Option<PathBuf>,
    },
}

fn load_lexicon(
    lexicon: Option<PathBuf>,
    text: Option<String>,
    dictionary: Option<PathBuf>,
) -> anyhow::Result<Lexicon> {
    match (lexicon, text, dictionary) {
        (Some(path), _, _) => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read lexicon {}", path.display()))?;
            let lexicon = serde_json::from_str(&data)
                .with_context(|| format!("invalid lexicon {}", path.display()))?;
            Ok(lexicon)
        }
        (None, Some(text), Some(dictionary)) => {
            let dictionary = CmuDictionary::open(dictionary)?;
            Ok(dictionary.lexicon(&text))
        }
        _ => anyhow::bail!("Provide either --lexicon or --text with --dictionary"),
    }
}

fn main() -> anyhow::Result<()> {
    xd_pronounce::setup_logging()?;
    let args = Args::parse();

    let output = match args.command {
        Command::Score {
            lexicon,
            text,
            dictionary,
            recognized,
            config,
        } => {
            let config = match config {
                Some(path) => ScoringConfig::load(path)?,
                None => ScoringConfig::default(),
            };
            let lexicon = load_lexicon(lexicon, text, dictionary)?;
            info!("Scoring against {} reference words", lexicon.len());
            let report = score_utterance(&lexicon, &recognized, &config);
            serde_json::to_string_pretty(&report)?
        }
        Command::Syllabify { phonemes, timings } => {
            let timings: Option<Vec<PhonemeTiming>> = match timings {
                Some(path) => {
                    let data = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read timings {}", path.display()))?;
                    Some(serde_json::from_str(&data)?)
                }
                None => None,
            };
            let syllables = syllabify_text(&phonemes, timings.as_deref());
            serde_json::to_string_pretty(&syllables)?
        }
    };
    println!("{}", output);
    Ok(())
}
