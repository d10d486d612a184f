use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::matcher::{DictionaryMatcher, EntityMatcher, LexiconRecognizer, NerMatcher};
use crate::render::Mode;

/// Explore how bacteria are regulated in recent PubMed literature.
#[derive(Parser, Debug)]
#[command(name = "microbe-scout", version, about)]
pub struct Cli {
    /// First keyword, matched against title/abstract
    #[arg(default_value = "stress")]
    pub keyword_1: String,

    /// Second keyword, matched against title/abstract
    #[arg(default_value = "women")]
    pub keyword_2: String,

    /// Maximum number of papers to retrieve (e.g. 30, 60, 100)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub max_results: u32,

    /// PubMed sort order: "relevance", "pub_date", "Author", "JournalName"
    #[arg(long)]
    pub sort: Option<String>,

    /// Entity matching strategy
    #[arg(long, value_enum, default_value_t = MatcherKind::Dictionary)]
    pub matcher: MatcherKind,

    /// Gazetteer for the ner matcher (surface<TAB>LABEL per line); installed if missing
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Mode::List)]
    pub mode: Mode,

    /// Output file (graph mode default: bacteria_network.html; list mode default: stdout)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatcherKind {
    /// Fixed list of bacterial genera
    Dictionary,
    /// Named-entity recognizer filtered by category
    Ner,
}

impl MatcherKind {
    pub fn build(self, lexicon: Option<&Path>) -> Box<dyn EntityMatcher> {
        match self {
            MatcherKind::Dictionary => Box::new(DictionaryMatcher::new()),
            MatcherKind::Ner => Box::new(NerMatcher::new(LexiconRecognizer::shared(lexicon))),
        }
    }
}
