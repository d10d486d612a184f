//! Entity evidence extraction: text in, per-entity sentences and counts out.

mod dictionary;
mod lexicon;
mod ner;
mod sentences;

use std::collections::BTreeMap;

pub use dictionary::DictionaryMatcher;
pub use lexicon::LexiconRecognizer;
pub use ner::NerMatcher;
pub use sentences::split_sentences;

/// Evidence for one entity within one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    /// Lowercased surface form; the key within a paper.
    pub entity: String,
    pub sentences: Vec<String>,
    pub count: usize,
}

/// A strategy turning document text into entity evidence.
///
/// Implementations are stateless across calls: every paper starts fresh.
pub trait EntityMatcher {
    fn scan(&self, text: &str) -> Vec<EntityMention>;
}

/// Accumulates mentions keyed by lowercased entity, sorted on output.
#[derive(Default)]
struct MentionTable(BTreeMap<String, EntityMention>);

impl MentionTable {
    fn entry(&mut self, entity: &str) -> &mut EntityMention {
        self.0
            .entry(entity.to_string())
            .or_insert_with(|| EntityMention {
                entity: entity.to_string(),
                sentences: Vec::new(),
                count: 0,
            })
    }

    /// Append `sentence` unless it is already the entity's latest evidence.
    fn add_sentence(&mut self, entity: &str, sentence: &str) {
        let mention = self.entry(entity);
        if mention.sentences.last().map(String::as_str) != Some(sentence) {
            mention.sentences.push(sentence.to_string());
        }
    }

    fn into_mentions(self) -> Vec<EntityMention> {
        self.0
            .into_values()
            .filter(|m| m.count > 0 || !m.sentences.is_empty())
            .collect()
    }
}
