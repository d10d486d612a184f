use super::{EntityMatcher, EntityMention, MentionTable, split_sentences};

/// Entity categories retained regardless of surface text.
pub const ALLOWED_LABELS: [&str; 5] = ["ORG", "GPE", "LOC", "PERSON", "NORP"];
/// Surface substring that marks an entity as bacterial regardless of category.
const BACTERIA_MARKER: &str = "bact";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    pub text: String,
    pub label: String,
}

impl RecognizedEntity {
    fn qualifies(&self) -> bool {
        ALLOWED_LABELS.contains(&self.label.as_str())
            || self.text.to_lowercase().contains(BACTERIA_MARKER)
    }
}

/// A named-entity recognizer over a single sentence.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, sentence: &str) -> Vec<RecognizedEntity>;
}

/// Recognizer-backed matcher keeping entities in [`ALLOWED_LABELS`] or
/// whose text mentions bacteria.
pub struct NerMatcher<'r> {
    recognizer: &'r dyn EntityRecognizer,
}

impl<'r> NerMatcher<'r> {
    pub fn new(recognizer: &'r dyn EntityRecognizer) -> Self {
        Self { recognizer }
    }
}

impl EntityMatcher for NerMatcher<'_> {
    fn scan(&self, text: &str) -> Vec<EntityMention> {
        let mut table = MentionTable::default();

        for sentence in split_sentences(text) {
            for entity in self
                .recognizer
                .recognize(sentence)
                .into_iter()
                .filter(RecognizedEntity::qualifies)
            {
                let key = entity.text.to_lowercase();
                table.add_sentence(&key, sentence);
                table.entry(&key).count += 1;
            }
        }

        table.into_mentions()
    }
}
