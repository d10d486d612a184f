use super::{EntityMatcher, EntityMention, MentionTable, split_sentences};

/// Genus-level bacterial taxa commonly reported in microbiome studies.
pub const TAXA: &[&str] = &[
    "akkermansia",
    "alistipes",
    "anaerostipes",
    "bacteroides",
    "bifidobacterium",
    "bilophila",
    "blautia",
    "butyricicoccus",
    "campylobacter",
    "christensenella",
    "citrobacter",
    "clostridium",
    "collinsella",
    "coprococcus",
    "desulfovibrio",
    "dialister",
    "dorea",
    "eggerthella",
    "enterobacter",
    "enterococcus",
    "escherichia",
    "eubacterium",
    "faecalibacterium",
    "fusobacterium",
    "gardnerella",
    "haemophilus",
    "helicobacter",
    "klebsiella",
    "lachnospira",
    "lactobacillus",
    "lactococcus",
    "megamonas",
    "megasphaera",
    "neisseria",
    "odoribacter",
    "oscillospira",
    "parabacteroides",
    "phascolarctobacterium",
    "porphyromonas",
    "prevotella",
    "roseburia",
    "rothia",
    "ruminococcus",
    "salmonella",
    "shigella",
    "sneathia",
    "staphylococcus",
    "streptococcus",
    "sutterella",
    "veillonella",
];

/// Fixed-vocabulary matcher over [`TAXA`].
///
/// Counts are whole-document substring counts, independent of sentence
/// boundaries, so a taxon can have a count with no sentence evidence.
pub struct DictionaryMatcher {
    taxa: &'static [&'static str],
}

impl DictionaryMatcher {
    pub fn new() -> Self {
        Self { taxa: TAXA }
    }
}

impl Default for DictionaryMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityMatcher for DictionaryMatcher {
    fn scan(&self, text: &str) -> Vec<EntityMention> {
        let mut table = MentionTable::default();

        for sentence in split_sentences(text) {
            let lower = sentence.to_lowercase();
            for taxon in self.taxa.iter().filter(|t| lower.contains(*t)) {
                table.add_sentence(taxon, sentence);
            }
        }

        let lower = text.to_lowercase();
        for taxon in self.taxa {
            let count = lower.matches(taxon).count();
            if count > 0 {
                table.entry(taxon).count = count;
            }
        }

        table.into_mentions()
    }
}
