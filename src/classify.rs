//! Paper-level regulation cues and per-entity evidence buckets.

use std::collections::BTreeMap;

pub const UP_TERMS: [&str; 4] = ["upregulated", "increased", "elevated", "raised"];
pub const DOWN_TERMS: [&str; 4] = ["downregulated", "decreased", "reduced", "lowered"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regulation {
    Up,
    Down,
}

impl Regulation {
    pub fn label(self) -> &'static str {
        match self {
            Regulation::Up => "upregulated",
            Regulation::Down => "downregulated",
        }
    }
}

/// Classify a paper from its title + abstract.
///
/// Any up term wins, even when down terms are also present. This mirrors the
/// established behavior and is a known ambiguity, not a per-entity judgment.
pub fn classify(text: &str) -> Option<Regulation> {
    let lower = text.to_lowercase();
    if UP_TERMS.iter().any(|t| lower.contains(t)) {
        Some(Regulation::Up)
    } else if DOWN_TERMS.iter().any(|t| lower.contains(t)) {
        Some(Regulation::Down)
    } else {
        None
    }
}

/// Papers (by index into the report) supporting each direction for one entity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegulationBucket {
    pub up: Vec<usize>,
    pub down: Vec<usize>,
}

impl RegulationBucket {
    pub fn papers(&self, direction: Regulation) -> &[usize] {
        match direction {
            Regulation::Up => &self.up,
            Regulation::Down => &self.down,
        }
    }
}

/// Entity → bucket across the whole result set.
#[derive(Debug, Default)]
pub struct RegulationBuckets(BTreeMap<String, RegulationBucket>);

impl RegulationBuckets {
    /// Record `paper` as evidence for `entity`; repeated calls are no-ops.
    pub fn record(&mut self, entity: &str, paper: usize, direction: Regulation) {
        let bucket = self.0.entry(entity.to_lowercase()).or_default();
        let list = match direction {
            Regulation::Up => &mut bucket.up,
            Regulation::Down => &mut bucket.down,
        };
        if !list.contains(&paper) {
            list.push(paper);
        }
    }

    #[cfg(test)]
    pub fn get(&self, entity: &str) -> Option<&RegulationBucket> {
        self.0.get(entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegulationBucket)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
