//! Gazetteer recognizer: surface forms and labels loaded from a TSV file.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use tracing::{debug, info, warn};

use super::ner::{EntityRecognizer, RecognizedEntity};

/// Lexicon installed when the configured file is missing or unreadable.
const BUNDLED_LEXICON: &str = "\
# surface\tlabel
Firmicutes\tORG
Bacteroidetes\tORG
Proteobacteria\tORG
Actinobacteria\tORG
Verrucomicrobia\tORG
Fusobacteria\tORG
Akkermansia muciniphila\tORG
Faecalibacterium prausnitzii\tORG
Escherichia coli\tORG
Lactobacillus\tORG
Bifidobacterium\tTAXON
Bacteroides\tTAXON
Prevotella\tORG
Ruminococcus\tORG
Clostridium\tORG
Roseburia\tORG
Blautia\tORG
Streptococcus\tORG
Enterococcus\tORG
Veillonella\tORG
gut bacteria\tENTITY
commensal bacteria\tENTITY
Lachnospiraceae\tORG
Ruminococcaceae\tORG
Enterobacteriaceae\tENTITY
cortisol\tENTITY
hypothalamic-pituitary-adrenal axis\tENTITY
";

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("lexicon I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("lexicon line {line}: expected 'surface<TAB>LABEL', got '{content}'")]
    Malformed { line: usize, content: String },

    #[error("lexicon has no entries")]
    Empty,
}

struct Entry {
    /// ASCII-lowercased so byte offsets line up with the original sentence.
    needle: String,
    label: String,
}

/// Longest-match-first gazetteer over whole words.
pub struct LexiconRecognizer {
    entries: Vec<Entry>,
}

static SHARED: OnceLock<LexiconRecognizer> = OnceLock::new();

impl LexiconRecognizer {
    pub fn parse(source: &str) -> Result<Self, LexiconError> {
        let mut entries = Vec::new();
        for (i, raw) in source.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (surface, label) = line
                .split_once('\t')
                .map(|(s, l)| (s.trim(), l.trim()))
                .filter(|(s, l)| !s.is_empty() && !l.is_empty())
                .ok_or_else(|| LexiconError::Malformed {
                    line: i + 1,
                    content: line.to_string(),
                })?;
            entries.push(Entry {
                needle: surface.to_ascii_lowercase(),
                label: label.to_string(),
            });
        }
        if entries.is_empty() {
            return Err(LexiconError::Empty);
        }
        entries.sort_by(|a, b| b.needle.len().cmp(&a.needle.len()));
        Ok(Self { entries })
    }

    pub fn bundled() -> Self {
        Self::parse(BUNDLED_LEXICON).unwrap_or_else(|_| Self {
            entries: Vec::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Load `path`; on failure install the bundled lexicon there and load again.
    pub fn load_or_install(path: &Path) -> Result<Self, LexiconError> {
        match Self::load(path) {
            Ok(lexicon) => Ok(lexicon),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "lexicon unavailable, installing bundled copy");
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, BUNDLED_LEXICON)?;
                info!(path = %path.display(), "bundled lexicon installed");
                Self::load(path)
            }
        }
    }

    /// Process-wide recognizer, initialized on first use and read-only afterwards.
    ///
    /// Only the first caller's `path` is consulted.
    pub fn shared(path: Option<&Path>) -> &'static Self {
        SHARED.get_or_init(|| {
            let lexicon = match path {
                Some(p) => Self::load_or_install(p).unwrap_or_else(|e| {
                    warn!(error = %e, "falling back to in-memory bundled lexicon");
                    Self::bundled()
                }),
                None => Self::bundled(),
            };
            if lexicon.is_empty() {
                warn!("lexicon has no entries; the ner matcher will find nothing");
            } else {
                debug!(entries = lexicon.len(), "lexicon ready");
            }
            lexicon
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, sentence: &str) -> Vec<RecognizedEntity> {
        let haystack = sentence.to_ascii_lowercase();
        let mut spans: Vec<(usize, usize, &str)> = Vec::new();

        for entry in &self.entries {
            for (start, _) in haystack.match_indices(&entry.needle) {
                let end = start + entry.needle.len();
                if !is_word_boundary(&haystack, start, end) {
                    continue;
                }
                if spans.iter().any(|&(s, e, _)| start < e && s < end) {
                    continue;
                }
                spans.push((start, end, entry.label.as_str()));
            }
        }

        spans.sort_by_key(|&(start, _, _)| start);
        spans
            .into_iter()
            .map(|(start, end, label)| RecognizedEntity {
                text: sentence[start..end].to_string(),
                label: label.to_string(),
            })
            .collect()
    }
}

fn is_word_boundary(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
