//! Knowledge base corpus.
//!
//! The corpus is the ordered, immutable list of passages answers are grounded
//! on. It comes either from the built-in TH OWL passages or from a YAML/JSON
//! file:
//!
//! ```yaml
//! domain: the M.Sc. Information Technology program at TH OWL
//! passages:
//!   - The program can also be pursued part-time.
//!   - id: fees
//!     text: There are no tuition fees.
//! ```

use crate::context::BLOCK_SEPARATOR;
use crate::types::Passage;
use kbqa_core::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;

/// Domain label of the built-in knowledge base.
pub const TH_OWL_DOMAIN: &str = "the M.Sc. Information Technology program at TH OWL";

const TH_OWL_PASSAGES: &[&str] = &[
    "The Master of Science in Information Technology program at TH OWL is a full-time, non-restricted degree taught in English at the Innovation Campus in Lemgo.",
    "The standard duration of the program is four semesters, and there are no tuition fees.",
    "The program can also be pursued part-time.",
    "To be admitted, applicants must have a bachelor's or comparable degree in a related field such as electrical engineering, information technology, computer science, or mechatronics, with a final grade of 2.5 (German) or better.",
    "Proof of English language proficiency at level B2 of the CEFR is required for admission.",
    "Non-EU applicants who have not earned their degree in a country belonging to the Bologna signatory states must also provide a Graduate Record Examination (GRE) or Graduate Aptitude Test in Engineering (GATE) score.",
    "Required application documents include the bachelor's certificate, proof of English skills, and a letter of motivation.",
    "The program starts in both the summer and winter semesters.",
    "The curriculum is structured over four semesters.",
    "The first semester includes advanced topics in algorithms, probability and statistics, and management skills.",
    "The second semester focuses on innovation and development strategies and a compulsory elective module.",
    "The third semester is dedicated to a research project, while the fourth semester is for the master's thesis and colloquium.",
    "The program aims to provide students with expertise in intelligent technical systems, business and academic knowledge, and current topics like artificial intelligence.",
    "Graduates are prepared for management positions in international technology companies.",
];

/// Ordered list of passages plus the domain they describe, if named.
#[derive(Debug, Clone)]
pub struct Corpus {
    domain: Option<String>,
    passages: Vec<Passage>,
}

#[derive(Deserialize)]
struct CorpusFile {
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    passages: Vec<PassageEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PassageEntry {
    Text(String),
    Identified { id: String, text: String },
}

impl Corpus {
    /// Build a corpus from plain texts. Ids default to `kb-<index>`.
    ///
    /// # Errors
    /// Fails on a blank passage or one containing the context block
    /// separator. An empty list is accepted here; the indexer refuses it.
    pub fn from_texts<I, S>(texts: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(None, texts.into_iter().map(|t| (None, t.into())))
    }

    /// Name the domain this corpus describes.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    fn from_entries<I>(domain: Option<String>, entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (Option<String>, String)>,
    {
        let mut passages = Vec::new();

        for (index, (id, text)) in entries.into_iter().enumerate() {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(AppError::Knowledge(format!(
                    "Passage {} is empty",
                    index
                )));
            }
            if text.contains(BLOCK_SEPARATOR) {
                return Err(AppError::Knowledge(format!(
                    "Passage {} contains the context block separator {:?}",
                    index, BLOCK_SEPARATOR
                )));
            }

            let id = match id {
                Some(id) if !id.trim().is_empty() => id.trim().to_string(),
                Some(_) => {
                    return Err(AppError::Knowledge(format!(
                        "Passage {} has an empty id",
                        index
                    )))
                }
                None => format!("kb-{}", index),
            };

            if passages.iter().any(|p: &Passage| p.id == id) {
                return Err(AppError::Knowledge(format!("Duplicate passage id: {}", id)));
            }

            passages.push(Passage { id, index, text });
        }

        Ok(Self { domain, passages })
    }

    /// The built-in TH OWL knowledge base.
    pub fn builtin() -> Self {
        Self {
            domain: Some(TH_OWL_DOMAIN.to_string()),
            passages: TH_OWL_PASSAGES
                .iter()
                .enumerate()
                .map(|(index, text)| Passage {
                    id: format!("kb-{}", index),
                    index,
                    text: (*text).to_string(),
                })
                .collect(),
        }
    }

    /// The domain label, when the corpus names one. Otherwise the prompt's
    /// own domain applies.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn get(&self, index: usize) -> Option<&Passage> {
        self.passages.get(index)
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Passage> {
        self.passages.iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Passage;
    type IntoIter = std::slice::Iter<'a, Passage>;

    fn into_iter(self) -> Self::IntoIter {
        self.passages.iter()
    }
}

/// Load the corpus from `path`, or the built-in one when `path` is `None`.
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML. A
/// file without `domain` leaves the corpus unnamed.
pub fn load_corpus(path: Option<&Path>) -> AppResult<Corpus> {
    let Some(path) = path else {
        tracing::debug!("Using built-in corpus");
        return Ok(Corpus::builtin());
    };

    if !path.exists() {
        return Err(AppError::Knowledge(format!(
            "Corpus file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let file: CorpusFile = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let corpus = Corpus::from_entries(
        file.domain.filter(|d| !d.trim().is_empty()),
        file.passages.into_iter().map(|entry| match entry {
            PassageEntry::Text(text) => (None, text),
            PassageEntry::Identified { id, text } => (Some(id), text),
        }),
    )?;

    tracing::debug!(
        "Loaded {} passages from {}",
        corpus.len(),
        path.display()
    );

    Ok(corpus)
}
