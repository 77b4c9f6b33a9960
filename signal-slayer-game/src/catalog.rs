//! Rail-line signal catalog: the ordered correct aspects and the decoy pool per line.
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Opaque identifier for a rail line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

impl LineId {
    /// Construct an identifier, trimming surrounding whitespace.
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LineId {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl Borrow<str> for LineId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Read-only source of signal names per rail line.
pub trait SignalCatalog {
    /// Ordered correct signals for the line, or `None` when the line is unknown.
    fn correct_sequence(&self, line: &LineId) -> Option<&[String]>;

    /// Decoy pool for the line, or `None` when the line is unknown.
    fn incorrect_pool(&self, line: &LineId) -> Option<&[String]>;

    /// Every line the catalog can serve, in a stable order.
    fn lines(&self) -> Vec<LineId>;

    /// Length of the ordered sequence for the line.
    fn sequence_len(&self, line: &LineId) -> Option<usize> {
        self.correct_sequence(line).map(<[String]>::len)
    }
}

/// Signal data for one rail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LineSignals {
    pub correct: Vec<String>,
    #[serde(default)]
    pub incorrect: Vec<String>,
}

impl LineSignals {
    #[must_use]
    pub fn new<I, J, S, T>(correct: I, incorrect: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut signals = Self {
            correct: correct.into_iter().map(Into::into).collect(),
            incorrect: incorrect.into_iter().map(Into::into).collect(),
        };
        signals.normalize();
        signals
    }

    /// Trim names and collapse the decoy pool to set semantics, keeping first-seen order.
    fn normalize(&mut self) {
        for name in &mut self.correct {
            *name = name.trim().to_string();
        }
        let mut seen = BTreeSet::new();
        self.incorrect = self
            .incorrect
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    lines: BTreeMap<LineId, LineSignals>,
}

/// In-memory catalog backed by JSON data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticCatalog {
    lines: BTreeMap<LineId, LineSignals>,
}

impl StaticCatalog {
    /// Create an empty catalog (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into catalog data.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::from_lines(file.lines))
    }

    /// The catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled data fails to parse.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../data/lines.json"))
    }

    #[must_use]
    pub fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = (L, LineSignals)>,
        L: Into<LineId>,
    {
        let mut catalog = Self::empty();
        for (line, signals) in lines {
            catalog.insert_line(line, signals);
        }
        catalog
    }

    /// Insert or replace a line.
    pub fn insert_line(&mut self, line: impl Into<LineId>, mut signals: LineSignals) {
        signals.normalize();
        self.lines.insert(line.into(), signals);
    }

    #[must_use]
    pub fn line(&self, line: &str) -> Option<&LineSignals> {
        self.lines.get(line)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Serialize the catalog back into its JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            lines: self.lines.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }
}

impl SignalCatalog for StaticCatalog {
    fn correct_sequence(&self, line: &LineId) -> Option<&[String]> {
        self.lines.get(line).map(|signals| signals.correct.as_slice())
    }

    fn incorrect_pool(&self, line: &LineId) -> Option<&[String]> {
        self.lines.get(line).map(|signals| signals.incorrect.as_slice())
    }

    fn lines(&self) -> Vec<LineId> {
        self.lines.keys().cloned().collect()
    }
}

/// Platform seam for supplying a catalog from an external source.
pub trait CatalogLoader {
    type Catalog: SignalCatalog;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Self::Catalog, Self::Error>;
}

/// Loader that serves the catalog bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLoader;

impl CatalogLoader for BundledLoader {
    type Catalog = StaticCatalog;
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<StaticCatalog, CatalogError> {
        StaticCatalog::bundled()
    }
}

/// Errors raised when a line cannot back a fair round.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("rail line `{0}` is not in the signal catalog")]
    UnknownLine(LineId),
    #[error("rail line `{0}` has no correct signals")]
    EmptySequence(LineId),
    #[error(
        "rail line `{line}` offers {available} decoys at position {index} but {needed} are needed"
    )]
    InsufficientDecoys {
        line: LineId,
        index: usize,
        needed: usize,
        available: usize,
    },
    #[error("catalog data is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Distinct pool names that may stand beside `correct` in a row, in pool order.
#[must_use]
pub fn usable_decoys<'a>(pool: &'a [String], correct: &str) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    pool.iter()
        .map(String::as_str)
        .filter(|name| *name != correct && seen.insert(*name))
        .collect()
}

/// Check that `line` can fill every row of its sequence with distinct decoys.
///
/// Returns the sequence length on success.
///
/// # Errors
///
/// Returns [`CatalogError`] when the line is unknown, has no sequence, or any
/// position lacks `lane_count - 1` usable decoys.
pub fn validate_line<C>(catalog: &C, line: &LineId, lane_count: usize) -> Result<usize, CatalogError>
where
    C: SignalCatalog + ?Sized,
{
    let (Some(sequence), Some(pool)) = (catalog.correct_sequence(line), catalog.incorrect_pool(line))
    else {
        return Err(CatalogError::UnknownLine(line.clone()));
    };
    if sequence.is_empty() {
        return Err(CatalogError::EmptySequence(line.clone()));
    }
    let needed = lane_count.saturating_sub(1);
    for (index, correct) in sequence.iter().enumerate() {
        let available = usable_decoys(pool, correct).len();
        if available < needed {
            return Err(CatalogError::InsufficientDecoys {
                line: line.clone(),
                index,
                needed,
                available,
            });
        }
    }
    Ok(sequence.len())
}
