use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;

use crate::errors::BayesianError;
use crate::utils::{unique_tokens, Indexer};

/// Counting mode.
///
/// The mode is fixed when a [`Model`] is created and is applied both when learning documents and
/// when classifying queries.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum CountingMode {
    /// Every occurrence of a token in a document is counted.
    #[default]
    TermFrequency = 1,

    /// Each distinct token is counted once per document.
    BooleanPresence = 2,
}

impl CountingMode {
    /// Returns the tokens that are counted under this mode.
    pub(crate) fn effective_tokens<S>(self, tokens: &[S]) -> Vec<&str>
    where
        S: AsRef<str>,
    {
        match self {
            Self::TermFrequency => tokens.iter().map(|token| token.as_ref()).collect(),
            Self::BooleanPresence => unique_tokens(tokens),
        }
    }
}

impl TryFrom<u8> for CountingMode {
    type Error = BayesianError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            1 => Ok(Self::TermFrequency),
            2 => Ok(Self::BooleanPresence),
            _ => Err(BayesianError::invalid_model(format!(
                "unknown counting mode tag: {}",
                tag
            ))),
        }
    }
}

impl FromStr for CountingMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" | "tf" | "term-frequency" => Ok(Self::TermFrequency),
            "2" | "bool" | "boolean" | "boolean-presence" => Ok(Self::BooleanPresence),
            _ => Err("Unsupported counting mode."),
        }
    }
}

impl fmt::Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TermFrequency => write!(f, "term-frequency"),
            Self::BooleanPresence => write!(f, "boolean-presence"),
        }
    }
}

/// Statistics learned for a single class.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClassStats {
    pub(crate) n_documents: u64,
    pub(crate) n_tokens: u64,
    pub(crate) log_prior: f64,
}

impl ClassStats {
    /// Gets the number of documents labeled with the class.
    pub const fn n_documents(&self) -> u64 {
        self.n_documents
    }

    /// Gets the number of token occurrences counted for the class.
    pub const fn n_tokens(&self) -> u64 {
        self.n_tokens
    }

    /// Gets the natural-log prior probability of the class.
    pub const fn log_prior(&self) -> f64 {
        self.log_prior
    }
}

/// Model data.
///
/// A model starts empty and only grows: [`Model::learn()`] adds documents, and nothing ever
/// removes tokens or classes. Classes are kept in the order they were first learned.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    pub(crate) mode: CountingMode,
    pub(crate) classes: Indexer<String>,
    // Indexed by class ID.
    pub(crate) class_stats: Vec<ClassStats>,
    // token -> class ID -> count. Zero counts are never stored.
    pub(crate) token_counts: HashMap<String, HashMap<usize, u64>>,
    pub(crate) n_documents: u64,
}

impl Model {
    /// Creates an empty model.
    ///
    /// # Arguments
    ///
    /// * `mode` - The counting mode used for the whole lifetime of the model.
    ///
    /// # Returns
    ///
    /// A model without any class or token.
    pub fn new(mode: CountingMode) -> Self {
        Self {
            mode,
            classes: Indexer::new(),
            class_stats: vec![],
            token_counts: HashMap::new(),
            n_documents: 0,
        }
    }

    /// Gets the counting mode.
    pub const fn mode(&self) -> CountingMode {
        self.mode
    }

    /// Gets the number of documents learned so far.
    pub const fn n_documents(&self) -> u64 {
        self.n_documents
    }

    /// Gets the number of distinct tokens learned so far.
    pub fn n_vocabulary(&self) -> usize {
        self.token_counts.len()
    }

    /// Gets the number of known classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no document has been learned.
    pub const fn is_empty(&self) -> bool {
        self.n_documents == 0
    }

    /// Iterates over the known classes in the order they were first learned.
    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().iter().map(String::as_str)
    }

    /// Iterates over the learned tokens in arbitrary order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> + '_ {
        self.token_counts.keys().map(String::as_str)
    }

    /// Gets the statistics of a class, or `None` if the class is unknown.
    pub fn class_stats(&self, class: &str) -> Option<&ClassStats> {
        self.classes
            .find_id(class)
            .map(|class_id| &self.class_stats[class_id])
    }

    /// Gets the natural-log prior probability of a class, or `None` if the class is unknown.
    pub fn prior(&self, class: &str) -> Option<f64> {
        self.class_stats(class).map(ClassStats::log_prior)
    }

    /// Gets how many times `token` was counted under `class`.
    ///
    /// Unknown tokens and classes count as zero.
    pub fn token_count(&self, token: &str, class: &str) -> u64 {
        self.classes
            .find_id(class)
            .and_then(|class_id| self.token_counts.get(token)?.get(&class_id))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(CountingMode::default())
    }
}
