use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{EngineError, EngineResult};

/// Untrusted term/definition pair as it arrives from a game record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPair {
    pub term: String,
    pub definition: String,
}

impl RawPair {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// One matchable unit. Both sides are trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    term: String,
    definition: String,
}

impl Pair {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }
}

/// Validated, immutable, ordered collection of pairs for one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSet {
    pairs: Vec<Pair>,
}

impl PairSet {
    /// Validate raw pairs. Fails when the input is empty, when a side is
    /// blank after trimming, or when a term appears twice.
    pub fn create(raw: &[RawPair]) -> EngineResult<Self> {
        if raw.is_empty() {
            return Err(EngineError::validation("a game needs at least one pair"));
        }

        let mut seen = HashSet::with_capacity(raw.len());
        let mut pairs = Vec::with_capacity(raw.len());

        for (idx, p) in raw.iter().enumerate() {
            let term = p.term.trim();
            let definition = p.definition.trim();

            if term.is_empty() {
                return Err(EngineError::validation(format!("pair {} has an empty term", idx + 1)));
            }
            if definition.is_empty() {
                return Err(EngineError::validation(format!(
                    "pair {} has an empty definition",
                    idx + 1
                )));
            }
            if !seen.insert(term) {
                return Err(EngineError::validation(format!("duplicate term '{term}'")));
            }

            pairs.push(Pair {
                term: term.to_string(),
                definition: definition.to_string(),
            });
        }

        Ok(Self { pairs })
    }

    pub fn size(&self) -> usize {
        self.pairs.len()
    }

    pub fn at(&self, index: usize) -> EngineResult<&Pair> {
        self.pairs.get(index).ok_or(EngineError::Index {
            index,
            len: self.pairs.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }

    /// Convert back to the serialisable form, e.g. for saving
    pub fn to_raw(&self) -> Vec<RawPair> {
        self.pairs
            .iter()
            .map(|p| RawPair::new(p.term.clone(), p.definition.clone()))
            .collect()
    }
}
