//! Agreement of morphological features across pattern elements.
//!
//! A language declares *equivalences*: for a feature such as `number`, each type (`sg`, `pl`)
//! is a predicate over a reading. Elements taking part in unification must share at least one
//! type of every feature they name.

use super::pattern::{PredicateSpec, Resolved, TokenPredicate};
use crate::types::Reading;
use crate::Error;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Feature -> type -> predicate.
#[derive(Debug, Clone, Default)]
pub struct UnifierConfig {
    equivalences: IndexMap<String, IndexMap<String, TokenPredicate>>,
}

impl UnifierConfig {
    /// Declares that readings matching `predicate` have type `kind` of `feature`.
    ///
    /// # Errors
    /// If the predicate does not compile.
    pub fn add_equivalence<F: Into<String>, T: Into<String>>(
        &mut self,
        feature: F,
        kind: T,
        predicate: PredicateSpec,
    ) -> Result<(), Error> {
        let predicate = TokenPredicate::compile_plain(predicate, "equivalence")?;
        self.equivalences
            .entry(feature.into())
            .or_insert_with(IndexMap::new)
            .insert(kind.into(), predicate);
        Ok(())
    }

    pub fn with_equivalence<F: Into<String>, T: Into<String>>(
        mut self,
        feature: F,
        kind: T,
        predicate: PredicateSpec,
    ) -> Result<Self, Error> {
        self.add_equivalence(feature, kind, predicate)?;
        Ok(self)
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.equivalences.contains_key(feature)
    }

    fn satisfied_types(
        &self,
        feature: &str,
        restriction: &[String],
        text: &str,
        reading: &Reading,
    ) -> IndexSet<String> {
        let resolved = Resolved::default();

        self.equivalences
            .get(feature)
            .map(|types| {
                types
                    .iter()
                    .filter(|(kind, _)| restriction.is_empty() || restriction.contains(kind))
                    .filter(|(_, predicate)| predicate.is_match(text, reading, &resolved))
                    .map(|(kind, _)| kind.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// How one element takes part in unification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unification {
    /// Feature -> types to consider. No types means all declared types.
    pub features: IndexMap<String, Vec<String>>,
    /// Inverts the verdict: the elements must *not* agree.
    pub negate: bool,
    /// The element at which the verdict is taken.
    pub last: bool,
}

impl Unification {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Unification {
            features: features
                .into_iter()
                .map(|x| (x.into(), Vec::new()))
                .collect(),
            negate: false,
            last: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }

    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }
}

/// Scratch state of one unification run. Owned by a matcher, never shared.
#[derive(Debug)]
pub struct Unifier<'a> {
    config: &'a UnifierConfig,
    /// Types every unified token so far agrees on.
    running: IndexMap<String, IndexSet<String>>,
    token_types: IndexMap<String, IndexSet<String>>,
    token_readings: Vec<Reading>,
    in_unification: bool,
    unified: Vec<Vec<Reading>>,
}

impl<'a> Unifier<'a> {
    pub fn new(config: &'a UnifierConfig) -> Self {
        Unifier {
            config,
            running: IndexMap::new(),
            token_types: IndexMap::new(),
            token_readings: Vec::new(),
            in_unification: false,
            unified: Vec::new(),
        }
    }

    /// Starts a new unification scope.
    pub fn reset(&mut self) {
        self.running.clear();
        self.token_types.clear();
        self.token_readings.clear();
        self.in_unification = false;
        self.unified.clear();
    }

    /// Feeds one reading of the current token. Returns whether the token still agrees with
    /// the tokens before it. The token is finalized on its last reading.
    pub fn is_unified(
        &mut self,
        text: &str,
        reading: &Reading,
        features: &IndexMap<String, Vec<String>>,
        matched: bool,
        last_reading: bool,
    ) -> bool {
        let mut satisfied = IndexMap::new();
        for (feature, restriction) in features {
            let mut types = self.config.satisfied_types(feature, restriction, text, reading);
            if self.in_unification {
                let running = self.running.get(feature);
                types.retain(|kind| running.map_or(false, |x| x.contains(kind)));
            }
            satisfied.insert(feature.clone(), types);
        }

        let reading_ok =
            !satisfied.is_empty() && satisfied.values().all(|types| !types.is_empty());
        if reading_ok && matched {
            for (feature, types) in satisfied {
                self.token_types
                    .entry(feature)
                    .or_insert_with(IndexSet::new)
                    .extend(types);
            }
            self.token_readings.push(reading.clone());
        }

        let token_ok = !self.in_unification
            || (!features.is_empty()
                && features.keys().all(|feature| {
                    self.token_types
                        .get(feature)
                        .map_or(false, |types| !types.is_empty())
                }));

        if last_reading {
            self.running = std::mem::take(&mut self.token_types);
            if !self.token_readings.is_empty() {
                self.unified.push(std::mem::take(&mut self.token_readings));
            }
            self.in_unification = true;
        }

        token_ok
    }

    /// The readings of each unified token which survived the intersection.
    pub fn final_unified(&self) -> &[Vec<Reading>] {
        &self.unified
    }
}
