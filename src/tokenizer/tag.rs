//! A dictionary of word forms. Tags tokens and synthesizes inflections.

use crate::lang::Synthesizer;
use crate::types::Reading;
use crate::utils::{self, regex::SerializeRegex};
use crate::Error;
use fnv::FnvHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead};

/// Maps words to readings and lemmas to the words inflected from them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Tagger {
    tags: FnvHashMap<String, Vec<Reading>>,
    groups: FnvHashMap<String, Vec<(String, String)>>,
}

impl Tagger {
    /// Builds a tagger from `(word, lemma, tag)` triples.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut tagger = Tagger::default();
        for (word, lemma, tag) in entries {
            tagger.add(word, lemma, tag);
        }
        tagger
    }

    /// Reads a dump of tab-separated `word\tlemma\ttag` lines. Lines starting with `#` are ignored.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut tagger = Tagger::default();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let parts: Vec<_> = line.split('\t').collect();
            if parts.len() != 3 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "line {}: expected 3 tab-separated fields, got {}",
                        number + 1,
                        parts.len()
                    ),
                )
                .into());
            }

            tagger.add(parts[0], parts[1], parts[2]);
        }

        Ok(tagger)
    }

    pub fn add<S: Into<String>>(&mut self, word: S, lemma: S, tag: S) {
        let word = word.into();
        let lemma = lemma.into();
        let tag = tag.into();

        let group = self.groups.entry(lemma.clone()).or_insert_with(Vec::new);
        let member = (word.clone(), tag.clone());
        if !group.contains(&member) {
            group.push(member);
        }

        let reading = Reading::new(lemma, tag);
        let readings = self.tags.entry(word).or_insert_with(Vec::new);
        if !readings.contains(&reading) {
            readings.push(reading);
        }
    }

    /// Gets the readings of a word.
    /// Title and upper case words also get the readings of their lowercase form.
    pub fn get_tags(&self, word: &str) -> Vec<Reading> {
        let mut tags = self.tags.get(word).cloned().unwrap_or_else(Vec::new);
        let lower = word.to_lowercase();

        if word != lower && (utils::is_title_case(word) || utils::is_uppercase(word)) {
            for reading in self.tags.get(&lower).into_iter().flatten() {
                if !tags.contains(reading) {
                    tags.push(reading.clone());
                }
            }
        }

        tags
    }

    pub fn is_known(&self, word: &str) -> bool {
        !self.get_tags(word).is_empty()
    }
}

impl Synthesizer for Tagger {
    fn synthesize(&self, lemma: &str, pos_pattern: &str) -> io::Result<Vec<String>> {
        let regex = SerializeRegex::new(pos_pattern, true, true)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;

        Ok(self
            .groups
            .get(lemma)
            .map(|group| {
                group
                    .iter()
                    .filter(|(_, tag)| regex.is_match(tag))
                    .map(|(word, _)| word.clone())
                    .unique()
                    .collect()
            })
            .unwrap_or_else(Vec::new))
    }
}
