//! The language handle every rule borrows.
//! Holds the synthesizer, dictionary, unifier equivalences and filters.

use crate::filter::RuleFilter;
use crate::rule::unify::UnifierConfig;
use crate::tokenizer::tag::Tagger;
use crate::Error;
use derivative::Derivative;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{io, sync::Arc};

/// Produces inflected forms of a lemma.
pub trait Synthesizer: Send + Sync {
    /// Returns all forms of `lemma` whose POS tag fully matches the regex `pos_pattern`.
    fn synthesize(&self, lemma: &str, pos_pattern: &str) -> io::Result<Vec<String>>;
}

/// Options of a language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageOptions {
    /// Inserted between tokens when a match operator spans several tokens.
    /// Empty for languages without spaces between words.
    pub word_separator: String,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        LanguageOptions {
            word_separator: " ".into(),
        }
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Language {
    code: String,
    options: LanguageOptions,
    #[derivative(Debug = "ignore")]
    synthesizer: Arc<dyn Synthesizer>,
    tagger: Option<Arc<Tagger>>,
    unifier: UnifierConfig,
    #[derivative(Debug = "ignore")]
    filters: IndexMap<String, Arc<dyn RuleFilter>>,
}

impl Language {
    /// A language without dictionary: synthesis yields no forms.
    pub fn new<S: Into<String>>(code: S) -> Self {
        Language {
            code: code.into(),
            options: LanguageOptions::default(),
            synthesizer: Arc::new(Tagger::default()),
            tagger: None,
            unifier: UnifierConfig::default(),
            filters: IndexMap::new(),
        }
    }

    pub fn with_options(mut self, options: LanguageOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses the dictionary both to synthesize and to validate the spelling of suggestions.
    pub fn with_tagger(mut self, tagger: Arc<Tagger>) -> Self {
        self.synthesizer = tagger.clone();
        self.tagger = Some(tagger);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn Synthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_unifier(mut self, unifier: UnifierConfig) -> Self {
        self.unifier = unifier;
        self
    }

    /// Registers a filter rules can refer to by `id`.
    pub fn with_filter<S: Into<String>>(mut self, id: S, filter: Arc<dyn RuleFilter>) -> Self {
        self.filters.insert(id.into(), filter);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn options(&self) -> &LanguageOptions {
        &self.options
    }

    pub fn tagger(&self) -> Option<&Arc<Tagger>> {
        self.tagger.as_ref()
    }

    pub fn unifier(&self) -> &UnifierConfig {
        &self.unifier
    }

    pub(crate) fn filter(&self, id: &str) -> Option<&Arc<dyn RuleFilter>> {
        self.filters.get(id)
    }

    pub(crate) fn synthesize(&self, lemma: &str, pos_pattern: &str) -> Result<Vec<String>, Error> {
        self.synthesizer
            .synthesize(lemma, pos_pattern)
            .map_err(|source| Error::Synthesis {
                lemma: lemma.to_string(),
                source,
            })
    }

    /// Without a dictionary every word counts as correctly spelled.
    pub(crate) fn is_known_word(&self, word: &str) -> bool {
        self.tagger
            .as_ref()
            .map_or(true, |tagger| tagger.is_known(word))
    }
}
