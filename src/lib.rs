//! Declarative pattern rules for finding errors in natural-language text.
//! # Overview
//!
//! patternrule has the following core abstractions:
//! - A [Sentence][types::Sentence] of [Token][types::Token]s, each with one or more
//!   [Reading][types::Reading]s (lemma and part-of-speech tag). A small
//!   [Tokenizer][tokenizer::Tokenizer] is included, but tokens can come from anywhere.
//! - A [Language][lang::Language] which provides the synthesizer, unification features and
//!   filters rules use.
//! - A [PatternRule][rule::PatternRule]: a sequence of
//!   [PatternToken][rule::pattern::PatternToken]s with optional and repeated elements, skips,
//!   exceptions, back-references and unification, plus message and suggestion templates.
//!   Rules are built from serde-deserializable specs.
//! - A [Rules][rules::Rules] set to apply many rules at once.
//!
//! # Examples
//!
//! ```
//! use patternrule::lang::Language;
//! use patternrule::rule::{grammar::Match, pattern::PatternTokenSpec, PatternRuleSpec};
//! use patternrule::tokenizer::Tokenizer;
//! use std::sync::Arc;
//!
//! let language = Arc::new(Language::new("en"));
//! let rule = PatternRuleSpec::new(
//!     "DOUBLE_THE",
//!     vec![PatternTokenSpec::literal("the"), PatternTokenSpec::literal("the")],
//! )
//! .with_message("Remove one: <suggestion>\\1</suggestion>", vec![Match::surface()])
//! .compile(language)?;
//!
//! let sentence = Tokenizer::default().tokenize("Take the the bike.");
//! let matches = rule.apply(&sentence)?;
//!
//! assert_eq!(matches[0].span(), (5, 12));
//! assert_eq!(matches[0].suggestions(), &["the"]);
//! # Ok::<(), patternrule::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod filter;
pub mod lang;
pub mod rule;
pub mod rules;
pub mod tokenizer;
pub mod types;
pub(crate) mod utils;

pub use lang::{Language, LanguageOptions, Synthesizer};
pub use rule::{PatternRule, PatternRuleSpec, RuleMatch};
pub use rules::{Rules, RulesOptions};

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Regex(#[from] onig::Error),
    #[error(transparent)]
    IdError(#[from] rule::id::Error),
    /// A pattern element or rule violates its invariants.
    #[error("invalid rule: {0}")]
    InvalidSpec(String),
    /// The synthesizer failed. The rule can not be used for the sentence.
    #[error("synthesizing forms of \"{lemma}\" failed")]
    Synthesis {
        lemma: String,
        #[source]
        source: io::Error,
    },
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
}
