//! Filters run on a finished match and may veto or rewrite it.

use crate::lang::Language;
use crate::rule::{Bindings, RuleMatch};
use crate::types::Token;
use crate::utils::regex::SerializeRegex;
use crate::Error;
use derivative::Derivative;
use enum_dispatch::enum_dispatch;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A filter as named by a rule: the filter id and its arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCall {
    pub id: String,
    #[serde(default)]
    pub args: IndexMap<String, String>,
}

impl FilterCall {
    pub fn new<S: Into<String>>(id: S) -> Self {
        FilterCall {
            id: id.into(),
            args: IndexMap::new(),
        }
    }

    pub fn with_arg<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    fn arg(&self, key: &str) -> Result<&str, Error> {
        self.args
            .get(key)
            .map(|x| x.as_str())
            .ok_or_else(|| Error::InvalidSpec(format!("filter {} needs argument {}", self.id, key)))
    }

    fn flag(&self, key: &str) -> bool {
        self.args.get(key).map_or(false, |x| x == "yes")
    }

    /// `no` counts elements from one.
    fn element(&self) -> Result<usize, Error> {
        let no = self.arg("no")?;
        match no.parse::<usize>() {
            Ok(no) if no >= 1 => Ok(no - 1),
            _ => Err(Error::InvalidSpec(format!(
                "filter {}: `no` must be a positive number, got {}",
                self.id, no
            ))),
        }
    }
}

/// A filter provided by the caller and registered on the [Language].
pub trait RuleFilter: Send + Sync {
    /// Gets the match, the matched tokens and the positions of the elements within them.
    /// Returns `None` to veto the match.
    fn accept(
        &self,
        args: &IndexMap<String, String>,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch>;
}

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum Filter {
    PosFilter,
    RegexFilter,
    CustomFilter,
}

#[enum_dispatch(Filter)]
pub trait Filterable {
    fn apply(
        &self,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch>;
}

impl Filter {
    /// Resolves a filter call. Filters registered on the language shadow the built-in ones.
    ///
    /// # Errors
    /// - If the id is neither registered nor built in.
    /// - If an argument is missing or invalid.
    pub fn from_call(call: &FilterCall, language: &Language) -> Result<Self, Error> {
        if let Some(filter) = language.filter(&call.id) {
            return Ok(CustomFilter {
                filter: filter.clone(),
                args: call.args.clone(),
            }
            .into());
        }

        Ok(match call.id.as_str() {
            "PosFilter" => PosFilter {
                element: call.element()?,
                regex: SerializeRegex::new(call.arg("postag_regexp")?, true, true)?,
                negate: call.flag("negate_postag"),
            }
            .into(),
            "RegexFilter" => RegexFilter {
                element: call.element()?,
                regex: SerializeRegex::new(call.arg("regexp")?, true, true)?,
                negate: call.flag("negate"),
            }
            .into(),
            _ => return Err(Error::UnknownFilter(call.id.clone())),
        })
    }
}

fn bound_token<'t>(
    tokens: &'t [Token],
    positions: &[usize],
    element: usize,
) -> Option<&'t Token> {
    Bindings::new(0, positions)
        .token_of(element)
        .and_then(|index| tokens.get(index))
}

/// Keeps the match iff the token bound to `element` has (or, negated, has not) a reading with
/// a matching tag.
#[derive(Debug, Clone)]
pub struct PosFilter {
    element: usize,
    regex: SerializeRegex,
    negate: bool,
}

impl Filterable for PosFilter {
    fn apply(
        &self,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch> {
        let found = bound_token(tokens, positions, self.element).map_or(false, |token| {
            token
                .readings()
                .iter()
                .filter_map(|x| x.pos())
                .any(|pos| self.regex.is_match(pos))
        });

        if found != self.negate {
            Some(rule_match)
        } else {
            None
        }
    }
}

/// Keeps the match iff the surface of the token bound to `element` matches (or, negated, does
/// not match).
#[derive(Debug, Clone)]
pub struct RegexFilter {
    element: usize,
    regex: SerializeRegex,
    negate: bool,
}

impl Filterable for RegexFilter {
    fn apply(
        &self,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch> {
        let found = bound_token(tokens, positions, self.element)
            .map_or(false, |token| self.regex.is_match(token.text()));

        if found != self.negate {
            Some(rule_match)
        } else {
            None
        }
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct CustomFilter {
    #[derivative(Debug = "ignore")]
    filter: Arc<dyn RuleFilter>,
    args: IndexMap<String, String>,
}

impl Filterable for CustomFilter {
    fn apply(
        &self,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch> {
        self.filter.accept(&self.args, rule_match, tokens, positions)
    }
}
