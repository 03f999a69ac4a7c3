//! Pattern rules: compiled patterns, the matches they produce and how matches are formatted.

pub mod engine;
pub mod format;
pub mod grammar;
pub mod id;
pub mod pattern;
pub mod unify;

use crate::filter::{Filter, FilterCall, Filterable};
use crate::lang::Language;
use crate::types::{Sentence, Token};
use crate::utils;
use crate::Error;
use derivative::Derivative;
use engine::RuleMatcher;
use format::{FormatContext, Template};
use grammar::Match;
use id::Category;
use log::{debug, trace, warn};
use pattern::{PatternToken, PatternTokenSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The tokens bound by a (possibly partial) match.
///
/// `positions[e]` is the number of tokens element `e` advanced the match by, `0` if the element is
/// optional and absent. The token bound to `e` is the *last* token it consumed.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    first: usize,
    positions: &'a [usize],
}

impl<'a> Bindings<'a> {
    pub fn new(first: usize, positions: &'a [usize]) -> Self {
        Bindings { first, positions }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn positions(&self) -> &'a [usize] {
        self.positions
    }

    /// Index of the token bound to `element`. `None` if the element is absent or not bound yet.
    pub fn token_of(&self, element: usize) -> Option<usize> {
        match self.positions.get(element) {
            Some(0) | None => None,
            Some(_) => {
                let offset: usize = self.positions[..=element].iter().sum();
                Some(self.first + offset - 1)
            }
        }
    }

    /// Distance from the token bound to `element` to the token bound to the element after it.
    pub fn distance_to_next(&self, element: usize) -> usize {
        self.positions.get(element + 1).copied().unwrap_or(0)
    }
}

/// A complete match of all pattern elements, before formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct OuterMatch {
    pub(crate) first_token: usize,
    pub(crate) last_token: usize,
    pub(crate) first_marker: Option<usize>,
    pub(crate) last_marker: Option<usize>,
    pub(crate) positions: Vec<usize>,
}

impl OuterMatch {
    pub fn new(first_token: usize, last_token: usize, positions: Vec<usize>) -> Self {
        OuterMatch {
            first_token,
            last_token,
            first_marker: None,
            last_marker: None,
            positions,
        }
    }

    pub fn with_markers(mut self, first_marker: Option<usize>, last_marker: Option<usize>) -> Self {
        self.first_marker = first_marker;
        self.last_marker = last_marker;
        self
    }

    pub fn first_token(&self) -> usize {
        self.first_token
    }

    pub fn last_token(&self) -> usize {
        self.last_token
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn bindings(&self) -> Bindings<'_> {
        Bindings::new(self.first_token, &self.positions)
    }
}

/// An error found by a rule. Positions are character offsets in the sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub(crate) rule_id: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) message: String,
    pub(crate) short_message: String,
    pub(crate) suggestions: Vec<String>,
    pub(crate) suggestion_output: Option<String>,
}

impl RuleMatch {
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        &self.short_message
    }

    /// Replacements for the text in the span, best first.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn suggestion_output(&self) -> Option<&str> {
        self.suggestion_output.as_deref()
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = message.into();
        self
    }

    /// Shift the span right by `offset` characters.
    pub fn rshift(&mut self, offset: usize) {
        self.start += offset;
        self.end += offset;
    }
}

/// Message, short message and suggestions of a match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formatted {
    pub(crate) message: String,
    pub(crate) short_message: String,
    pub(crate) suggestions: Vec<String>,
    pub(crate) suggestion_output: Option<String>,
    pub(crate) starts_with_comma: bool,
}

impl Formatted {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn short_message(&self) -> &str {
        &self.short_message
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn suggestion_output(&self) -> Option<&str> {
        self.suggestion_output.as_deref()
    }
}

/// Everything needed to [compile][PatternRuleSpec::compile] a [PatternRule].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternRuleSpec {
    pub id: String,
    pub category: String,
    pub tokens: Vec<PatternTokenSpec>,
    pub message: String,
    pub short_message: String,
    pub suggestions_out: String,
    /// Operators for back-references in the message and the short message.
    pub message_matches: Vec<Match>,
    /// Operators for back-references in `suggestions_out`.
    pub output_matches: Vec<Match>,
    pub filter: Option<FilterCall>,
    /// Only match at the start of the sentence.
    pub sentence_start: bool,
    /// Index of the first element of the reported span.
    pub start_position_correction: Option<usize>,
    /// Minus the number of elements at the end which are not part of the reported span.
    pub end_position_correction: Option<isize>,
    pub enabled: bool,
}

impl Default for PatternRuleSpec {
    fn default() -> Self {
        PatternRuleSpec {
            id: String::new(),
            category: String::new(),
            tokens: Vec::new(),
            message: String::new(),
            short_message: String::new(),
            suggestions_out: String::new(),
            message_matches: Vec::new(),
            output_matches: Vec::new(),
            filter: None,
            sentence_start: false,
            start_position_correction: None,
            end_position_correction: None,
            enabled: true,
        }
    }
}

impl PatternRuleSpec {
    pub fn new<S: Into<String>>(id: S, tokens: Vec<PatternTokenSpec>) -> Self {
        PatternRuleSpec {
            id: id.into(),
            tokens,
            ..Default::default()
        }
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_message<S: Into<String>>(mut self, message: S, matches: Vec<Match>) -> Self {
        self.message = message.into();
        self.message_matches = matches;
        self
    }

    pub fn with_short_message<S: Into<String>>(mut self, short_message: S) -> Self {
        self.short_message = short_message.into();
        self
    }

    pub fn with_suggestions_out<S: Into<String>>(
        mut self,
        suggestions_out: S,
        matches: Vec<Match>,
    ) -> Self {
        self.suggestions_out = suggestions_out.into();
        self.output_matches = matches;
        self
    }

    pub fn with_filter(mut self, filter: FilterCall) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn at_sentence_start(mut self) -> Self {
        self.sentence_start = true;
        self
    }

    pub fn with_corrections(mut self, start: usize, end: isize) -> Self {
        self.start_position_correction = Some(start);
        self.end_position_correction = Some(end);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Builds the rule.
    ///
    /// # Errors
    /// - If the pattern is empty or an element is invalid.
    /// - If the marker is not contiguous or the corrections do not describe a non-empty span.
    /// - If an element unifies on a feature or the rule names a filter the language does not know.
    pub fn compile(self, language: Arc<Language>) -> Result<PatternRule, Error> {
        let PatternRuleSpec {
            id,
            category,
            tokens,
            message,
            short_message,
            suggestions_out,
            message_matches,
            output_matches,
            filter,
            sentence_start,
            start_position_correction,
            end_position_correction,
            enabled,
        } = self;

        if tokens.is_empty() {
            return Err(Error::InvalidSpec(format!("rule {} has an empty pattern", id)));
        }

        let mut elements = tokens
            .into_iter()
            .enumerate()
            .map(|(i, spec)| PatternToken::compile(spec, i))
            .collect::<Result<Vec<_>, Error>>()?;
        let size = elements.len();

        let (start_correction, end_correction) =
            match (start_position_correction, end_position_correction) {
                (None, None) => marker_corrections(&elements).ok_or_else(|| {
                    Error::InvalidSpec(format!(
                        "rule {}: marker must be contiguous and non-empty",
                        id
                    ))
                })?,
                (start, end) => {
                    let start = start.unwrap_or(0);
                    let end = end.unwrap_or(0);
                    if end > 0 || start as isize >= size as isize + end {
                        return Err(Error::InvalidSpec(format!(
                            "rule {}: corrections {} and {} leave no element in the marker",
                            id, start, end
                        )));
                    }
                    let marker_end = (size as isize + end) as usize;
                    for (i, element) in elements.iter_mut().enumerate() {
                        element.marker = i >= start && i < marker_end;
                    }
                    (start, end)
                }
            };

        fix_unification(&mut elements);
        for unification in elements.iter().filter_map(|x| x.unification()) {
            if let Some(feature) = unification
                .features
                .keys()
                .find(|feature| !language.unifier().has_feature(feature))
            {
                return Err(Error::InvalidSpec(format!(
                    "rule {}: unknown unification feature {}",
                    id, feature
                )));
            }
        }

        let filter = filter
            .as_ref()
            .map(|call| Filter::from_call(call, &language))
            .transpose()?;

        let message = Template::new(message, message_matches.clone());
        let short_message = Template::new(short_message, message_matches);
        let suggestions_out = Template::new(suggestions_out, output_matches);

        for template in &[&message, &short_message, &suggestions_out] {
            if let Some(element) = template.max_reference() {
                if element >= size {
                    warn!(
                        "rule {}: template \"{}\" refers to element {} of a {}-element pattern",
                        id,
                        template.source(),
                        element + 1,
                        size
                    );
                }
            }
        }

        let tests_unification = elements.iter().any(|x| x.unification().is_some());
        let tests_groups_or_unification =
            tests_unification || elements.iter().any(|x| x.has_and_group());
        let min_occurrence_correction = elements.iter().filter(|x| x.min_occurrence() == 0).count();

        Ok(PatternRule {
            id,
            category: Category::new(category),
            elements,
            message,
            short_message,
            suggestions_out,
            filter,
            sentence_start,
            start_correction,
            end_correction,
            tests_unification,
            tests_groups_or_unification,
            min_occurrence_correction,
            enabled,
            language,
        })
    }
}

/// Derives the corrections from the marker flags. `None` if the marker is empty or not contiguous.
fn marker_corrections(elements: &[PatternToken]) -> Option<(usize, isize)> {
    let start = elements.iter().position(|x| x.is_inside_marker())?;
    let end = elements.iter().rposition(|x| x.is_inside_marker())?;

    if elements[start..=end].iter().all(|x| x.is_inside_marker()) {
        Some((start, -((elements.len() - 1 - end) as isize)))
    } else {
        None
    }
}

/// Each run of unified elements gets its verdict at its final element, negation included.
fn fix_unification(elements: &mut [PatternToken]) {
    let mut i = 0;
    while i < elements.len() {
        if elements[i].unification.is_none() {
            i += 1;
            continue;
        }

        let start = i;
        while i < elements.len() && elements[i].unification.is_some() {
            i += 1;
        }
        let run = &mut elements[start..i];

        let negate = run.iter().flat_map(|x| &x.unification).any(|x| x.negate);
        if !run.iter().flat_map(|x| &x.unification).any(|x| x.last) {
            if let Some(unification) = run.last_mut().and_then(|x| x.unification.as_mut()) {
                unification.last = true;
            }
        }
        for unification in run.iter_mut().filter_map(|x| x.unification.as_mut()) {
            if unification.last {
                unification.negate = negate;
            }
        }
    }
}

/// Keeps, among matches contained in one another, only the outermost one.
/// Input order does not matter, output is sorted by start.
pub(crate) fn filter_contained(mut matches: Vec<RuleMatch>) -> Vec<RuleMatch> {
    matches.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut output: Vec<RuleMatch> = Vec::new();
    for rule_match in matches {
        if let Some(last) = output.last() {
            if last.start <= rule_match.start && rule_match.end <= last.end {
                continue;
            }
        }
        output.push(rule_match);
    }

    output
}

/// A compiled pattern rule. Immutable; matching state lives in a [RuleMatcher].
#[derive(Derivative)]
#[derivative(Debug)]
pub struct PatternRule {
    id: String,
    category: Category,
    elements: Vec<PatternToken>,
    message: Template,
    short_message: Template,
    suggestions_out: Template,
    filter: Option<Filter>,
    sentence_start: bool,
    start_correction: usize,
    end_correction: isize,
    tests_unification: bool,
    tests_groups_or_unification: bool,
    min_occurrence_correction: usize,
    enabled: bool,
    #[derivative(Debug = "ignore")]
    language: Arc<Language>,
}

impl PatternRule {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn elements(&self) -> &[PatternToken] {
        &self.elements
    }

    pub fn message(&self) -> &Template {
        &self.message
    }

    pub fn short_message(&self) -> &Template {
        &self.short_message
    }

    pub fn suggestions_out(&self) -> &Template {
        &self.suggestions_out
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn is_sentence_start(&self) -> bool {
        self.sentence_start
    }

    /// Whether the rule is on by default.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn start_position_correction(&self) -> usize {
        self.start_correction
    }

    pub fn end_position_correction(&self) -> isize {
        self.end_correction
    }

    pub fn tests_unification(&self) -> bool {
        self.tests_unification
    }

    pub fn tests_groups_or_unification(&self) -> bool {
        self.tests_groups_or_unification
    }

    /// The number of optional elements.
    pub fn min_occurrence_correction(&self) -> usize {
        self.min_occurrence_correction
    }

    /// Finds all matches of this rule in the sentence.
    ///
    /// # Errors
    /// If the synthesizer fails while formatting a match.
    pub fn apply(&self, sentence: &Sentence) -> Result<Vec<RuleMatch>, Error> {
        RuleMatcher::new(self).apply(sentence)
    }

    fn starts_with_uppercase(&self, tokens: &[Token], outer: &OuterMatch) -> bool {
        if tokens.is_empty() {
            return false;
        }

        let positions = &outer.positions;
        let corrected = if self.start_correction > 0 && !positions.is_empty() {
            let end = self.start_correction.min(positions.len() - 1);
            positions[..=end].iter().sum::<usize>().saturating_sub(1)
        } else {
            0
        };
        let index = (outer.first_token + corrected).min(tokens.len() - 1);

        if tokens[index].is_sentence_start() && index + 1 < tokens.len() {
            return utils::starts_with_uppercase(tokens[index + 1].text());
        }

        utils::starts_with_uppercase(tokens[index].text())
            && self.message.preserves_case()
            && self.suggestions_out.preserves_case()
    }

    /// Expands the templates of this rule against a match.
    /// `None` if a misspelled suggestion vetoes the match.
    pub fn format(&self, tokens: &[Token], outer: &OuterMatch) -> Result<Option<Formatted>, Error> {
        let ctx = FormatContext {
            tokens,
            bindings: outer.bindings(),
            language: &self.language,
            uppercase_suggestions: self.starts_with_uppercase(tokens, outer),
        };

        let message = match self.message.expand(&ctx, true)? {
            Some(message) => message,
            None => {
                trace!("rule {}: misspelled suggestion, match dropped", self.id);
                return Ok(None);
            }
        };
        let short_message = self.short_message.expand(&ctx, false)?.unwrap_or_default();
        let output = self.suggestions_out.expand(&ctx, false)?.unwrap_or_default();

        let mut suggestions: Vec<String> = Vec::new();
        for suggestion in message.suggestions().iter().chain(output.suggestions()) {
            if !suggestions.contains(suggestion) {
                suggestions.push(suggestion.clone());
            }
        }

        Ok(Some(Formatted {
            starts_with_comma: message.starts_with_comma(),
            message: message.text,
            short_message: short_message.text,
            suggestions,
            suggestion_output: if self.suggestions_out.is_empty() {
                None
            } else {
                Some(output.text)
            },
        }))
    }

    /// Turns a match of all elements into a [RuleMatch].
    /// `None` if the formatting or the filter rejects the match.
    pub(crate) fn create_rule_match(
        &self,
        tokens: &[Token],
        outer: &OuterMatch,
    ) -> Result<Option<RuleMatch>, Error> {
        let formatted = match self.format(tokens, outer)? {
            Some(formatted) => formatted,
            None => return Ok(None),
        };

        let first_marker = outer.first_marker.unwrap_or(outer.first_token);
        let mut start = tokens[first_marker].start();
        if formatted.starts_with_comma && first_marker >= 1 {
            start = tokens[first_marker - 1].end();
        }
        let last_marker = outer.last_marker.unwrap_or(outer.last_token);
        let end = tokens[last_marker.min(tokens.len() - 1)].end();

        if start >= end {
            trace!("rule {}: empty span at {}, match dropped", self.id, start);
            return Ok(None);
        }

        let rule_match = RuleMatch {
            rule_id: self.id.clone(),
            start,
            end,
            message: formatted.message,
            short_message: formatted.short_message,
            suggestions: formatted.suggestions,
            suggestion_output: formatted.suggestion_output,
        };

        let rule_match = match &self.filter {
            Some(filter) => {
                let last = outer.last_token.min(tokens.len() - 1);
                let matched = &tokens[outer.first_token..=last];
                match filter.apply(rule_match, matched, &outer.positions) {
                    Some(rule_match) => rule_match,
                    None => {
                        trace!("rule {}: match at {} rejected by filter", self.id, start);
                        return Ok(None);
                    }
                }
            }
            None => rule_match,
        };

        debug!(
            "rule {} matched {}..{}: {:?}",
            self.id, rule_match.start, rule_match.end, rule_match.suggestions
        );
        Ok(Some(rule_match))
    }
}
