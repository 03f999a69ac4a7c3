//! Sets of pattern rules.

use crate::rule::id::Selector;
use crate::rule::{PatternRule, RuleMatch};
use crate::types::Sentence;
use crate::Error;
use serde::{Deserialize, Serialize};

/// Options for a rule set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesOptions {
    /// Rules to use. Empty means all rules which are enabled by default.
    pub ids: Vec<Selector>,
    /// Rules to ignore. Takes precedence over `ids`.
    pub ignore_ids: Vec<Selector>,
}

/// An ordered set of rules. Earlier rules win when matches overlap.
#[derive(Debug, Default)]
pub struct Rules {
    rules: Vec<PatternRule>,
    options: RulesOptions,
}

impl Rules {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Rules {
            rules,
            options: RulesOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RulesOptions) -> Self {
        self.options = options;
        self
    }

    /// All rules ordered by priority.
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn options(&self) -> &RulesOptions {
        &self.options
    }

    /// Returns an iterator over all rules matching the selector.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = &'a PatternRule> {
        self.rules
            .iter()
            .filter(move |rule| selector.is_match(rule.category(), rule.id()))
    }

    /// Use e. g. to turn a selection of rules on or off.
    pub fn select_mut<'a>(
        &'a mut self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = &'a mut PatternRule> {
        self.rules
            .iter_mut()
            .filter(move |rule| selector.is_match(rule.category(), rule.id()))
    }

    fn is_enabled(&self, rule: &PatternRule) -> bool {
        let selected = if self.options.ids.is_empty() {
            rule.is_enabled()
        } else {
            self.options
                .ids
                .iter()
                .any(|x| x.is_match(rule.category(), rule.id()))
        };

        selected
            && !self
                .options
                .ignore_ids
                .iter()
                .any(|x| x.is_match(rule.category(), rule.id()))
    }

    /// Matches all enabled rules. Overlapping matches of later rules are dropped.
    /// The result is sorted by start.
    ///
    /// # Errors
    /// If the synthesizer fails for any rule.
    pub fn apply(&self, sentence: &Sentence) -> Result<Vec<RuleMatch>, Error> {
        let mut output: Vec<RuleMatch> = Vec::new();

        for rule in self.rules.iter() {
            if !self.is_enabled(rule) {
                continue;
            }
            output.extend(rule.apply(sentence)?);
        }

        let mut mask = vec![false; sentence.char_len()];
        let mut output: Vec<RuleMatch> = output
            .into_iter()
            .filter_map(|rule_match| {
                let end = rule_match.end.min(mask.len());
                let start = rule_match.start.min(end);

                if mask[start..end].iter().all(|x| !x) {
                    mask[start..end].iter_mut().for_each(|x| *x = true);
                    Some(rule_match)
                } else {
                    None
                }
            })
            .collect();

        output.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(output)
    }

    /// Applies the first suggestion of every match.
    pub fn correct(&self, sentence: &Sentence) -> Result<String, Error> {
        let matches = self.apply(sentence)?;
        Ok(apply_suggestions(sentence.text(), &matches))
    }
}

/// Corrects a text by applying the first suggestion of each match to it.
/// Matches must be sorted by start and must not overlap. Matches without suggestions are skipped.
pub fn apply_suggestions(text: &str, matches: &[RuleMatch]) -> String {
    let mut offset: isize = 0;
    let mut chars: Vec<_> = text.chars().collect();

    for rule_match in matches {
        let replacement: Vec<_> = match rule_match.suggestions().first() {
            Some(suggestion) => suggestion.chars().collect(),
            None => continue,
        };
        let start = (rule_match.start as isize + offset) as usize;
        let end = (rule_match.end as isize + offset) as usize;
        chars.splice(start..end, replacement.iter().cloned());
        offset = offset + replacement.len() as isize - (rule_match.end - rule_match.start) as isize;
    }

    chars.into_iter().collect()
}
