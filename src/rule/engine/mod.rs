//! The matcher which walks a sentence and composes element tests into matches of a whole pattern.

mod element;

use super::unify::Unifier;
use super::{filter_contained, Bindings, OuterMatch, PatternRule, RuleMatch};
use crate::types::{Reading, Sentence, Token};
use crate::Error;
use element::ElementMatcher;

/// Matches one [PatternRule] against sentences. Holds mutable state and must not be shared
/// between threads while matching; create one per thread instead.
#[derive(Debug)]
pub struct RuleMatcher<'r> {
    rule: &'r PatternRule,
    elements: Vec<ElementMatcher<'r>>,
    unifier: Unifier<'r>,
    /// Set once a token in the skip window of the previous element hits one of its `Next`
    /// exceptions.
    scope_blocked: bool,
}

impl<'r> RuleMatcher<'r> {
    pub fn new(rule: &'r PatternRule) -> Self {
        RuleMatcher {
            rule,
            elements: rule.elements().iter().map(ElementMatcher::new).collect(),
            unifier: Unifier::new(rule.language().unifier()),
            scope_blocked: false,
        }
    }

    fn resolve_reference(
        &mut self,
        k: usize,
        first: Option<usize>,
        positions: &[usize],
        tokens: &[Token],
    ) -> Result<(), Error> {
        let bindings = Bindings::new(first.unwrap_or(0), positions);
        self.elements[k].resolve_reference(bindings, tokens, self.rule.language())
    }

    /// Finds all matches of the rule in the sentence, ordered by start.
    /// Of matches contained in one another only the outermost one is kept.
    ///
    /// # Errors
    /// If the synthesizer fails while formatting a match.
    pub fn apply(&mut self, sentence: &Sentence) -> Result<Vec<RuleMatch>, Error> {
        let tokens = sentence.tokens();
        let size = self.elements.len();
        let n_tokens = tokens.len() as isize;
        let limit = (tokens.len() + 1).saturating_sub(size);
        let correction = self.rule.min_occurrence_correction();

        let mut matches = Vec::new();
        let mut positions: Vec<usize> = Vec::with_capacity(size);
        let mut i = 0;

        while i < limit + correction && !(self.rule.is_sentence_start() && i > 0) {
            let mut skip_shift_total = 0;
            let mut all_match = false;
            let mut first: Option<usize> = None;
            let mut last: Option<usize> = None;
            let mut first_marker: Option<usize> = None;
            let mut last_marker: Option<usize> = None;
            let mut prev_skip: isize = 0;
            let mut min_occur_skip = 0;
            if self.rule.tests_unification() {
                self.unifier.reset();
            }
            positions.clear();

            for k in 0..size {
                let prev = if k == 0 { None } else { Some(k - 1) };
                let element = self.elements[k].token();
                self.resolve_reference(k, first, &positions, tokens)?;

                let next_pos = (i + k + skip_shift_total) as isize - min_occur_skip as isize;
                self.scope_blocked = false;
                if prev_skip + next_pos >= n_tokens || prev_skip < 0 {
                    prev_skip = n_tokens - (next_pos + 1);
                }
                let remaining = n_tokens - (size - k) as isize + correction as isize;
                let max_token = (next_pos + prev_skip).min(remaining);

                all_match = false;
                let mut m = next_pos;
                while m <= max_token {
                    let index = m as usize;
                    let immunized = tokens[index].is_immunized();
                    all_match = !immunized
                        && self.test_all_readings(tokens, k, prev, index, prev_skip);

                    if element.min_occurrence() == 0 {
                        let mut found_next = false;
                        for k2 in k + 1..size {
                            self.resolve_reference(k2, first, &positions, tokens)?;
                            let next_match = !immunized
                                && self.test_all_readings(tokens, k2, Some(k), index, prev_skip);

                            if next_match {
                                // absent, the next element takes over at this token
                                all_match = true;
                                min_occur_skip += 1;
                                positions.push(0);
                                found_next = true;
                                break;
                            } else if self.elements[k2].token().min_occurrence() > 0 {
                                break;
                            }
                        }
                        if found_next {
                            break;
                        }
                    }

                    if all_match {
                        let skip_for_max =
                            self.skip_max_tokens(tokens, k, prev, index, prev_skip, size - k - 1);
                        let last_token = index + skip_for_max;
                        let skip_shift = last_token - next_pos as usize;

                        positions.push(skip_shift + 1);
                        prev_skip = element.skip_next().as_isize();
                        skip_shift_total += skip_shift;
                        if first.is_none() {
                            first = Some(index);
                        }
                        if element.is_inside_marker() {
                            if first_marker.is_none() {
                                first_marker = Some(index);
                            }
                            last_marker = Some(last_token);
                        }
                        last = Some(last_token);
                        break;
                    }

                    m += 1;
                }

                if !all_match
                    && element.min_occurrence() == 0
                    && self.elements[k + 1..]
                        .iter()
                        .all(|x| x.token().min_occurrence() == 0)
                {
                    // only optional elements are left, the match ends before this one
                    all_match = true;
                    min_occur_skip += 1;
                    positions.push(0);
                }

                if !all_match {
                    break;
                }
            }

            if all_match && positions.len() == size {
                if let (Some(first), Some(last)) = (first, last) {
                    let outer = OuterMatch::new(first, last, positions.clone())
                        .with_markers(first_marker, last_marker);
                    if let Some(rule_match) = self.rule.create_rule_match(tokens, &outer)? {
                        matches.push(rule_match);
                    }
                }
            }

            i += 1;
        }

        Ok(filter_contained(matches))
    }

    /// How many tokens after `index` the element consumes on top, up to its max occurrence.
    /// Leaves enough tokens for the `remaining` elements.
    fn skip_max_tokens(
        &mut self,
        tokens: &[Token],
        k: usize,
        prev: Option<usize>,
        index: usize,
        prev_skip: isize,
        remaining: usize,
    ) -> usize {
        let max_occurrence = self.elements[k]
            .token()
            .max_occurrence()
            .unwrap_or(usize::MAX);
        let bound = tokens.len().saturating_sub(remaining);

        let mut skip = 0;
        let mut j = 1;
        while j < max_occurrence && index + j < bound {
            if !tokens[index + j].is_immunized()
                && self.test_all_readings(tokens, k, prev, index + j, prev_skip)
            {
                skip += 1;
            } else {
                break;
            }
            j += 1;
        }

        skip
    }

    /// Tests element `k` against all readings of `tokens[index]`.
    fn test_all_readings(
        &mut self,
        tokens: &[Token],
        k: usize,
        prev: Option<usize>,
        index: usize,
        prev_skip: isize,
    ) -> bool {
        let token = &tokens[index];
        let text = token.text();
        let readings = token.readings();
        let element = self.elements[k].token();
        let prev_element = prev.map(|x| self.elements[x].token());

        self.elements[k].prepare_and_group();
        let mut matched = false;

        for (l, reading) in readings.iter().enumerate() {
            if !self.scope_blocked && prev_skip > 0 {
                self.scope_blocked = prev_element.map_or(false, |x| {
                    x.is_matched_by_scope_next_exception(text, reading)
                });
            }
            if self.scope_blocked {
                return false;
            }

            matched = matched || self.elements[k].is_matched(text, reading);
            if !matched
                && !element.is_inflected()
                && !element.has_pos()
                && prev_element.map_or(false, |x| !x.has_exception_list())
            {
                // the surface is shared, no other reading can match
                return false;
            }

            if self.rule.tests_groups_or_unification() {
                let last = l + 1 == readings.len();
                matched &= self.test_unification_and_groups(matched, last, text, reading, k);
            }
        }

        if matched {
            if readings.iter().any(|x| element.is_exception_matched(text, x)) {
                return false;
            }
            if index > 0
                && element.has_previous_exception()
                && element.is_matched_by_previous_exception(&tokens[index - 1])
            {
                return false;
            }
        }

        matched && element.is_chunk_matched(token.chunks())
    }

    fn test_unification_and_groups(
        &mut self,
        matched: bool,
        last_reading: bool,
        text: &str,
        reading: &Reading,
        k: usize,
    ) -> bool {
        let mut output = matched;
        let element_matched = self.elements[k].is_matched(text, reading);
        let element = self.elements[k].token();

        if self.rule.tests_unification() {
            match element.unification() {
                Some(unification) => {
                    if matched {
                        let unified = self.unifier.is_unified(
                            text,
                            reading,
                            &unification.features,
                            element_matched,
                            last_reading,
                        );

                        if unification.last {
                            output = if unification.negate { !unified } else { unified };
                        }
                    }
                }
                None => self.unifier.reset(),
            }
        }

        self.elements[k].add_member_and_group(text, reading);
        if last_reading {
            output &= self.elements[k].check_and_group(output);
        }

        output
    }
}
