use crate::lang::Language;
use crate::rule::pattern::{Matcher, PatternToken, Reference, Resolved};
use crate::rule::Bindings;
use crate::types::{Reading, Token};
use crate::Error;

/// Per-match state of one pattern element: what its references resolved to and
/// which AND-group members were satisfied by the readings seen so far.
#[derive(Debug)]
pub(crate) struct ElementMatcher<'r> {
    token: &'r PatternToken,
    resolved: Resolved,
    self_matched: bool,
    and_checks: Vec<bool>,
}

fn resolve(
    reference: &Reference,
    pos: bool,
    bindings: Bindings,
    tokens: &[Token],
    language: &Language,
) -> Result<Option<Vec<String>>, Error> {
    let index = match bindings.token_of(reference.element) {
        Some(index) if index < tokens.len() => index,
        _ => return Ok(None),
    };

    let values = match &reference.operator {
        Some(operator) => operator.apply(
            tokens,
            index,
            bindings.distance_to_next(reference.element),
            &bindings,
            language,
        )?,
        None if pos => tokens[index]
            .readings()
            .iter()
            .filter_map(|x| x.pos().map(|x| x.to_string()))
            .collect(),
        None => vec![tokens[index].text().to_string()],
    };

    Ok(Some(values))
}

impl<'r> ElementMatcher<'r> {
    pub(crate) fn new(token: &'r PatternToken) -> Self {
        ElementMatcher {
            token,
            resolved: Resolved::default(),
            self_matched: false,
            and_checks: vec![false; token.and_group.len()],
        }
    }

    pub(crate) fn token(&self) -> &'r PatternToken {
        self.token
    }

    /// Resolves references against the tokens bound so far.
    pub(crate) fn resolve_reference(
        &mut self,
        bindings: Bindings,
        tokens: &[Token],
        language: &Language,
    ) -> Result<(), Error> {
        if !self.token.references() {
            return Ok(());
        }

        let predicate = &self.token.predicate;
        self.resolved = Resolved::default();
        if let Some(Matcher::Reference(reference)) = &predicate.text {
            self.resolved.text = resolve(reference, false, bindings, tokens, language)?;
        }
        if let Some(Matcher::Reference(reference)) = &predicate.pos {
            self.resolved.pos = resolve(reference, true, bindings, tokens, language)?;
        }

        Ok(())
    }

    pub(crate) fn prepare_and_group(&mut self) {
        self.self_matched = false;
        self.and_checks.iter_mut().for_each(|x| *x = false);
    }

    pub(crate) fn is_matched(&self, text: &str, reading: &Reading) -> bool {
        self.token.predicate.is_match(text, reading, &self.resolved)
    }

    pub(crate) fn add_member_and_group(&mut self, text: &str, reading: &Reading) {
        if !self.token.has_and_group() {
            return;
        }

        if self.is_matched(text, reading) {
            self.self_matched = true;
        }
        let resolved = Resolved::default();
        for (check, member) in self.and_checks.iter_mut().zip(&self.token.and_group) {
            if member.predicate.is_match(text, reading, &resolved) {
                *check = true;
            }
        }
    }

    /// Whether the element and every AND-group member matched some reading of the token.
    pub(crate) fn check_and_group(&self, previous: bool) -> bool {
        if self.token.has_and_group() {
            self.self_matched && self.and_checks.iter().all(|x| *x)
        } else {
            previous
        }
    }
}
