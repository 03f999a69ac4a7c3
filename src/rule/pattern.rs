//! Pattern elements: predicates over a single token plus the modifiers which steer the
//! [RuleMatcher][super::engine::RuleMatcher].

use super::grammar::Match;
use super::unify::Unification;
use crate::types::{Reading, Token};
use crate::utils::regex::SerializeRegex;
use crate::Error;
use serde::{Deserialize, Serialize};
use unicase::UniCase;

/// The POS tag literal which matches readings without POS tag.
pub const UNKNOWN_TAG: &str = "UNKNOWN";

/// A predicate over a string-valued property of a reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Matcher {
    Literal(String),
    Regex(SerializeRegex),
    /// Whatever an earlier element was bound to, optionally passed through a match operator.
    Reference(Reference),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub(crate) element: usize,
    pub(crate) operator: Option<Match>,
}

impl Reference {
    /// The referenced element, counted from zero.
    pub fn element(&self) -> usize {
        self.element
    }
}

/// Values an element's references resolved to for the current match attempt.
/// `None` means the reference could not be resolved and nothing matches it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolved {
    pub(crate) text: Option<Vec<String>>,
    pub(crate) pos: Option<Vec<String>>,
}

/// A predicate over one reading of a token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPredicate {
    pub(crate) text: Option<Matcher>,
    pub(crate) pos: Option<Matcher>,
    pub(crate) inflected: bool,
    pub(crate) negate: bool,
    pub(crate) negate_pos: bool,
    pub(crate) case_sensitive: bool,
}

impl TokenPredicate {
    pub(crate) fn compile(spec: PredicateSpec) -> Result<Self, Error> {
        let PredicateSpec {
            text,
            text_regex,
            pos,
            pos_regex,
            inflected,
            negate,
            negate_pos,
            case_sensitive,
        } = spec;

        let text = text
            .map(|text| -> Result<Matcher, Error> {
                Ok(if text_regex {
                    Matcher::Regex(SerializeRegex::new(&text, true, case_sensitive)?)
                } else {
                    Matcher::Literal(text)
                })
            })
            .transpose()?;
        let pos = pos
            .map(|pos| -> Result<Matcher, Error> {
                Ok(if pos_regex {
                    Matcher::Regex(SerializeRegex::new(&pos, true, true)?)
                } else {
                    Matcher::Literal(pos)
                })
            })
            .transpose()?;

        Ok(TokenPredicate {
            text,
            pos,
            inflected,
            negate,
            negate_pos,
            case_sensitive,
        })
    }

    /// Predicates outside of pattern elements can not refer to other elements.
    pub(crate) fn compile_plain(spec: PredicateSpec, context: &str) -> Result<Self, Error> {
        TokenPredicate::compile(spec).map_err(|error| match error {
            Error::InvalidSpec(message) => Error::InvalidSpec(format!("{}: {}", context, message)),
            other => other,
        })
    }

    pub(crate) fn is_match(&self, text: &str, reading: &Reading, resolved: &Resolved) -> bool {
        let text_match = self.text.as_ref().map_or(true, |matcher| {
            let input = if self.inflected {
                reading.lemma().unwrap_or(text)
            } else {
                text
            };
            self.is_text_match(matcher, input, resolved.text.as_deref())
        });
        let pos_match = self
            .pos
            .as_ref()
            .map_or(true, |matcher| is_pos_match(matcher, reading.pos(), resolved.pos.as_deref()));

        (text_match != self.negate) && (pos_match != self.negate_pos)
    }

    fn is_text_match(&self, matcher: &Matcher, input: &str, resolved: Option<&[String]>) -> bool {
        let equals = |value: &str| {
            if self.case_sensitive {
                value == input
            } else {
                UniCase::new(value) == UniCase::new(input)
            }
        };

        match matcher {
            Matcher::Literal(literal) => equals(literal),
            Matcher::Regex(regex) => regex.is_match(input),
            Matcher::Reference(_) => {
                resolved.map_or(false, |values| values.iter().any(|x| equals(x)))
            }
        }
    }

    fn has_reference(&self) -> bool {
        matches!(self.text, Some(Matcher::Reference(_)))
            || matches!(self.pos, Some(Matcher::Reference(_)))
    }
}

fn is_pos_match(matcher: &Matcher, pos: Option<&str>, resolved: Option<&[String]>) -> bool {
    match (matcher, pos) {
        (Matcher::Literal(literal), None) => literal == UNKNOWN_TAG,
        (_, None) => false,
        (Matcher::Literal(literal), Some(pos)) => literal == pos,
        (Matcher::Regex(regex), Some(pos)) => regex.is_match(pos),
        (Matcher::Reference(_), Some(pos)) => {
            resolved.map_or(false, |values| values.iter().any(|x| x == pos))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionScope {
    /// Tested against the token the element is tested against.
    Current,
    /// Tested against the tokens in the element's skip window.
    Next,
    /// Tested against the token before.
    Previous,
}

impl Default for ExceptionScope {
    fn default() -> Self {
        ExceptionScope::Current
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exception {
    pub(crate) predicate: TokenPredicate,
    pub(crate) scope: ExceptionScope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPredicate {
    pub(crate) matcher: Matcher,
    pub(crate) negate: bool,
}

impl ChunkPredicate {
    fn compile(spec: ChunkSpec) -> Result<Self, Error> {
        let matcher = if spec.regex {
            Matcher::Regex(SerializeRegex::new(&spec.chunk, true, true)?)
        } else {
            Matcher::Literal(spec.chunk)
        };

        Ok(ChunkPredicate {
            matcher,
            negate: spec.negate,
        })
    }

    fn is_match(&self, chunks: &[String]) -> bool {
        let found = chunks.iter().any(|chunk| match &self.matcher {
            Matcher::Literal(literal) => literal == chunk,
            Matcher::Regex(regex) => regex.is_match(chunk),
            Matcher::Reference(_) => false,
        });

        found != self.negate
    }
}

/// A sibling which has to match the same token as the element it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AndMember {
    pub(crate) predicate: TokenPredicate,
    pub(crate) exceptions: Vec<TokenPredicate>,
    pub(crate) chunk: Option<ChunkPredicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantifier {
    pub(crate) min: usize,
    /// `None` if unbounded.
    pub(crate) max: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skip {
    Bounded(usize),
    Unbounded,
}

impl Skip {
    /// Unbounded is `-1`, the way the matcher counts.
    pub(crate) fn as_isize(self) -> isize {
        match self {
            Skip::Bounded(n) => n as isize,
            Skip::Unbounded => -1,
        }
    }
}

/// One slot of a pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternToken {
    pub(crate) predicate: TokenPredicate,
    pub(crate) quantifier: Quantifier,
    pub(crate) skip: Skip,
    pub(crate) exceptions: Vec<Exception>,
    pub(crate) and_group: Vec<AndMember>,
    pub(crate) chunk: Option<ChunkPredicate>,
    pub(crate) unification: Option<Unification>,
    pub(crate) marker: bool,
}

impl PatternToken {
    /// Compiles the element at index `position` of a pattern.
    ///
    /// # Errors
    /// - If the occurrence bounds or the skip are out of range.
    /// - If the element refers to itself or to a later element.
    /// - If a regex does not compile.
    pub fn compile(spec: PatternTokenSpec, position: usize) -> Result<Self, Error> {
        let min = match spec.min {
            0 => 0,
            1 => 1,
            other => {
                return Err(Error::InvalidSpec(format!(
                    "min occurrence must be 0 or 1, got {}",
                    other
                )))
            }
        };
        let max = match spec.max {
            -1 => None,
            n if n >= 1 => Some(n as usize),
            other => {
                return Err(Error::InvalidSpec(format!(
                    "max occurrence must be -1 or at least 1, got {}",
                    other
                )))
            }
        };
        let skip = match spec.skip {
            -1 => Skip::Unbounded,
            n if n >= 0 => Skip::Bounded(n as usize),
            other => {
                return Err(Error::InvalidSpec(format!(
                    "skip must be -1 or at least 0, got {}",
                    other
                )))
            }
        };

        let mut predicate = TokenPredicate::compile(spec.predicate)?;

        if let Some(reference) = spec.reference {
            if reference.element >= position {
                return Err(Error::InvalidSpec(format!(
                    "element {} refers to element {}, which is not before it",
                    position, reference.element
                )));
            }
            let feature_element = reference.operator.as_ref().and_then(Match::feature_element);
            if let Some(feature_element) = feature_element {
                if feature_element >= position {
                    return Err(Error::InvalidSpec(format!(
                        "element {} copies features from element {}, which is not before it",
                        position, feature_element
                    )));
                }
            }

            let slot = match reference.target {
                ReferenceTarget::Text => &mut predicate.text,
                ReferenceTarget::Pos => &mut predicate.pos,
            };
            if slot.is_some() {
                return Err(Error::InvalidSpec(format!(
                    "element {} has both a reference and a {:?} predicate",
                    position, reference.target
                )));
            }
            *slot = Some(Matcher::Reference(Reference {
                element: reference.element,
                operator: reference.operator,
            }));
        }

        let exceptions = spec
            .exceptions
            .into_iter()
            .map(|exception| {
                Ok(Exception {
                    predicate: TokenPredicate::compile_plain(exception.predicate, "exception")?,
                    scope: exception.scope,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let and_group = spec
            .and_group
            .into_iter()
            .map(|member| {
                Ok(AndMember {
                    predicate: TokenPredicate::compile_plain(member.predicate, "and-group member")?,
                    exceptions: member
                        .exceptions
                        .into_iter()
                        .map(|x| TokenPredicate::compile_plain(x, "and-group exception"))
                        .collect::<Result<Vec<_>, Error>>()?,
                    chunk: member.chunk.map(ChunkPredicate::compile).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if let Some(unification) = &spec.unification {
            if unification.features.is_empty() {
                return Err(Error::InvalidSpec(format!(
                    "element {} takes part in unification without features",
                    position
                )));
            }
        }

        Ok(PatternToken {
            predicate,
            quantifier: Quantifier { min, max },
            skip,
            exceptions,
            and_group,
            chunk: spec.chunk.map(ChunkPredicate::compile).transpose()?,
            unification: spec.unification,
            marker: spec.marker,
        })
    }

    pub fn min_occurrence(&self) -> usize {
        self.quantifier.min
    }

    /// `None` if the element may repeat without bound.
    pub fn max_occurrence(&self) -> Option<usize> {
        self.quantifier.max
    }

    pub fn skip_next(&self) -> Skip {
        self.skip
    }

    pub fn is_inside_marker(&self) -> bool {
        self.marker
    }

    pub fn is_inflected(&self) -> bool {
        self.predicate.inflected
    }

    pub fn has_pos(&self) -> bool {
        self.predicate.pos.is_some()
    }

    pub fn unification(&self) -> Option<&Unification> {
        self.unification.as_ref()
    }

    pub fn has_and_group(&self) -> bool {
        !self.and_group.is_empty()
    }

    pub fn references(&self) -> bool {
        self.predicate.has_reference()
    }

    /// Whether there are exceptions for the current token or the skip window.
    pub(crate) fn has_exception_list(&self) -> bool {
        self.exceptions
            .iter()
            .any(|x| x.scope != ExceptionScope::Previous)
    }

    pub(crate) fn has_previous_exception(&self) -> bool {
        self.exceptions
            .iter()
            .any(|x| x.scope == ExceptionScope::Previous)
    }

    fn exceptions_in(&self, scope: ExceptionScope) -> impl Iterator<Item = &TokenPredicate> {
        self.exceptions
            .iter()
            .filter(move |x| x.scope == scope)
            .map(|x| &x.predicate)
    }

    /// Any exception of this element or of its AND-group which vetoes `reading` at the current
    /// position.
    pub(crate) fn is_exception_matched(&self, text: &str, reading: &Reading) -> bool {
        let resolved = Resolved::default();

        self.exceptions_in(ExceptionScope::Current)
            .chain(self.and_group.iter().flat_map(|member| &member.exceptions))
            .any(|exception| exception.is_match(text, reading, &resolved))
    }

    pub(crate) fn is_matched_by_scope_next_exception(&self, text: &str, reading: &Reading) -> bool {
        let resolved = Resolved::default();

        self.exceptions_in(ExceptionScope::Next)
            .any(|exception| exception.is_match(text, reading, &resolved))
    }

    pub(crate) fn is_matched_by_previous_exception(&self, token: &Token) -> bool {
        let resolved = Resolved::default();

        self.exceptions_in(ExceptionScope::Previous).any(|exception| {
            token
                .readings()
                .iter()
                .any(|reading| exception.is_match(token.text(), reading, &resolved))
        })
    }

    /// Chunk predicates of the element and its AND-group.
    pub(crate) fn is_chunk_matched(&self, chunks: &[String]) -> bool {
        self.chunk.iter().all(|chunk| chunk.is_match(chunks))
            && self
                .and_group
                .iter()
                .filter_map(|member| member.chunk.as_ref())
                .all(|chunk| chunk.is_match(chunks))
    }
}

/// The part of an element spec that describes the token itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredicateSpec {
    /// Surface (or lemma, if `inflected`) to match. `None` matches any token.
    pub text: Option<String>,
    pub text_regex: bool,
    /// POS tag to match. `None` matches any tag.
    pub pos: Option<String>,
    pub pos_regex: bool,
    pub inflected: bool,
    pub negate: bool,
    pub negate_pos: bool,
    pub case_sensitive: bool,
}

impl PredicateSpec {
    pub fn literal<S: Into<String>>(text: S) -> Self {
        PredicateSpec {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn regex<S: Into<String>>(text: S) -> Self {
        PredicateSpec {
            text: Some(text.into()),
            text_regex: true,
            ..Default::default()
        }
    }

    pub fn pos<S: Into<String>>(pos: S) -> Self {
        PredicateSpec {
            pos: Some(pos.into()),
            ..Default::default()
        }
    }

    pub fn pos_regex<S: Into<String>>(pos: S) -> Self {
        PredicateSpec {
            pos: Some(pos.into()),
            pos_regex: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExceptionSpec {
    #[serde(flatten)]
    pub predicate: PredicateSpec,
    #[serde(default)]
    pub scope: ExceptionScope,
}

impl ExceptionSpec {
    pub fn new(predicate: PredicateSpec, scope: ExceptionScope) -> Self {
        ExceptionSpec { predicate, scope }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkSpec {
    pub chunk: String,
    #[serde(default)]
    pub regex: bool,
    #[serde(default)]
    pub negate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AndMemberSpec {
    #[serde(flatten)]
    pub predicate: PredicateSpec,
    #[serde(default)]
    pub exceptions: Vec<PredicateSpec>,
    #[serde(default)]
    pub chunk: Option<ChunkSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceTarget {
    Text,
    Pos,
}

impl Default for ReferenceTarget {
    fn default() -> Self {
        ReferenceTarget::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Index of an earlier element, counted from zero.
    pub element: usize,
    #[serde(default)]
    pub target: ReferenceTarget,
    #[serde(default)]
    pub operator: Option<Match>,
}

/// Everything needed to [compile][PatternToken::compile] a pattern element.
/// Occurrence bounds and skip use `-1` for "unbounded", as rule files do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTokenSpec {
    #[serde(flatten)]
    pub predicate: PredicateSpec,
    pub min: i64,
    pub max: i64,
    pub skip: i64,
    pub exceptions: Vec<ExceptionSpec>,
    pub and_group: Vec<AndMemberSpec>,
    pub chunk: Option<ChunkSpec>,
    pub unification: Option<Unification>,
    pub marker: bool,
    pub reference: Option<ReferenceSpec>,
}

impl Default for PatternTokenSpec {
    fn default() -> Self {
        PatternTokenSpec {
            predicate: PredicateSpec::default(),
            min: 1,
            max: 1,
            skip: 0,
            exceptions: Vec::new(),
            and_group: Vec::new(),
            chunk: None,
            unification: None,
            marker: true,
            reference: None,
        }
    }
}

impl From<PredicateSpec> for PatternTokenSpec {
    fn from(predicate: PredicateSpec) -> Self {
        PatternTokenSpec {
            predicate,
            ..Default::default()
        }
    }
}

impl PatternTokenSpec {
    /// Matches any token.
    pub fn any() -> Self {
        PatternTokenSpec::default()
    }

    pub fn literal<S: Into<String>>(text: S) -> Self {
        PredicateSpec::literal(text).into()
    }

    pub fn regex<S: Into<String>>(text: S) -> Self {
        PredicateSpec::regex(text).into()
    }

    pub fn pos<S: Into<String>>(pos: S) -> Self {
        PredicateSpec::pos(pos).into()
    }

    pub fn pos_regex<S: Into<String>>(pos: S) -> Self {
        PredicateSpec::pos_regex(pos).into()
    }

    /// Matches the surface the element at `element` was bound to.
    pub fn reference(element: usize, operator: Option<Match>) -> Self {
        PatternTokenSpec {
            reference: Some(ReferenceSpec {
                element,
                target: ReferenceTarget::Text,
                operator,
            }),
            ..Default::default()
        }
    }

    pub fn with_min(mut self, min: i64) -> Self {
        self.min = min;
        self
    }

    pub fn with_max(mut self, max: i64) -> Self {
        self.max = max;
        self
    }

    pub fn with_skip(mut self, skip: i64) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    pub fn with_pos<S: Into<String>>(mut self, pos: S, regex: bool) -> Self {
        self.predicate.pos = Some(pos.into());
        self.predicate.pos_regex = regex;
        self
    }

    pub fn inflected(mut self) -> Self {
        self.predicate.inflected = true;
        self
    }

    pub fn negated(mut self) -> Self {
        self.predicate.negate = true;
        self
    }

    pub fn pos_negated(mut self) -> Self {
        self.predicate.negate_pos = true;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.predicate.case_sensitive = true;
        self
    }

    pub fn with_exception(mut self, exception: ExceptionSpec) -> Self {
        self.exceptions.push(exception);
        self
    }

    pub fn with_and_member(mut self, member: AndMemberSpec) -> Self {
        self.and_group.push(member);
        self
    }

    pub fn with_chunk(mut self, chunk: ChunkSpec) -> Self {
        self.chunk = Some(chunk);
        self
    }

    pub fn with_unification(mut self, unification: Unification) -> Self {
        self.unification = Some(unification);
        self
    }
}
