//! Match operators: how a back-reference turns the token it is bound to into text.

use super::Bindings;
use crate::lang::Language;
use crate::types::{Token, SENT_START};
use crate::utils::{self, regex::SerializeRegex};
use crate::Error;
use onig::Captures;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseConversion {
    None,
    AllLower,
    StartLower,
    AllUpper,
    StartUpper,
    /// Copies the case pattern of the bound token.
    Preserve,
}

impl Default for CaseConversion {
    fn default() -> Self {
        CaseConversion::None
    }
}

impl CaseConversion {
    fn convert(&self, input: &str, sample: &str) -> String {
        match &self {
            CaseConversion::None => input.to_string(),
            CaseConversion::AllLower => input.to_lowercase(),
            CaseConversion::StartLower => {
                utils::apply_to_first(input, |c| c.to_lowercase().collect())
            }
            CaseConversion::AllUpper => input.to_uppercase(),
            CaseConversion::StartUpper => {
                utils::apply_to_first(input, |c| c.to_uppercase().collect())
            }
            CaseConversion::Preserve => {
                if utils::is_all_uppercase(sample) {
                    input.to_uppercase()
                } else if utils::starts_with_uppercase(sample) {
                    utils::apply_to_first(input, |c| c.to_uppercase().collect())
                } else {
                    input.to_lowercase()
                }
            }
        }
    }

    fn preserves_case(&self) -> bool {
        matches!(self, CaseConversion::None | CaseConversion::Preserve)
    }
}

/// Which of the tokens between the bound token and the next element are part of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeRange {
    None,
    /// Only the tokens in between.
    Following,
    /// The bound token followed by the tokens in between.
    All,
}

impl Default for IncludeRange {
    fn default() -> Self {
        IncludeRange::None
    }
}

/// Copies features of another bound token into the synthesis target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCopy {
    pub(crate) element: usize,
    pub(crate) regex: SerializeRegex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Synthesis {
    pub(crate) source: Option<SerializeRegex>,
    pub(crate) target: String,
    pub(crate) features: Option<FeatureCopy>,
}

impl Synthesis {
    fn feature_groups(&self, tokens: &[Token], bindings: &Bindings) -> Vec<String> {
        let copy = match &self.features {
            Some(copy) => copy,
            None => return Vec::new(),
        };

        bindings
            .token_of(copy.element)
            .and_then(|index| tokens.get(index))
            .and_then(|token| {
                token.readings().iter().find_map(|reading| {
                    reading
                        .pos()
                        .and_then(|pos| copy.regex.captures(pos))
                        .map(|caps| utils::capture_groups(&caps))
                })
            })
            .unwrap_or_else(|| vec![String::new(); copy.regex.captures_len()])
    }

    fn apply(
        &self,
        token: &Token,
        tokens: &[Token],
        bindings: &Bindings,
        language: &Language,
    ) -> Result<Vec<String>, Error> {
        let feature_groups = self.feature_groups(tokens, bindings);
        let mut forms: Vec<String> = Vec::new();

        for reading in token.readings() {
            let pos = match reading.pos() {
                Some(pos) if pos != SENT_START => pos,
                _ => continue,
            };
            let source_groups = match &self.source {
                Some(regex) => match regex.captures(pos) {
                    Some(caps) => utils::capture_groups(&caps),
                    None => continue,
                },
                None => Vec::new(),
            };

            let target = utils::sigil_replace(self.target.clone(), '$', &source_groups);
            let target = utils::sigil_replace(target, '%', &feature_groups);
            let lemma = reading.lemma().unwrap_or_else(|| token.text());

            for form in language.synthesize(lemma, &target)? {
                if !forms.contains(&form) {
                    forms.push(form);
                }
            }
        }

        if forms.is_empty() {
            forms.push(String::new());
        }
        Ok(forms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchMode {
    Surface,
    Lemma,
    RegexReplace {
        regex: SerializeRegex,
        replacement: String,
    },
    Synthesize(Synthesis),
}

/// A directive attached to a back-reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub(crate) mode: MatchMode,
    #[serde(default)]
    pub(crate) conversion: CaseConversion,
    #[serde(default)]
    pub(crate) include_range: IncludeRange,
    #[serde(default)]
    pub(crate) in_message_only: bool,
}

impl Match {
    fn new(mode: MatchMode) -> Self {
        Match {
            mode,
            conversion: CaseConversion::None,
            include_range: IncludeRange::None,
            in_message_only: false,
        }
    }

    pub fn surface() -> Self {
        Match::new(MatchMode::Surface)
    }

    pub fn lemma() -> Self {
        Match::new(MatchMode::Lemma)
    }

    /// Replaces every match of `regex` in the surface.
    /// `$N` in the replacement refers to the N-th group.
    pub fn regex_replace<S: Into<String>>(regex: &str, replacement: S) -> Result<Self, Error> {
        Ok(Match::new(MatchMode::RegexReplace {
            regex: SerializeRegex::new(regex, false, true)?,
            replacement: replacement.into(),
        }))
    }

    /// Inflects the bound token into all forms whose tag matches `target`.
    /// Only readings whose tag matches `source` are inflected; `$N` in `target` refers to the
    /// N-th group of `source`.
    pub fn synthesize<S: Into<String>>(source: Option<&str>, target: S) -> Result<Self, Error> {
        Ok(Match::new(MatchMode::Synthesize(Synthesis {
            source: source
                .map(|source| SerializeRegex::new(source, true, true))
                .transpose()?,
            target: target.into(),
            features: None,
        })))
    }

    /// `%N` in the synthesis target refers to the N-th group of `regex` on the tag of the token
    /// bound to `element`.
    ///
    /// # Errors
    /// If this is not a synthesizing operator or the regex does not compile.
    pub fn with_feature_copy(mut self, element: usize, regex: &str) -> Result<Self, Error> {
        match &mut self.mode {
            MatchMode::Synthesize(synthesis) => {
                synthesis.features = Some(FeatureCopy {
                    element,
                    regex: SerializeRegex::new(regex, true, true)?,
                });
                Ok(self)
            }
            _ => Err(Error::InvalidSpec("features can only be copied into a synthesis".into())),
        }
    }

    pub fn with_conversion(mut self, conversion: CaseConversion) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn with_include_range(mut self, include_range: IncludeRange) -> Self {
        self.include_range = include_range;
        self
    }

    /// Only applied in messages. Inside a suggestion the reference expands to the plain surface.
    pub fn in_message_only(mut self) -> Self {
        self.in_message_only = true;
        self
    }

    pub fn is_in_message_only(&self) -> bool {
        self.in_message_only
    }

    pub fn conversion(&self) -> CaseConversion {
        self.conversion
    }

    pub(crate) fn preserves_case(&self) -> bool {
        self.conversion.preserves_case()
    }

    pub(crate) fn feature_element(&self) -> Option<usize> {
        match &self.mode {
            MatchMode::Synthesize(Synthesis {
                features: Some(copy),
                ..
            }) => Some(copy.element),
            _ => None,
        }
    }

    /// Applies the operator to `tokens[index]`.
    /// `next` is the distance to the token bound by the next element.
    pub(crate) fn apply(
        &self,
        tokens: &[Token],
        index: usize,
        next: usize,
        bindings: &Bindings,
        language: &Language,
    ) -> Result<Vec<String>, Error> {
        let token = match tokens.get(index) {
            Some(token) => token,
            None => return Ok(vec![String::new()]),
        };
        let text = token.text();

        let forms = match &self.mode {
            MatchMode::Surface => vec![text.to_string()],
            MatchMode::Lemma => {
                let mut lemmas: Vec<String> = Vec::new();
                for lemma in token.readings().iter().filter_map(|x| x.lemma()) {
                    if !lemmas.iter().any(|x| x == lemma) {
                        lemmas.push(lemma.to_string());
                    }
                }
                if lemmas.is_empty() {
                    lemmas.push(text.to_string());
                }
                lemmas
            }
            MatchMode::RegexReplace { regex, replacement } => {
                vec![regex.replace_all(text, |caps: &Captures| {
                    utils::dollar_replace(replacement.to_string(), caps)
                })]
            }
            MatchMode::Synthesize(synthesis) => synthesis.apply(token, tokens, bindings, language)?,
        };

        let mut forms: Vec<String> = forms
            .into_iter()
            .map(|form| self.conversion.convert(&form, text))
            .collect();

        match self.include_range {
            IncludeRange::None => {}
            IncludeRange::Following => {
                let skipped = skipped_text(tokens, index, next, true, language);
                if !skipped.is_empty() {
                    forms = vec![skipped];
                }
            }
            IncludeRange::All => {
                let skipped = skipped_text(tokens, index, next, false, language);
                for form in forms.iter_mut() {
                    form.push_str(&skipped);
                }
            }
        }

        Ok(forms)
    }
}

/// Text of the tokens strictly between `tokens[index]` and `tokens[index + next]`.
fn skipped_text(
    tokens: &[Token],
    index: usize,
    next: usize,
    following: bool,
    language: &Language,
) -> String {
    let separator = &language.options().word_separator;
    let end = (index + next).min(tokens.len());
    let mut output = String::new();

    for (j, token) in tokens.iter().enumerate().take(end).skip(index + 1) {
        if token.has_space_before() && !(following && j == index + 1) {
            output.push_str(separator);
        }
        output.push_str(token.text());
    }

    output
}
