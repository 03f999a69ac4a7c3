//! Message and suggestion templates.
//!
//! A template is plain text with `\N` back-references to pattern elements (counted from one) and
//! `<suggestion>...</suggestion>` blocks. It is parsed once when the rule is built.

use super::grammar::Match;
use super::Bindings;
use crate::lang::Language;
use crate::types::Token;
use crate::utils;
use crate::Error;
use lazy_static::lazy_static;
use onig::Regex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Part {
    Text(String),
    Reference {
        /// Counted from zero.
        element: usize,
        operator: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Plain(Vec<Part>),
    Suggestion {
        parts: Vec<Part>,
        suppress_misspelled: bool,
    },
}

/// Everything a template needs to expand against one match.
pub(crate) struct FormatContext<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) bindings: Bindings<'a>,
    pub(crate) language: &'a Language,
    /// Uppercase the first character of every suggestion.
    pub(crate) uppercase_suggestions: bool,
}

/// An expanded template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expanded {
    pub(crate) text: String,
    pub(crate) suggestions: Vec<String>,
}

impl Expanded {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub(crate) fn starts_with_comma(&self) -> bool {
        self.suggestions.iter().any(|x| x.starts_with(','))
    }
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    operators: Vec<Match>,
}

fn parse_parts(
    text: &str,
    operators: &[Match],
    counter: &mut usize,
    assigned: &mut Vec<(usize, usize)>,
) -> Vec<Part> {
    lazy_static! {
        static ref BACKREF: Regex = Regex::new(r"\\([1-9][0-9]*)").unwrap();
    }

    let mut parts = Vec::new();
    let mut end_index = 0;

    for caps in BACKREF.captures_iter(text) {
        let (start, end) = match caps.pos(0) {
            Some(pos) => pos,
            None => continue,
        };
        // digits only, but the number can still overflow
        let number: usize = match caps.at(1).and_then(|x| x.parse().ok()) {
            Some(number) => number,
            None => continue,
        };
        let element = number - 1;

        if start > end_index {
            parts.push(Part::Text(text[end_index..start].to_string()));
        }

        let operator = if *counter < operators.len() {
            assigned.push((element, *counter));
            *counter += 1;
            Some(*counter - 1)
        } else {
            assigned
                .iter()
                .find(|(x, _)| *x == element)
                .map(|(_, operator)| *operator)
        };

        parts.push(Part::Reference { element, operator });
        end_index = end;
    }

    if end_index < text.len() {
        parts.push(Part::Text(text[end_index..].to_string()));
    }

    parts
}

/// Appends `value`. A reference which expands to nothing swallows one of the two spaces around it.
fn push_value(output: &mut String, value: &str, next: Option<&Part>) {
    if value.is_empty() && output.ends_with(' ') {
        if let Some(Part::Text(text)) = next {
            if text.starts_with(' ') {
                output.pop();
            }
        }
    }
    output.push_str(value);
}

impl Template {
    /// Parses a template. `operators` are assigned to the back-references in order of appearance.
    pub fn new<S: Into<String>>(source: S, operators: Vec<Match>) -> Self {
        lazy_static! {
            static ref SUGGESTION: Regex =
                Regex::new(r#"<suggestion(\s+suppress_misspelled="yes")?>(.*?)</suggestion>"#).unwrap();
        }

        let source = source.into();
        let mut segments = Vec::new();
        let mut counter = 0;
        let mut assigned = Vec::new();
        let mut end_index = 0;

        for caps in SUGGESTION.captures_iter(&source) {
            let (start, end) = match caps.pos(0) {
                Some(pos) => pos,
                None => continue,
            };

            if start > end_index {
                segments.push(Segment::Plain(parse_parts(
                    &source[end_index..start],
                    &operators,
                    &mut counter,
                    &mut assigned,
                )));
            }
            segments.push(Segment::Suggestion {
                parts: parse_parts(
                    caps.at(2).unwrap_or(""),
                    &operators,
                    &mut counter,
                    &mut assigned,
                ),
                suppress_misspelled: caps.at(1).is_some(),
            });
            end_index = end;
        }

        if end_index < source.len() {
            segments.push(Segment::Plain(parse_parts(
                &source[end_index..],
                &operators,
                &mut counter,
                &mut assigned,
            )));
        }

        Template {
            source,
            segments,
            operators,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn references(&self) -> impl Iterator<Item = (usize, Option<&Match>)> {
        self.segments
            .iter()
            .flat_map(|segment| match segment {
                Segment::Plain(parts) => parts.iter(),
                Segment::Suggestion { parts, .. } => parts.iter(),
            })
            .filter_map(move |part| match part {
                Part::Reference { element, operator } => {
                    Some((*element, operator.and_then(|x| self.operators.get(x))))
                }
                Part::Text(_) => None,
            })
    }

    /// The highest element index referenced, if any.
    pub fn max_reference(&self) -> Option<usize> {
        self.references().map(|(element, _)| element).max()
    }

    /// Whether no operator used in suggestions changes the case of its output.
    pub fn preserves_case(&self) -> bool {
        self.references()
            .filter_map(|(_, operator)| operator)
            .filter(|operator| !operator.is_in_message_only())
            .all(|operator| operator.preserves_case())
    }

    fn values(
        &self,
        element: usize,
        operator: Option<usize>,
        in_suggestion: bool,
        ctx: &FormatContext,
    ) -> Result<(Vec<String>, bool), Error> {
        let index = match ctx.bindings.token_of(element) {
            Some(index) if index < ctx.tokens.len() => index,
            _ => return Ok((vec![String::new()], false)),
        };
        let surface = || vec![ctx.tokens[index].text().to_string()];

        match operator.and_then(|x| self.operators.get(x)) {
            Some(operator) if !(in_suggestion && operator.is_in_message_only()) => {
                let next = ctx.bindings.distance_to_next(element);
                let values = operator.apply(ctx.tokens, index, next, &ctx.bindings, ctx.language)?;
                Ok((values, true))
            }
            _ => Ok((surface(), false)),
        }
    }

    fn expand_plain(&self, parts: &[Part], ctx: &FormatContext) -> Result<String, Error> {
        let mut output = String::new();

        for (i, part) in parts.iter().enumerate() {
            match part {
                Part::Text(text) => output.push_str(text),
                Part::Reference { element, operator } => {
                    let (values, _) = self.values(*element, *operator, false, ctx)?;
                    push_value(&mut output, &values.join(", "), parts.get(i + 1));
                }
            }
        }

        Ok(output)
    }

    /// Expands one suggestion block into all its variants.
    /// `None` if a misspelled variant vetoes the match.
    fn expand_suggestion(
        &self,
        parts: &[Part],
        suppress_misspelled: bool,
        ctx: &FormatContext,
        veto_misspelled: bool,
    ) -> Result<Option<Vec<String>>, Error> {
        let mut copies = vec![String::new()];

        for (i, part) in parts.iter().enumerate() {
            match part {
                Part::Text(text) => copies.iter_mut().for_each(|copy| copy.push_str(text)),
                Part::Reference { element, operator } => {
                    let (mut values, applied) = self.values(*element, *operator, true, ctx)?;

                    if suppress_misspelled && applied {
                        values.retain(|value| {
                            !value.is_empty() && ctx.language.is_known_word(value)
                        });
                        if values.is_empty() {
                            if veto_misspelled {
                                return Ok(None);
                            }
                            return Ok(Some(Vec::new()));
                        }
                    }

                    if let [value] = values.as_slice() {
                        copies
                            .iter_mut()
                            .for_each(|copy| push_value(copy, value, parts.get(i + 1)));
                    } else {
                        copies = copies
                            .iter()
                            .flat_map(|copy| {
                                values.iter().map(move |value| format!("{}{}", copy, value))
                            })
                            .collect();
                    }
                }
            }
        }

        if ctx.uppercase_suggestions {
            copies = copies
                .into_iter()
                .map(|copy| utils::apply_to_first(&copy, |c| c.to_uppercase().collect()))
                .collect();
        }

        Ok(Some(copies))
    }

    /// Expands the template against a match.
    /// With `veto_misspelled`, a `suppress_misspelled` suggestion without valid variants
    /// returns `None`.
    pub(crate) fn expand(
        &self,
        ctx: &FormatContext,
        veto_misspelled: bool,
    ) -> Result<Option<Expanded>, Error> {
        let mut expanded = Expanded::default();

        for segment in &self.segments {
            match segment {
                Segment::Plain(parts) => expanded.text.push_str(&self.expand_plain(parts, ctx)?),
                Segment::Suggestion {
                    parts,
                    suppress_misspelled,
                } => {
                    let copies = match self.expand_suggestion(
                        parts,
                        *suppress_misspelled,
                        ctx,
                        veto_misspelled,
                    )? {
                        Some(copies) => copies,
                        None => return Ok(None),
                    };
                    expanded.text.push_str(&copies.join(", "));
                    expanded.suggestions.extend(copies);
                }
            }
        }

        Ok(Some(expanded))
    }
}
