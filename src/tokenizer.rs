//! Splits sentences into tokens and attaches dictionary readings.
//! Only meant to get tokens into the shape the rule matcher expects;
//! real applications bring their own analysis.

pub mod tag;

use crate::types::{Sentence, Token};
use std::sync::Arc;
use tag::Tagger;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Default, Clone)]
pub struct Tokenizer {
    tagger: Arc<Tagger>,
}

impl Tokenizer {
    pub fn new(tagger: Arc<Tagger>) -> Self {
        Tokenizer { tagger }
    }

    pub fn tagger(&self) -> &Arc<Tagger> {
        &self.tagger
    }

    /// Tokenizes one sentence on word boundaries. Whitespace is not kept as tokens,
    /// it is recorded as `has_space_before` on the following token.
    pub fn tokenize(&self, text: &str) -> Sentence {
        let mut tokens = vec![Token::sent_start()];
        let mut char_start = 0;
        let mut space_before = false;

        for word in text.split_word_bounds() {
            let char_len = word.chars().count();

            if word.trim().is_empty() {
                space_before = true;
            } else {
                let char_span = (char_start, char_start + char_len);
                tokens.push(
                    Token::new(word, char_span, self.tagger.get_tags(word))
                        .with_space_before(space_before),
                );
                space_before = false;
            }

            char_start += char_len;
        }

        Sentence::new(text, tokens)
    }
}
