//! Fundamental types used by this crate: readings, tokens and sentences.

use serde::{Deserialize, Serialize};

/// The part-of-speech tag carried by the sentence-start sentinel.
pub const SENT_START: &str = "SENT_START";

/// One morphological interpretation of a token.
/// An unknown word has a single reading without lemma and POS tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Reading {
    pub(crate) lemma: Option<String>,
    pub(crate) pos: Option<String>,
}

impl Reading {
    /// Creates a new reading with lemma and POS tag.
    pub fn new<S: Into<String>, P: Into<String>>(lemma: S, pos: P) -> Self {
        Reading {
            lemma: Some(lemma.into()),
            pos: Some(pos.into()),
        }
    }

    /// The reading of a word the tagger does not know.
    pub fn unknown() -> Self {
        Reading::default()
    }

    /// A reading which only has a POS tag.
    pub fn pos_only<P: Into<String>>(pos: P) -> Self {
        Reading {
            lemma: None,
            pos: Some(pos.into()),
        }
    }

    pub fn lemma(&self) -> Option<&str> {
        self.lemma.as_deref()
    }

    pub fn pos(&self) -> Option<&str> {
        self.pos.as_deref()
    }
}

/// A token together with all of its readings.
/// All readings share the surface text stored on the token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub(crate) text: String,
    pub(crate) char_span: (usize, usize),
    pub(crate) readings: Vec<Reading>,
    #[serde(default)]
    pub(crate) chunks: Vec<String>,
    #[serde(default)]
    pub(crate) is_sentence_start: bool,
    #[serde(default)]
    pub(crate) immunized: bool,
    #[serde(default)]
    pub(crate) has_space_before: bool,
    #[serde(default)]
    pub(crate) tagged: bool,
}

impl Token {
    /// Creates a token. Without readings the token gets one unknown reading.
    pub fn new<S: Into<String>>(
        text: S,
        char_span: (usize, usize),
        readings: Vec<Reading>,
    ) -> Self {
        let tagged = readings.iter().any(|reading| reading.pos.is_some());
        let readings = if readings.is_empty() {
            vec![Reading::unknown()]
        } else {
            readings
        };

        Token {
            text: text.into(),
            char_span,
            readings,
            chunks: Vec::new(),
            is_sentence_start: false,
            immunized: false,
            has_space_before: false,
            tagged,
        }
    }

    /// The sentinel placed in front of every sentence.
    pub fn sent_start() -> Self {
        Token {
            is_sentence_start: true,
            ..Token::new("", (0, 0), vec![Reading::pos_only(SENT_START)])
        }
    }

    pub fn with_chunks(mut self, chunks: Vec<String>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_space_before(mut self, has_space_before: bool) -> Self {
        self.has_space_before = has_space_before;
        self
    }

    /// Flags the token so that no rule match can start at it.
    pub fn immunize(&mut self) {
        self.immunized = true;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start and end of the token in characters, relative to the sentence.
    pub fn char_span(&self) -> (usize, usize) {
        self.char_span
    }

    pub fn start(&self) -> usize {
        self.char_span.0
    }

    pub fn end(&self) -> usize {
        self.char_span.1
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn is_sentence_start(&self) -> bool {
        self.is_sentence_start
    }

    pub fn is_immunized(&self) -> bool {
        self.immunized
    }

    pub fn has_space_before(&self) -> bool {
        self.has_space_before
    }

    pub fn is_tagged(&self) -> bool {
        self.tagged
    }
}

/// A sentence: its text and the tokens without whitespace.
/// `tokens()[0]` is the sentence-start sentinel when built by the
/// [Tokenizer][crate::tokenizer::Tokenizer].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    text: String,
    tokens: Vec<Token>,
}

impl Sentence {
    pub fn new<S: Into<String>>(text: S, tokens: Vec<Token>) -> Self {
        Sentence {
            text: text.into(),
            tokens,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Length of the text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
