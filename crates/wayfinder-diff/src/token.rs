#![forbid(unsafe_code)]

//! Tokenization at line, sentence, or word granularity.
//!
//! Every tokenizer covers its input exactly: concatenating the `text` of all
//! tokens reproduces the input. The empty string yields no tokens.
//!
//! | granularity | tokens                                                      |
//! |-------------|-------------------------------------------------------------|
//! | `line`      | one per line, `text` keeps the `\n`, `key` drops it         |
//! | `sentence`  | sentence bodies and `[.!?]+\s+` delimiters, alternating     |
//! | `word`      | runs of non-whitespace and runs of whitespace, alternating  |

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Tokenization unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Granularity {
    #[default]
    Line,
    Sentence,
    Word,
}

impl Granularity {
    /// Parse a granularity name. Anything unrecognized is [`Granularity::Line`].
    #[must_use]
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "sentence" => Self::Sentence,
            "word" => Self::Word,
            _ => Self::Line,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Sentence => "sentence",
            Self::Word => "word",
        }
    }

    /// How many tokens past the cursor the aligner searches for a match.
    #[must_use]
    pub const fn lookahead(self) -> usize {
        match self {
            Self::Line => 5,
            Self::Sentence | Self::Word => 10,
        }
    }

    /// Character count above which an unchanged run is shown as an excerpt.
    #[must_use]
    pub const fn excerpt_threshold(self) -> usize {
        match self {
            Self::Line => 500,
            Self::Sentence | Self::Word => 200,
        }
    }
}

impl FromStr for Granularity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slice of the input with the string it is compared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub key: &'a str,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    const fn plain(text: &'a str) -> Self {
        Self { key: text, text }
    }
}

/// Split `text` into tokens.
#[must_use]
pub fn tokenize(text: &str, granularity: Granularity) -> Vec<Token<'_>> {
    match granularity {
        Granularity::Line => lines(text),
        Granularity::Sentence => sentences(text),
        Granularity::Word => words(text),
    }
}

fn lines(text: &str) -> Vec<Token<'_>> {
    text.split_inclusive('\n')
        .map(|line| Token {
            key: line.strip_suffix('\n').unwrap_or(line),
            text: line,
        })
        .collect()
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// End of the run of chars matching `pred` starting at byte `from`.
fn run_end(text: &str, from: usize, pred: impl Fn(char) -> bool) -> usize {
    text[from..]
        .char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(text.len(), |(offset, _)| from + offset)
}

fn sentences(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < text.len() {
        let Some(c) = text[i..].chars().next() else {
            break;
        };
        if !is_terminal(c) {
            i += c.len_utf8();
            continue;
        }
        let punct_end = run_end(text, i, is_terminal);
        let space_end = run_end(text, punct_end, char::is_whitespace);
        if space_end == punct_end {
            // Terminal punctuation inside a token, e.g. "v1.2" or "...)".
            i = punct_end;
            continue;
        }
        if start < i {
            tokens.push(Token::plain(&text[start..i]));
        }
        tokens.push(Token::plain(&text[i..space_end]));
        start = space_end;
        i = space_end;
    }

    if start < text.len() {
        tokens.push(Token::plain(&text[start..]));
    }
    tokens
}

fn words(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let Some(first) = text[start..].chars().next() else {
            break;
        };
        let end = if first.is_whitespace() {
            run_end(text, start, char::is_whitespace)
        } else {
            run_end(text, start, |c| !c.is_whitespace())
        };
        tokens.push(Token::plain(&text[start..end]));
        start = end;
    }
    tokens
}
