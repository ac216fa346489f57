//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. Words
//! and phrases keep their escape sequences verbatim; escape resolution
//! happens when leaf clauses are built.

use std::{iter::Peekable, str::Chars};

use crate::error::LexError;

/// A token kind in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A bare word. Escape sequences are preserved.
    Word(String),

    /// A quoted phrase (quotes stripped, escape sequences preserved).
    Phrase(String),

    /// The AND operator (`AND` or `&&`).
    And,

    /// The OR operator (`OR` or `||`).
    Or,

    /// The NOT keyword.
    Not,

    /// Negation prefix (`!`).
    Bang,

    /// Required-clause prefix (`+`).
    Plus,

    /// Prohibited-clause prefix (`-`).
    Minus,

    /// Field separator (`:`).
    Colon,

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Boost suffix with its factor (e.g. `^2.5`).
    Caret(f32),

    /// Fuzzy or slop suffix with optional value (`~`, `~2`, `~0.7`).
    Tilde(Option<f32>),

    /// Range opening bracket; `[` is inclusive, `{` exclusive.
    RangeOpen {
        /// Whether the lower bound is included.
        inclusive: bool,
    },

    /// Range closing bracket; `]` is inclusive, `}` exclusive.
    RangeClose {
        /// Whether the upper bound is included.
        inclusive: bool,
    },

    /// The TO keyword between range endpoints.
    RangeTo,
}

/// A token with its byte span in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was recognized.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Characters that end a word. `+` and `-` are word characters except at
/// the start of a token, where they are modifier prefixes.
fn ends_word(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '(' | ')' | '"' | ':' | '^' | '~' | '[' | ']' | '{' | '}' | '!'
        )
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
    /// Whether we are between range brackets, where TO is a keyword.
    in_range: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
            in_range: false,
        }
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }

        if self.in_range {
            return Err(LexError::new("unterminated range", self.position));
        }

        Ok(tokens)
    }

    /// Returns the next token, or None at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let start = self.position;
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '"' => return self.read_phrase().map(Some),
            '(' => {
                self.advance();
                TokenKind::LParen
            }
            ')' => {
                self.advance();
                TokenKind::RParen
            }
            '[' => {
                self.advance();
                self.in_range = true;
                TokenKind::RangeOpen { inclusive: true }
            }
            '{' => {
                self.advance();
                self.in_range = true;
                TokenKind::RangeOpen { inclusive: false }
            }
            ']' => {
                self.advance();
                self.in_range = false;
                TokenKind::RangeClose { inclusive: true }
            }
            '}' => {
                self.advance();
                self.in_range = false;
                TokenKind::RangeClose { inclusive: false }
            }
            '+' => {
                self.advance();
                TokenKind::Plus
            }
            '-' => {
                self.advance();
                TokenKind::Minus
            }
            '!' => {
                self.advance();
                TokenKind::Bang
            }
            ':' => {
                self.advance();
                TokenKind::Colon
            }
            '^' => return self.read_boost().map(Some),
            '~' => return self.read_tilde().map(Some),
            _ => return self.read_word().map(Some),
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.position,
        }))
    }

    /// Reads a word, keeping escape sequences, and maps operator keywords.
    fn read_word(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch == '\\' {
                self.advance();
                let Some(&escaped) = self.chars.peek() else {
                    return Err(LexError::new("dangling escape character", start));
                };
                word.push('\\');
                word.push(escaped);
                self.advance();
                continue;
            }
            if ends_word(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        let kind = match word.as_str() {
            "AND" | "&&" => TokenKind::And,
            "OR" | "||" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "TO" if self.in_range => TokenKind::RangeTo,
            _ => TokenKind::Word(word),
        };

        Ok(Token {
            kind,
            start,
            end: self.position,
        })
    }

    /// Reads a quoted phrase; content is kept raw, escapes included.
    fn read_phrase(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance(); // consume closing quote
                    return Ok(Token {
                        kind: TokenKind::Phrase(content),
                        start,
                        end: self.position,
                    });
                }
                Some(&'\\') => {
                    self.advance();
                    let Some(&escaped) = self.chars.peek() else {
                        return Err(LexError::new("dangling escape character", start));
                    };
                    content.push('\\');
                    content.push(escaped);
                    self.advance();
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => {
                    return Err(LexError::new("unterminated phrase", start));
                }
            }
        }
    }

    /// Reads a boost suffix (`^N` or `^N.N`).
    fn read_boost(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume '^'

        let number = self.read_number();
        if number.is_empty() {
            return Err(LexError::new("expected number after '^'", start));
        }

        match number.parse::<f32>() {
            Ok(factor) => Ok(Token {
                kind: TokenKind::Caret(factor),
                start,
                end: self.position,
            }),
            Err(_) => Err(LexError::new(format!("invalid boost value: {number}"), start)),
        }
    }

    /// Reads a fuzzy/slop suffix (`~`, `~2`, `~0.7`).
    fn read_tilde(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // consume '~'

        let number = self.read_number();
        let value = if number.is_empty() {
            None
        } else {
            match number.parse::<f32>() {
                Ok(value) => Some(value),
                Err(_) => {
                    return Err(LexError::new(
                        format!("invalid fuzzy value: {number}"),
                        start,
                    ));
                }
            }
        };

        Ok(Token {
            kind: TokenKind::Tilde(value),
            start,
            end: self.position,
        })
    }

    /// Reads digits with at most one decimal point.
    fn read_number(&mut self) -> String {
        let mut number = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() || (ch == '.' && !number.contains('.')) {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
    }

    /// Skips whitespace characters (space, tab, CR, LF).
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).tokenize()
}
