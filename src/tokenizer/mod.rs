//=====================================================
// File: tokenizer/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Pull-based token stream for expression statements
// Objective: Turn source characters into typed tokens with line numbers,
//            parse numeric literals and disambiguate prefix signs
//=====================================================

use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

use crate::ast::Operator;
use crate::number::{self, Fixed};

/// Longest accepted identifier.
pub const MAX_NAME_LENGTH: usize = 252;

/// End-of-transmission, accepted as an end-of-input marker.
const END_OF_TRANSMISSION: char = '\u{4}';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character {ch:?}")]
    UnexpectedCharacter { ch: char, line: usize },
    #[error("name of {length} characters exceeds the limit of {MAX_NAME_LENGTH}")]
    NameTooLong { length: usize, line: usize },
    #[error("malformed numeric literal '{text}'")]
    MalformedLiteral { text: String, line: usize },
}

impl LexError {
    pub fn line(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { line, .. }
            | LexError::NameTooLong { line, .. }
            | LexError::MalformedLiteral { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(Fixed),
    Label(String),
    Operator(Operator),
    LeftParen,
    RightParen,
    Print,
    Assign,
    EndOfStatement,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }
}

/// Produces one token per call. Numeric literals arrive already converted to
/// [`Fixed`]; `+` and `-` arrive as binary operators only when the previous
/// token was a number, a name or a closing parenthesis.
///
/// Characters are pulled lazily and a `;` is returned without looking
/// further ahead, so a statement completes as soon as its terminator has
/// been read.
pub struct Tokenizer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    line: usize,
    after_operand: bool,
    finished: bool,
}

impl<'a> Tokenizer<Chars<'a>> {
    pub fn new(source: &'a str) -> Self {
        Self::from_chars(source.chars())
    }
}

impl<I: Iterator<Item = char>> Tokenizer<I> {
    pub fn from_chars(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            line: 1,
            after_operand: false,
            finished: false,
        }
    }

    /// Current line, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Drain the whole source, stopping at the first lexical error.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        self.collect()
    }

    /// Next token, or an `EndOfInput` token once the source is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        loop {
            let Some(ch) = self.chars.next() else {
                return Ok(self.finish());
            };
            let line = self.line;
            let kind = match ch {
                END_OF_TRANSMISSION => return Ok(self.finish()),
                '\n' => {
                    self.line += 1;
                    continue;
                }
                '#' => {
                    self.skip_comment();
                    continue;
                }
                c if c.is_whitespace() => continue,
                ';' => TokenKind::EndOfStatement,
                '(' => TokenKind::LeftParen,
                ')' => TokenKind::RightParen,
                '+' => self.signed(Operator::Add, Operator::Plus),
                '-' => self.signed(Operator::Subtract, Operator::Minus),
                '*' => TokenKind::Operator(Operator::Multiply),
                '%' => TokenKind::Operator(Operator::Modulo),
                '^' => TokenKind::Operator(Operator::BitXor),
                '~' => TokenKind::Operator(Operator::BitNot),
                '/' => TokenKind::Operator(if self.eat('/') {
                    Operator::FloorDivide
                } else {
                    Operator::Divide
                }),
                '<' => TokenKind::Operator(self.less_family()),
                '>' => TokenKind::Operator(self.greater_family()),
                '=' => {
                    if self.eat('=') {
                        TokenKind::Operator(Operator::Equal)
                    } else {
                        TokenKind::Assign
                    }
                }
                '&' => TokenKind::Operator(if self.eat('&') {
                    Operator::And
                } else {
                    Operator::BitAnd
                }),
                '|' => TokenKind::Operator(if self.eat('|') {
                    Operator::Or
                } else {
                    Operator::BitOr
                }),
                '!' => TokenKind::Operator(if self.eat('=') {
                    Operator::NotEqual
                } else {
                    Operator::Not
                }),
                c if c.is_ascii_alphabetic() => self.word(c, line)?,
                c if c.is_ascii_digit() => self.number(c, line)?,
                other => return Err(LexError::UnexpectedCharacter { ch: other, line }),
            };
            self.after_operand = matches!(
                kind,
                TokenKind::Number(_) | TokenKind::Label(_) | TokenKind::RightParen
            );
            return Ok(Token::new(kind, line));
        }
    }

    fn finish(&mut self) -> Token {
        self.finished = true;
        Token::new(TokenKind::EndOfInput, self.line)
    }

    fn eat(&mut self, expected: char) -> bool {
        self.chars.next_if_eq(&expected).is_some()
    }

    fn signed(&self, binary: Operator, prefix: Operator) -> TokenKind {
        TokenKind::Operator(if self.after_operand { binary } else { prefix })
    }

    fn less_family(&mut self) -> Operator {
        if self.eat('<') {
            if self.eat('<') {
                Operator::ArithShiftLeft
            } else {
                Operator::ShiftLeft
            }
        } else if self.eat('=') {
            if self.eat('>') {
                Operator::Compare
            } else {
                Operator::LessEqual
            }
        } else {
            Operator::Less
        }
    }

    fn greater_family(&mut self) -> Operator {
        if self.eat('>') {
            if self.eat('>') {
                Operator::ArithShiftRight
            } else {
                Operator::ShiftRight
            }
        } else if self.eat('=') {
            Operator::GreaterEqual
        } else {
            Operator::Greater
        }
    }

    fn skip_comment(&mut self) {
        while self.chars.next_if(|&c| c != '\n').is_some() {}
    }

    fn word(&mut self, first: char, line: usize) -> Result<TokenKind, LexError> {
        let mut name = String::from(first);
        while let Some(c) = self.chars.next_if(|c| c.is_ascii_alphanumeric() || *c == '_') {
            name.push(c);
        }
        if name == "print" {
            return Ok(TokenKind::Print);
        }
        if let Some(op) = Operator::from_keyword(&name) {
            return Ok(TokenKind::Operator(op));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(LexError::NameTooLong {
                length: name.len(),
                line,
            });
        }
        Ok(TokenKind::Label(name))
    }

    // Everything glued to the digits belongs to the literal, so `1.2.3` and
    // `12ab` are reported as malformed rather than split.
    fn number(&mut self, first: char, line: usize) -> Result<TokenKind, LexError> {
        let mut text = String::from(first);
        while let Some(c) = self
            .chars
            .next_if(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
        {
            text.push(c);
        }
        number::parse_literal(&text)
            .map(TokenKind::Number)
            .map_err(|_| LexError::MalformedLiteral { text, line })
    }
}

impl<I: Iterator<Item = char>> Iterator for Tokenizer<I> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::EndOfInput => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Tokenizer::new(source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn signs_follow_previous_token() {
        assert_eq!(
            kinds("-3 + 4"),
            vec![
                TokenKind::Operator(Operator::Minus),
                TokenKind::Number(Fixed::from_int(3)),
                TokenKind::Operator(Operator::Add),
                TokenKind::Number(Fixed::from_int(4)),
            ]
        );
        assert_eq!(
            kinds("3 - -4")[1..3],
            [
                TokenKind::Operator(Operator::Subtract),
                TokenKind::Operator(Operator::Minus),
            ]
        );
        assert_eq!(
            kinds("(1) - x - 2")
                .iter()
                .filter(|kind| **kind == TokenKind::Operator(Operator::Subtract))
                .count(),
            2
        );
    }

    #[test]
    fn multi_character_operators() {
        assert_eq!(
            kinds("<<< << <=> <= < >>> >> >= > // == != && || = !"),
            vec![
                TokenKind::Operator(Operator::ArithShiftLeft),
                TokenKind::Operator(Operator::ShiftLeft),
                TokenKind::Operator(Operator::Compare),
                TokenKind::Operator(Operator::LessEqual),
                TokenKind::Operator(Operator::Less),
                TokenKind::Operator(Operator::ArithShiftRight),
                TokenKind::Operator(Operator::ShiftRight),
                TokenKind::Operator(Operator::GreaterEqual),
                TokenKind::Operator(Operator::Greater),
                TokenKind::Operator(Operator::FloorDivide),
                TokenKind::Operator(Operator::Equal),
                TokenKind::Operator(Operator::NotEqual),
                TokenKind::Operator(Operator::And),
                TokenKind::Operator(Operator::Or),
                TokenKind::Assign,
                TokenKind::Operator(Operator::Not),
            ]
        );
    }

    #[test]
    fn keywords_comments_and_lines() {
        let tokens = Tokenizer::new("print sin x # trailing words\n; 2.5\u{4} 99")
            .tokenize()
            .expect("tokenize");
        let kinds: Vec<_> = tokens.iter().map(|token| token.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Print,
                TokenKind::Operator(Operator::Sin),
                TokenKind::Label("x".into()),
                TokenKind::EndOfStatement,
                TokenKind::Number(Fixed::from_f64(2.5)),
            ]
        );
        assert_eq!(tokens[3].line, 2);
    }

    #[test]
    fn lexical_errors_carry_lines() {
        let long_name = "a".repeat(MAX_NAME_LENGTH + 1);
        let err = Tokenizer::new(&format!("1 +\n{long_name}"))
            .tokenize()
            .expect_err("name too long");
        assert_eq!(
            err,
            LexError::NameTooLong {
                length: MAX_NAME_LENGTH + 1,
                line: 2
            }
        );
        assert!(Tokenizer::new(&"b".repeat(MAX_NAME_LENGTH)).tokenize().is_ok());

        let err = Tokenizer::new("1.2.3").tokenize().expect_err("malformed");
        assert!(matches!(err, LexError::MalformedLiteral { ref text, line: 1 } if text == "1.2.3"));

        let err = Tokenizer::new("2 $ 3").tokenize().expect_err("bad char");
        assert_eq!(err, LexError::UnexpectedCharacter { ch: '$', line: 1 });
    }

    #[test]
    fn terminator_does_not_wait_for_more_input() {
        let mut pulled = 0;
        let source = "2;\n3";
        let chars = source.chars().inspect(|_| pulled += 1);
        let mut tokenizer = Tokenizer::from_chars(chars);
        assert!(matches!(tokenizer.next_token().unwrap().kind, TokenKind::Number(_)));
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::EndOfStatement);
        drop(tokenizer);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn end_of_input_repeats_for_pull_callers() {
        let mut tokenizer = Tokenizer::new("7");
        assert!(matches!(tokenizer.next_token().unwrap().kind, TokenKind::Number(_)));
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::EndOfInput);
        assert_eq!(tokenizer.next_token().unwrap().kind, TokenKind::EndOfInput);
    }
}

//=====================================================
// End of file
//=====================================================
