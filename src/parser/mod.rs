//=====================================================
// File: parser/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Interval-reduction expression parser
// Objective: Rebuild an expression tree from a flat token run by splitting
//            at the loosest-binding operator and collapsing parenthesised
//            spans, plus a statement reader over a pull-based token stream
//=====================================================

//=====================================================
//            Section 1: Imports & Limits
//=====================================================

use std::str::Chars;

use thiserror::Error;
use tracing::trace;

use crate::ast::{Expr, Operator};
use crate::tokenizer::{LexError, Token, TokenKind, Tokenizer};

/// Recursion guard for nested groups and operator chains. Each level costs
/// a few kilobytes of stack in debug builds, so this stays well inside a
/// 2 MiB thread.
pub const MAX_EXPRESSION_DEPTH: usize = 256;

//=====================================================
//            Section 2: Parse Errors
//=====================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unmatched parenthesis")]
    UnmatchedParenthesis { line: usize },
    #[error("operator '{op}' is missing an operand")]
    MissingOperand { op: Operator, line: usize },
    #[error("prefix operator '{op}' follows an operand")]
    ExtraOperand { op: Operator, line: usize },
    #[error("operands without an operator between them")]
    ExcessOperands { line: usize },
    #[error("empty expression")]
    EmptyExpression { line: usize },
    #[error("{construct} is not supported here")]
    Unsupported { construct: &'static str, line: usize },
    #[error("expression nests too deeply")]
    NestingTooDeep { line: usize },
    #[error(transparent)]
    Lexical(#[from] LexError),
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnmatchedParenthesis { line }
            | ParseError::MissingOperand { line, .. }
            | ParseError::ExtraOperand { line, .. }
            | ParseError::ExcessOperands { line }
            | ParseError::EmptyExpression { line }
            | ParseError::Unsupported { line, .. }
            | ParseError::NestingTooDeep { line } => *line,
            ParseError::Lexical(err) => err.line(),
        }
    }
}

//=====================================================
//            Section 3: Interval Reduction
//=====================================================

/// One slot of the working sequence. Operands are complete; operators and
/// group markers are incomplete until reduced.
#[derive(Debug)]
enum Item {
    Operand(Expr),
    Operator { op: Operator, line: usize },
    Open { line: usize },
    Close { line: usize },
}

impl Item {
    fn from_token(token: Token) -> Result<Self, ParseError> {
        let line = token.line;
        Ok(match token.kind {
            TokenKind::Number(value) => Item::Operand(Expr::number(value, line)),
            TokenKind::Label(name) => Item::Operand(Expr::Variable { name, line }),
            TokenKind::Operator(op) => Item::Operator { op, line },
            TokenKind::LeftParen => Item::Open { line },
            TokenKind::RightParen => Item::Close { line },
            TokenKind::Print => {
                return Err(ParseError::Unsupported {
                    construct: "print inside an expression",
                    line,
                });
            }
            TokenKind::Assign => {
                return Err(ParseError::Unsupported {
                    construct: "assignment",
                    line,
                });
            }
            TokenKind::EndOfStatement | TokenKind::EndOfInput => {
                return Err(ParseError::Unsupported {
                    construct: "statement terminator inside an expression",
                    line,
                });
            }
        })
    }

    fn line(&self) -> usize {
        match self {
            Item::Operand(expr) => expr.line(),
            Item::Operator { line, .. } | Item::Open { line } | Item::Close { line } => *line,
        }
    }
}

enum Selection {
    Group(usize),
    Split { index: usize, op: Operator, line: usize },
}

#[derive(Debug, Clone, Copy)]
struct Reducer {
    max_depth: usize,
}

impl Reducer {
    fn statement(self, tokens: Vec<Token>) -> Result<Expr, ParseError> {
        let Some(first) = tokens.first() else {
            return Err(ParseError::EmptyExpression { line: 1 });
        };
        let line = first.line;
        if first.kind == TokenKind::Print {
            let operand = self.expression(tokens.into_iter().skip(1), line)?;
            return Ok(Expr::print(operand, line));
        }
        self.expression(tokens, line)
    }

    fn expression(
        self,
        tokens: impl IntoIterator<Item = Token>,
        line: usize,
    ) -> Result<Expr, ParseError> {
        let items = tokens
            .into_iter()
            .map(Item::from_token)
            .collect::<Result<Vec<_>, _>>()?;
        self.reduce(items, 0, line)
    }

    fn reduce(self, mut items: Vec<Item>, depth: usize, line: usize) -> Result<Expr, ParseError> {
        if depth > self.max_depth {
            return Err(ParseError::NestingTooDeep { line });
        }
        loop {
            match select(&items)? {
                None => return finish(items, line),
                Some(Selection::Group(start)) => {
                    let close = matching_close(&items, start)?;
                    let line = items[start].line();
                    let mut inner: Vec<Item> = items.drain(start + 1..=close).collect();
                    inner.pop();
                    let expr = self.reduce(inner, depth + 1, line)?;
                    items[start] = Item::Operand(expr);
                }
                Some(Selection::Split { index, op, line }) => {
                    trace!(%op, index, depth, "split");
                    let right = items.split_off(index + 1);
                    items.truncate(index);
                    return self.build(op, items, right, depth, line);
                }
            }
        }
    }

    fn build(
        self,
        op: Operator,
        left: Vec<Item>,
        right: Vec<Item>,
        depth: usize,
        line: usize,
    ) -> Result<Expr, ParseError> {
        if op.is_unary() {
            if !left.is_empty() {
                return Err(ParseError::ExtraOperand { op, line });
            }
            if right.is_empty() {
                return Err(ParseError::MissingOperand { op, line });
            }
            let operand = self.reduce(right, depth + 1, line)?;
            return Ok(Expr::unary(op, operand, line));
        }
        if left.is_empty() || right.is_empty() {
            return Err(ParseError::MissingOperand { op, line });
        }
        let left = self.reduce(left, depth + 1, line)?;
        let right = self.reduce(right, depth + 1, line)?;
        Ok(Expr::binary(op, left, right, line))
    }
}

// Groups win as soon as one is seen, so every parenthesised span is
// collapsed before any operator splits the sequence. A close marker met
// before any open therefore has no partner.
fn select(items: &[Item]) -> Result<Option<Selection>, ParseError> {
    let mut loosest: Option<(usize, Operator, usize)> = None;
    for (index, item) in items.iter().enumerate() {
        match item {
            Item::Open { .. } => return Ok(Some(Selection::Group(index))),
            Item::Close { line } => return Err(ParseError::UnmatchedParenthesis { line: *line }),
            Item::Operator { op, line } => {
                if loosest.is_none_or(|(_, current, _)| op.binds_looser_than(current)) {
                    loosest = Some((index, *op, *line));
                }
            }
            Item::Operand(_) => {}
        }
    }
    Ok(loosest.map(|(index, op, line)| Selection::Split { index, op, line }))
}

fn matching_close(items: &[Item], start: usize) -> Result<usize, ParseError> {
    let mut depth = 0usize;
    for (index, item) in items.iter().enumerate().skip(start) {
        match item {
            Item::Open { .. } => depth += 1,
            Item::Close { .. } => {
                depth -= 1;
                if depth == 0 {
                    return Ok(index);
                }
            }
            _ => {}
        }
    }
    Err(ParseError::UnmatchedParenthesis {
        line: items[start].line(),
    })
}

// `select` has already reduced every marker and operator, so only operands
// are left here.
fn finish(items: Vec<Item>, line: usize) -> Result<Expr, ParseError> {
    let mut operands = items.into_iter().filter_map(|item| match item {
        Item::Operand(expr) => Some(expr),
        Item::Operator { .. } | Item::Open { .. } | Item::Close { .. } => None,
    });
    match (operands.next(), operands.next()) {
        (None, _) => Err(ParseError::EmptyExpression { line }),
        (Some(expr), None) => Ok(expr),
        (Some(_), Some(extra)) => Err(ParseError::ExcessOperands { line: extra.line() }),
    }
}

//=====================================================
//            Section 4: Public Entry Points
//=====================================================

/// Parse one expression from a finite token run holding no terminator.
pub fn parse_expression(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    let line = tokens.first().map_or(1, |token| token.line);
    Reducer {
        max_depth: MAX_EXPRESSION_DEPTH,
    }
    .expression(tokens, line)
}

/// Parse one statement: an expression, optionally led by `print`.
pub fn parse_statement(tokens: Vec<Token>) -> Result<Expr, ParseError> {
    Reducer {
        max_depth: MAX_EXPRESSION_DEPTH,
    }
    .statement(tokens)
}

/// Statement reader over a pull-based token stream.
///
/// Each call to [`Parser::next_statement`] gathers tokens up to the next `;`
/// (or the end of input) and parses them. A failed statement is discarded
/// through its terminator so the following one starts clean; empty
/// statements are skipped.
pub struct Parser<I> {
    tokens: I,
    reducer: Reducer,
    finished: bool,
}

impl<'a> Parser<Tokenizer<Chars<'a>>> {
    pub fn from_source(source: &'a str) -> Self {
        Parser::new(Tokenizer::new(source))
    }
}

impl<C> Parser<Tokenizer<C>>
where
    C: Iterator<Item = char>,
{
    /// Read statements from a character stream that may still be arriving,
    /// such as an interactive terminal.
    pub fn from_chars(chars: C) -> Self {
        Parser::new(Tokenizer::from_chars(chars))
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            reducer: Reducer {
                max_depth: MAX_EXPRESSION_DEPTH,
            },
            finished: false,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.reducer.max_depth = max_depth;
        self
    }

    pub fn next_statement(&mut self) -> Option<Result<Expr, ParseError>> {
        while !self.finished {
            let mut statement = Vec::new();
            loop {
                match self.tokens.next() {
                    None => {
                        self.finished = true;
                        break;
                    }
                    Some(Err(err)) => {
                        self.skip_statement();
                        return Some(Err(err.into()));
                    }
                    Some(Ok(token)) => match token.kind {
                        TokenKind::EndOfStatement => break,
                        TokenKind::EndOfInput => {
                            self.finished = true;
                            break;
                        }
                        _ => statement.push(token),
                    },
                }
            }
            if !statement.is_empty() {
                return Some(self.reducer.statement(statement));
            }
        }
        None
    }

    /// Parse every statement into one block, stopping at the first error.
    pub fn parse_program(mut self) -> Result<Expr, ParseError> {
        let mut statements = Vec::new();
        while let Some(statement) = self.next_statement() {
            statements.push(statement?);
        }
        let Some(line) = statements.first().map(Expr::line) else {
            return Err(ParseError::EmptyExpression { line: 1 });
        };
        Ok(Expr::Block { statements, line })
    }

    fn skip_statement(&mut self) {
        loop {
            match self.tokens.next() {
                None => {
                    self.finished = true;
                    return;
                }
                Some(Ok(token)) if token.kind == TokenKind::EndOfStatement => return,
                Some(Ok(token)) if token.kind == TokenKind::EndOfInput => {
                    self.finished = true;
                    return;
                }
                Some(_) => {}
            }
        }
    }
}

impl<I> Iterator for Parser<I>
where
    I: Iterator<Item = Result<Token, LexError>>,
{
    type Item = Result<Expr, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_statement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Expr, ParseError> {
        let tokens = Tokenizer::new(source).tokenize()?;
        parse_statement(tokens)
    }

    #[test]
    fn nested_groups_collapse_inside_out() {
        let expr = parse("((1 + 2)) * (3 - (4))").unwrap();
        assert_eq!(expr.to_string(), "MUL(ADD(1, 2), SUB(3, 4))");
    }

    #[test]
    fn prefix_chains_nest_rightward() {
        assert_eq!(parse("- - 3").unwrap().to_string(), "USUB(USUB(3))");
        assert_eq!(parse("!~1").unwrap().to_string(), "LOGNOT(BITNOT(1))");
        assert_eq!(parse("sin x * 2").unwrap().to_string(), "MUL(SIN(x), 2)");
    }

    #[test]
    fn prefix_after_operand_is_rejected() {
        assert!(matches!(
            parse("3 ~ 4"),
            Err(ParseError::ExtraOperand {
                op: Operator::BitNot,
                ..
            })
        ));
    }

    #[test]
    fn stray_close_and_empty_group() {
        assert!(matches!(
            parse("1 + 2)"),
            Err(ParseError::UnmatchedParenthesis { .. })
        ));
        assert!(matches!(parse("()"), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(parse("x = 1"), Err(ParseError::Unsupported { .. })));
    }

    #[test]
    fn leftover_operands_report_the_extra_one() {
        assert_eq!(
            parse("1 2\n3"),
            Err(ParseError::ExcessOperands { line: 1 })
        );
        assert_eq!(
            parse("(1)\n(2)"),
            Err(ParseError::ExcessOperands { line: 2 })
        );
    }

    #[test]
    fn depth_limit_is_enforced() {
        let source = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        let tokens = Tokenizer::new(&source).tokenize().unwrap();
        let mut parser = Parser::new(tokens.into_iter().map(Ok)).with_max_depth(16);
        assert!(matches!(
            parser.next_statement(),
            Some(Err(ParseError::NestingTooDeep { .. }))
        ));
    }
}

//=====================================================
// End of file
//=====================================================
