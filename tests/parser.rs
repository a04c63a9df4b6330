//=============================================
// solvra_expr/tests/parser.rs
//=============================================
// Purpose: Validate interval-reduction parsing, diagnostics and the
//          statement reader's recovery behaviour.
//=============================================

use solvra_expr::ast::{Expr, Operator};
use solvra_expr::parser::{
    MAX_EXPRESSION_DEPTH, ParseError, Parser, parse_expression, parse_statement,
};
use solvra_expr::tokenizer::{LexError, Tokenizer};

fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = Tokenizer::new(source).tokenize()?;
    parse_statement(tokens)
}

fn render(source: &str) -> String {
    parse(source).expect("statement parses").to_string()
}

//=============================================
//            Precedence & Associativity
//=============================================
#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(render("2 + 3 * 4"), "ADD(2, MUL(3, 4))");
    assert_eq!(render("2 * 3 + 4"), "ADD(MUL(2, 3), 4)");
}

#[test]
fn left_associative_chains_split_at_last_operator() {
    assert_eq!(render("8 - 3 - 2"), "SUB(SUB(8, 3), 2)");
    assert_eq!(render("16 / 4 / 2"), "DIV(DIV(16, 4), 2)");
    assert_eq!(render("1 - 2 + 3"), "ADD(SUB(1, 2), 3)");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(render("(2 + 3) * 4"), "MUL(ADD(2, 3), 4)");
    assert_eq!(render("2 * (3 + (4 - 1))"), "MUL(2, ADD(3, SUB(4, 1)))");
}

#[test]
fn precedence_ladder() {
    assert_eq!(
        render("1 || 2 && 3 < 4 & 5 << 6 + 7 * -8"),
        "LOGAND(LOGOR(1, 2), LT(3, BITAND(4, LSHFTL(5, ADD(6, MUL(7, USUB(8)))))))"
    );
}

#[test]
fn signs_are_disambiguated_by_the_token_stream() {
    assert_eq!(render("-3 + 4"), "ADD(USUB(3), 4)");
    assert_eq!(render("3 - -4"), "SUB(3, USUB(4))");
    assert_eq!(render("(1) - +2"), "SUB(1, UADD(2))");
}

#[test]
fn word_operators_are_prefix() {
    assert_eq!(render("sin 0.5 + cos 0.5"), "ADD(SIN(0.5), COS(0.5))");
    assert_eq!(render("log10 (10 * 10)"), "LOG10(MUL(10, 10))");
    assert_eq!(render("ln log2 8"), "LN(LOG2(8))");
}

//=============================================
//            Statements
//=============================================
#[test]
fn print_leads_a_statement_only() {
    assert_eq!(render("print 1 + 2"), "PRINT(ADD(1, 2))");
    assert!(matches!(
        parse("1 + print 2"),
        Err(ParseError::Unsupported { line: 1, .. })
    ));
    assert!(matches!(parse("print"), Err(ParseError::EmptyExpression { .. })));
}

#[test]
fn program_becomes_a_block() {
    let block = Parser::from_source("1; x * 2;\nprint 3")
        .parse_program()
        .expect("program parses");
    assert_eq!(block.to_string(), "BLOCK(1; MUL(x, 2); PRINT(3))");
    assert!(matches!(
        Parser::from_source(" ; ;").parse_program(),
        Err(ParseError::EmptyExpression { .. })
    ));
}

#[test]
fn reader_recovers_after_each_failure() {
    let outcomes: Vec<_> = Parser::from_source("1 +; 2 $ 3; ;; 4").collect();
    assert_eq!(outcomes.len(), 3);
    assert!(matches!(
        outcomes[0],
        Err(ParseError::MissingOperand {
            op: Operator::Add,
            ..
        })
    ));
    assert_eq!(
        outcomes[1],
        Err(ParseError::Lexical(LexError::UnexpectedCharacter {
            ch: '$',
            line: 1
        }))
    );
    assert_eq!(outcomes[2].as_ref().map(ToString::to_string), Ok("4".into()));
}

//=============================================
//            Error Paths
//=============================================
#[test]
fn structural_errors() {
    assert!(matches!(
        parse("(1 + 2"),
        Err(ParseError::UnmatchedParenthesis { .. })
    ));
    assert!(matches!(
        parse("1 +"),
        Err(ParseError::MissingOperand { .. })
    ));
    assert!(matches!(
        parse("1 2"),
        Err(ParseError::ExcessOperands { .. })
    ));
    assert!(matches!(
        parse("* 2"),
        Err(ParseError::MissingOperand {
            op: Operator::Multiply,
            ..
        })
    ));
    assert!(matches!(
        parse("2 (3)"),
        Err(ParseError::ExcessOperands { .. })
    ));
}

#[test]
fn errors_report_the_offending_line() {
    let err = parse("1 +\n\n(2").expect_err("unmatched");
    assert_eq!(err, ParseError::UnmatchedParenthesis { line: 3 });
    assert_eq!(err.line(), 3);

    let err = parse("4 *\n5 6").expect_err("excess");
    assert_eq!(err.line(), 2);
}

#[test]
fn empty_token_run_is_empty_expression() {
    assert!(matches!(
        parse_expression(Vec::new()),
        Err(ParseError::EmptyExpression { .. })
    ));
}

#[test]
fn deep_but_bounded_nesting_parses() {
    let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(render(&source), "1");
    let chain = vec!["1"; 200].join(" + ");
    assert!(parse(&chain).is_ok());
}

#[test]
fn nesting_past_the_default_limit_is_refused() {
    let chain = vec!["1"; MAX_EXPRESSION_DEPTH + 10].join(" + ");
    assert!(matches!(parse(&chain), Err(ParseError::NestingTooDeep { line: 1 })));
    let prefixes = format!("{}1", "- ".repeat(MAX_EXPRESSION_DEPTH + 10));
    assert!(matches!(parse(&prefixes), Err(ParseError::NestingTooDeep { .. })));
}
