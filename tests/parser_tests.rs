use staq::ast::{Expr, Stmt};
use staq::lexer::tokenize;
use staq::parser::{Parser, ParseErrorKind};

fn parse_src(src: &str) -> staq::ast::Program {
    Parser::new(tokenize(src))
        .parse_program()
        .expect("parser should succeed")
}

fn parsed_form(src: &str) -> String {
    parse_src(src).to_string()
}

#[test]
fn parses_let_and_const_statements() {
    let program = parse_src("let x = 5; const y = 10;");

    assert_eq!(
        program.statements[0],
        Stmt::Let {
            name: "x".to_string(),
            value: Expr::IntegerLiteral(5),
        }
    );
    assert_eq!(
        program.statements[1],
        Stmt::Const {
            name: "y".to_string(),
            value: Expr::IntegerLiteral(10),
        }
    );
}

#[test]
fn parses_return_statement() {
    let program = parse_src("return 2 + 3;");
    match &program.statements[0] {
        Stmt::Return(Expr::Infix { .. }) => {}
        other => panic!("expected return statement, got {other:?}"),
    }
}

#[test]
fn product_binds_tighter_than_sum() {
    assert_eq!(parsed_form("a + b * c;"), "(a + (b * c));");
    assert_eq!(parsed_form("a * b + c;"), "((a * b) + c);");
}

#[test]
fn prefix_binds_tighter_than_product() {
    assert_eq!(parsed_form("-a * b;"), "((-a) * b);");
    assert_eq!(parsed_form("!-a;"), "(!(-a));");
    assert_eq!(parsed_form("~a & b;"), "((~a) & b);");
}

#[test]
fn exponentiation_is_right_associative() {
    assert_eq!(parsed_form("2 ** 3 ** 2;"), "(2 ** (3 ** 2));");
    assert_eq!(parsed_form("2 ** 3 * 4;"), "((2 ** 3) * 4);");
}

#[test]
fn comparison_and_shift_levels() {
    assert_eq!(parsed_form("a + b << c == d;"), "(((a + b) << c) == d);");
    assert_eq!(parsed_form("a < b == c > d;"), "((a < b) == (c > d));");
    assert_eq!(parsed_form("a <= b >= c;"), "((a <= b) >= c);");
}

#[test]
fn bitwise_ladder_sits_between_logical_and_equality() {
    assert_eq!(parsed_form("a | b ^ c & d;"), "(a | (b ^ (c & d)));");
    assert_eq!(parsed_form("a & b == c;"), "(a & (b == c));");
    assert_eq!(parsed_form("a && b | c;"), "(a && (b | c));");
}

#[test]
fn logical_or_is_loosest() {
    assert_eq!(parsed_form("a && b || c && d;"), "((a && b) || (c && d));");
}

#[test]
fn grouping_overrides_precedence() {
    assert_eq!(parsed_form("(a + b) * c;"), "((a + b) * c);");
    assert_eq!(parsed_form("-(a + b);"), "(-(a + b));");
}

#[test]
fn call_and_index_bind_tightest() {
    assert_eq!(parsed_form("a * [1, 2][1];"), "(a * ([1, 2][1]));");
    assert_eq!(parsed_form("add(a + b) + c;"), "(add((a + b)) + c);");
    assert_eq!(parsed_form("-f(x);"), "(-f(x));");
    assert_eq!(parsed_form("f(1)(2);"), "f(1)(2);");
}

#[test]
fn parses_if_else_expression() {
    assert_eq!(
        parsed_form("if (x < y) { x } else { y };"),
        "if ((x < y)) { x; } else { y; };"
    );
}

#[test]
fn parses_function_literal_and_immediate_call() {
    assert_eq!(
        parsed_form("fn(a, b) { a + b }(1, 2);"),
        "fn(a, b) { (a + b); }(1, 2);"
    );
    assert_eq!(parsed_form("fn() { 0 };"), "fn() { 0; };");
}

#[test]
fn parses_literals() {
    let program = parse_src("5; 2.5; \"text\"; true; false; null; [1, 2];");
    let exprs: Vec<&Expr> = program
        .statements
        .iter()
        .map(|stmt| match stmt {
            Stmt::Expr(expr) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        })
        .collect();

    assert_eq!(exprs[0], &Expr::IntegerLiteral(5));
    assert_eq!(exprs[1], &Expr::FloatLiteral(2.5));
    assert_eq!(exprs[2], &Expr::StringLiteral("text".to_string()));
    assert_eq!(exprs[3], &Expr::BooleanLiteral(true));
    assert_eq!(exprs[4], &Expr::BooleanLiteral(false));
    assert_eq!(exprs[5], &Expr::NullLiteral);
    assert_eq!(
        exprs[6],
        &Expr::ArrayLiteral(vec![Expr::IntegerLiteral(1), Expr::IntegerLiteral(2)])
    );
}

#[test]
fn trailing_semicolon_is_optional_at_end_of_input() {
    assert_eq!(parsed_form("a + b"), "(a + b);");
}

#[test]
fn string_form_reparses_to_the_same_tree() {
    let sources = [
        "1 + 2 * 3;",
        "-(5 + 5);",
        "a ** b ** c;",
        "if (a < b) { a } else { b };",
        "let f = fn(x) { return x; };",
        "[1, 2.5, true, null][0];",
        "f(1)(2) + g([x]);",
        "x << 2 | y >> 1;",
    ];

    for src in sources {
        let once = parsed_form(src);
        let twice = Parser::new(tokenize(&once))
            .parse_program()
            .expect("canonical form should reparse")
            .to_string();
        assert_eq!(once, twice, "round-trip failed for {src}");
    }
}

#[test]
fn missing_identifier_reports_expected_token() {
    let errors = Parser::new(tokenize("let = 5;"))
        .parse_program()
        .expect_err("parser should fail");

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0].kind,
        ParseErrorKind::ExpectedToken { .. }
    ));
    assert_eq!(
        errors[0].kind.to_string(),
        "expected an identifier, got '='"
    );
}

#[test]
fn statement_starting_with_infix_token_reports_no_prefix_fn() {
    let errors = Parser::new(tokenize("+= 3;"))
        .parse_program()
        .expect_err("parser should fail");

    assert_eq!(
        errors[0].kind.to_string(),
        "no prefix parse function for '+='"
    );
}

#[test]
fn out_of_range_integer_reports_could_not_parse() {
    let errors = Parser::new(tokenize("99999999999999999999;"))
        .parse_program()
        .expect_err("parser should fail");

    assert_eq!(
        errors[0].kind.to_string(),
        "could not parse 99999999999999999999 as integer"
    );
}

#[test]
fn parser_recovers_and_keeps_collecting_errors() {
    let errors = Parser::new(tokenize("let = 1; += 2; let y = 3;"))
        .parse_program()
        .expect_err("parser should fail");

    // Two bad statements, one diagnostic each; the trailing valid
    // statement parses without adding more.
    assert_eq!(errors.len(), 2);
}

#[test]
fn parser_survives_illegal_tokens() {
    let errors = Parser::new(tokenize("1.2.3;"))
        .parse_program()
        .expect_err("parser should fail");

    assert!(matches!(
        errors[0].kind,
        ParseErrorKind::NoPrefixParseFn { .. }
    ));
}
