use staq::lexer::{tokenize, Lexer, TokenKind};

fn kinds_of(src: &str) -> Vec<TokenKind> {
    tokenize(src).into_iter().map(|t| t.kind).collect()
}

#[test]
fn tokenizes_basic_let_statement() {
    assert_eq!(
        kinds_of("let x = 1 + 2 * 3;"),
        vec![
            TokenKind::Let,
            TokenKind::Ident("x".to_string()),
            TokenKind::Assign,
            TokenKind::Int("1".to_string()),
            TokenKind::Plus,
            TokenKind::Int("2".to_string()),
            TokenKind::Asterisk,
            TokenKind::Int("3".to_string()),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn recognizes_all_keywords() {
    assert_eq!(
        kinds_of("fn let const if else return true false null"),
        vec![
            TokenKind::Function,
            TokenKind::Let,
            TokenKind::Const,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Null,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn two_char_operators_win_over_singles() {
    assert_eq!(
        kinds_of("== != <= >= << >> && || ** // ?? ++ -- += -= *= /="),
        vec![
            TokenKind::Eq,
            TokenKind::NotEq,
            TokenKind::LtEq,
            TokenKind::GtEq,
            TokenKind::Shl,
            TokenKind::Shr,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Pow,
            TokenKind::IntDiv,
            TokenKind::NullCoalesce,
            TokenKind::Inc,
            TokenKind::Dec,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn single_char_operators_and_delimiters() {
    assert_eq!(
        kinds_of("= + - ! * / % < > & | ^ ~ , ; ( ) { } [ ]"),
        vec![
            TokenKind::Assign,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Bang,
            TokenKind::Asterisk,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::BitAnd,
            TokenKind::BitOr,
            TokenKind::BitXor,
            TokenKind::BitNot,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn distinguishes_integers_and_floats() {
    assert_eq!(
        kinds_of("3 3.14 0.5"),
        vec![
            TokenKind::Int("3".to_string()),
            TokenKind::Float("3.14".to_string()),
            TokenKind::Float("0.5".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn number_with_two_dots_is_one_illegal_run() {
    assert_eq!(
        kinds_of("3.14.15"),
        vec![TokenKind::Illegal("3.14.15".to_string()), TokenKind::Eof]
    );
}

#[test]
fn identifiers_exclude_digits() {
    // Digits are not identifier characters, so `x2` is two tokens.
    assert_eq!(
        kinds_of("x2"),
        vec![
            TokenKind::Ident("x".to_string()),
            TokenKind::Int("2".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lone_question_mark_is_illegal() {
    assert_eq!(
        kinds_of("a ? b"),
        vec![
            TokenKind::Ident("a".to_string()),
            TokenKind::Illegal("?".to_string()),
            TokenKind::Ident("b".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn string_interior_is_kept_raw() {
    assert_eq!(
        kinds_of("\"hello, {name}!\""),
        vec![
            TokenKind::Str("hello, {name}!".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unterminated_string_becomes_illegal() {
    assert_eq!(
        kinds_of("\"oops"),
        vec![TokenKind::Illegal("oops".to_string()), TokenKind::Eof]
    );
}

#[test]
fn unknown_character_becomes_illegal() {
    assert_eq!(
        kinds_of("@"),
        vec![TokenKind::Illegal("@".to_string()), TokenKind::Eof]
    );
}

#[test]
fn exhausted_lexer_keeps_yielding_eof() {
    let mut lexer = Lexer::new("1");
    assert_eq!(lexer.next_token().kind, TokenKind::Int("1".to_string()));
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn spans_cover_the_source_slices() {
    let tokens = tokenize("let ab = 12;");
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 3);
    assert_eq!(tokens[1].span.start, 4);
    assert_eq!(tokens[1].span.end, 6);
    assert_eq!(tokens[3].span.start, 9);
    assert_eq!(tokens[3].span.end, 11);
}
