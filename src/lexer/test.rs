use super::{Lexer, Token, TokenKind};
use TokenKind::*;

fn test_lexer(code: &str, expected: Vec<TokenKind>, skip_trivia: bool) {
    let mut lexer = Lexer::new(code);
    let mut tokens: Vec<Token> = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.kind == Eof {
            break;
        }
        tokens.push(token);
    }

    let kinds: Vec<TokenKind> = tokens
        .iter()
        .map(|token| token.kind)
        .filter(|&kind| {
            !skip_trivia || !matches!(kind, Whitespace | LineComment | BlockComment)
        })
        .collect();

    assert_eq!(kinds, expected);

    let text = tokens
        .iter()
        .map(|token| token.span.as_str(code))
        .collect::<Vec<_>>()
        .concat();

    assert_eq!(text.as_str(), code);
}

#[test]
fn parens() {
    test_lexer("( ( ) )", vec![LParen, LParen, RParen, RParen], true);
}

#[test]
fn keywords() {
    test_lexer(
        "module func i32.add offset=8 align=4",
        vec![Keyword, Keyword, Keyword, Keyword, Keyword],
        true,
    );
}

#[test]
fn ids() {
    test_lexer(
        "$f $loop-1 $a.b $<=> $",
        vec![Id, Id, Id, Id, Reserved],
        true,
    );
}

#[test]
fn numbers() {
    test_lexer(
        "0 123 -7 +42 0x2_A 1.5 1e10 0x1p-3 inf -inf nan nan:0x4",
        vec![
            Number, Number, Number, Number, Number, Number, Number, Number, Number, Number,
            Number, Number,
        ],
        true,
    );
}

#[test]
fn number_like_keywords() {
    test_lexer("infinity nanometers", vec![Keyword, Keyword], true);
}

#[test]
fn strings() {
    test_lexer(
        r#""" "hello" "a\twith\"escapes\\" "#,
        vec![String, String, String],
        true,
    );
}

#[test]
fn unterminated_string() {
    test_lexer(r#""runs off"#, vec![UnterminatedStringError], true);
}

#[test]
fn line_comment() {
    test_lexer(
        "(module ;; comment here\n)",
        vec![LParen, Keyword, Whitespace, LineComment, Whitespace, RParen],
        false,
    );
}

#[test]
fn block_comment() {
    test_lexer("one (; comment ;) two", vec![Keyword, Keyword], true);
}

#[test]
fn block_comment_nested() {
    test_lexer("a (; outer (; inner ;) outer ;) b", vec![Keyword, Keyword], true);
}

#[test]
fn block_comment_minimal() {
    test_lexer("(;;)", vec![BlockComment], false);
}

#[test]
fn block_comment_unterminated() {
    test_lexer("a (; never closed", vec![Keyword, UnterminatedCommentError], true);
}

#[test]
fn reserved() {
    test_lexer("0$x Uppercase", vec![Number, Reserved], true);
}

#[test]
fn stray_semicolon() {
    test_lexer("; lone", vec![Error, Keyword], true);
}

#[test]
fn line_col() {
    let source = "(module\n  (func))";
    assert_eq!(super::line_col(source, 0), (1, 1));
    assert_eq!(super::line_col(source, 8), (2, 1));
    assert_eq!(super::line_col(source, 11), (2, 4));
}
