#[cfg(test)]
mod test;

use std::str::Chars;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TokenKind {
    LParen,
    RParen,
    /// Lowercase-led run of id characters, including `offset=…`/`align=…`.
    Keyword,
    /// `$` followed by id characters.
    Id,
    /// Integer or float literal, including `inf`, `nan` and `nan:0x…`.
    /// Value conversion happens in the parser.
    Number,
    String,

    /// An id-character run that fits no other class.
    Reserved,

    LineComment,
    BlockComment,
    Whitespace,

    UnterminatedStringError,
    UnterminatedCommentError,
    Error,
    Eof,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Span(pub usize, pub usize);

impl Span {
    pub fn as_str<'src>(&self, source: &'src str) -> &'src str {
        &source[self.0..self.1]
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    chars: Chars<'src>,
    start: usize,
    offset: usize,
}

/// 1-based line and column of a byte offset, for error display.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

pub(crate) fn is_idchar(c: char) -> bool {
    matches!(c,
        '0'..='9' | 'a'..='z' | 'A'..='Z'
        | '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '/'
        | ':' | '<' | '=' | '>' | '?' | '@' | '\\' | '^' | '_' | '`' | '|' | '~')
}

fn looks_like_number(lexeme: &str) -> bool {
    let rest = lexeme.strip_prefix(['+', '-']).unwrap_or(lexeme);
    rest.starts_with(|c: char| c.is_ascii_digit())
        || rest == "inf"
        || rest == "nan"
        || rest.starts_with("nan:0x")
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            start: 0,
            offset: 0,
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.start = self.offset;
        match self.eat() {
            Some(c) => Token {
                kind: self.token_kind(c),
                span: Span(self.start, self.offset),
            },
            None => Token {
                kind: TokenKind::Eof,
                span: Span(self.offset, self.offset),
            },
        }
    }

    pub fn next_non_trivial_token(&mut self) -> Token {
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment => {}
                _ => return token,
            }
        }
    }

    fn token_kind(&mut self, c: char) -> TokenKind {
        match c {
            ' ' | '\t' | '\r' | '\n' => self.whitespace(),
            '(' => match self.peek() {
                Some(';') => self.block_comment(),
                _ => TokenKind::LParen,
            },
            ')' => TokenKind::RParen,
            ';' => match self.peek() {
                Some(';') => self.line_comment(),
                _ => TokenKind::Error,
            },
            '"' => self.string(),
            c if is_idchar(c) => self.word(c),
            _ => TokenKind::Error,
        }
    }

    fn whitespace(&mut self) -> TokenKind {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek() {
            self.eat();
        }
        TokenKind::Whitespace
    }

    fn line_comment(&mut self) -> TokenKind {
        self.eat(); // Consume second ';'
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.eat();
        }
        TokenKind::LineComment
    }

    fn block_comment(&mut self) -> TokenKind {
        self.eat(); // Consume ';'
        let mut level = 1;
        while let Some(c) = self.eat() {
            if c == ';' && matches!(self.peek(), Some(')')) {
                self.eat();
                level -= 1;
            }
            if c == '(' && matches!(self.peek(), Some(';')) {
                self.eat();
                level += 1;
            }
            if level == 0 {
                return TokenKind::BlockComment;
            }
        }
        TokenKind::UnterminatedCommentError
    }

    fn string(&mut self) -> TokenKind {
        loop {
            match self.eat() {
                Some('"') => return TokenKind::String,
                // The escaped character is validated during decoding.
                Some('\\') => {
                    self.eat();
                }
                Some('\n') | None => return TokenKind::UnterminatedStringError,
                Some(_) => {}
            }
        }
    }

    fn word(&mut self, first: char) -> TokenKind {
        while let Some(c) = self.peek() {
            if is_idchar(c) {
                self.eat();
            } else {
                break;
            }
        }
        let lexeme = &self.source[self.start..self.offset];
        if first == '$' {
            return if lexeme.len() > 1 {
                TokenKind::Id
            } else {
                TokenKind::Reserved
            };
        }
        if looks_like_number(lexeme) {
            return TokenKind::Number;
        }
        if first.is_ascii_lowercase() {
            TokenKind::Keyword
        } else {
            TokenKind::Reserved
        }
    }

    fn eat(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }
}
