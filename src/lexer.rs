use std::iter::Peekable;
use std::str::Chars;

use tracing::debug;

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    None,
    Identifier,
    String { escaped: bool },
    Number { seen_dot: bool },
}

/// Character-level state machine producing single-character operators;
/// multi-character operators are merged in a second pass over the tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    state: State,
    buffer: String,
    start: Span,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            state: State::None,
            buffer: String::new(),
            start: Span::new(1, 1),
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> LexResult<Vec<Token>> {
        while let Some(ch) = self.chars.next() {
            let position = Span::new(self.line, self.column);
            self.step(ch, position)?;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.finish()?;

        let end = Span::new(self.line, self.column);
        let mut tokens = merge_operators(self.tokens);
        tokens.push(Token::new(TokenKind::EOF, end));
        Ok(tokens)
    }

    fn step(&mut self, ch: char, position: Span) -> LexResult<()> {
        match self.state {
            State::None => self.step_none(ch, position),
            State::Identifier => {
                if is_identifier_char(ch) {
                    self.buffer.push(ch);
                    Ok(())
                } else {
                    self.finish_identifier();
                    self.step_none(ch, position)
                }
            }
            State::Number { seen_dot } => self.step_number(ch, position, seen_dot),
            State::String { escaped } => self.step_string(ch, position, escaped),
        }
    }

    fn step_none(&mut self, ch: char, position: Span) -> LexResult<()> {
        match ch {
            c if c.is_whitespace() => Ok(()),
            c if c.is_alphabetic() || c == '_' => {
                self.begin(State::Identifier, position);
                self.buffer.push(c);
                Ok(())
            }
            c if c.is_ascii_digit() => {
                self.begin(State::Number { seen_dot: false }, position);
                self.buffer.push(c);
                Ok(())
            }
            '"' => {
                self.begin(State::String { escaped: false }, position);
                Ok(())
            }
            '.' => {
                self.start_dot(position);
                Ok(())
            }
            c => {
                let kind = single_char_token(c).ok_or(LexError::UnexpectedCharacter {
                    character: c,
                    line: position.line,
                    column: position.column,
                })?;
                self.tokens.push(Token::new(kind, position));
                Ok(())
            }
        }
    }

    fn step_number(&mut self, ch: char, position: Span, seen_dot: bool) -> LexResult<()> {
        if ch.is_ascii_digit() {
            self.buffer.push(ch);
            return Ok(());
        }
        if ch == '.' && !seen_dot {
            self.buffer.push(ch);
            self.state = State::Number { seen_dot: true };
            return Ok(());
        }
        self.finish_number()?;
        if ch == '.' {
            // Second dot: `13.65.3` continues as a fresh `0.3`.
            self.start_dot(position);
            return Ok(());
        }
        self.step_none(ch, position)
    }

    fn step_string(&mut self, ch: char, position: Span, escaped: bool) -> LexResult<()> {
        if escaped {
            let resolved = match ch {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '"' => '"',
                other => {
                    return Err(LexError::InvalidEscape {
                        character: other,
                        line: position.line,
                        column: position.column,
                    });
                }
            };
            self.buffer.push(resolved);
            self.state = State::String { escaped: false };
            return Ok(());
        }
        match ch {
            '\\' => self.state = State::String { escaped: true },
            '"' => {
                let text = std::mem::take(&mut self.buffer);
                self.tokens.push(Token::new(TokenKind::String(text), self.start));
                self.state = State::None;
            }
            other => self.buffer.push(other),
        }
        Ok(())
    }

    /// A `.` outside a token starts a number when a digit follows, otherwise
    /// it is member access.
    fn start_dot(&mut self, position: Span) {
        if self.chars.peek().is_some_and(char::is_ascii_digit) {
            self.begin(State::Number { seen_dot: true }, position);
            self.buffer.push_str("0.");
        } else {
            self.tokens.push(Token::new(TokenKind::Dot, position));
        }
    }

    fn begin(&mut self, state: State, position: Span) {
        self.state = state;
        self.start = position;
        self.buffer.clear();
    }

    fn finish(&mut self) -> LexResult<()> {
        match self.state {
            State::None => Ok(()),
            State::Identifier => {
                self.finish_identifier();
                Ok(())
            }
            State::Number { .. } => self.finish_number(),
            State::String { .. } => Err(LexError::UnterminatedString {
                line: self.start.line,
                column: self.start.column,
            }),
        }
    }

    fn finish_identifier(&mut self) {
        let word = std::mem::take(&mut self.buffer);
        let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier(word));
        self.tokens.push(Token::new(kind, self.start));
        self.state = State::None;
    }

    fn finish_number(&mut self) -> LexResult<()> {
        let literal = std::mem::take(&mut self.buffer);
        let value = literal
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumberLiteral {
                literal: literal.clone(),
                line: self.start.line,
                column: self.start.column,
            })?;
        self.tokens.push(Token::new(TokenKind::Number(value), self.start));
        self.state = State::None;
        Ok(())
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    let kind = match ch {
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Star,
        '/' => TokenKind::Slash,
        '%' => TokenKind::Percent,
        '=' => TokenKind::Equal,
        '!' => TokenKind::Bang,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        '&' => TokenKind::Ampersand,
        '|' => TokenKind::Pipe,
        '(' => TokenKind::LParen,
        ')' => TokenKind::RParen,
        '[' => TokenKind::LBracket,
        ']' => TokenKind::RBracket,
        '{' => TokenKind::LBrace,
        '}' => TokenKind::RBrace,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        _ => return None,
    };
    Some(kind)
}

/// Folds adjacent operator tokens into their two- and three-character forms
/// (`<` `<` `=` becomes `<<=`). Whitespace between the characters prevents
/// merging.
fn merge_operators(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut width = 0;
    for token in tokens {
        if let Some(previous) = merged.last_mut()
            && token.span.line == previous.span.line
            && token.span.column == previous.span.column + width
            && let Some(kind) = previous.kind.combine(&token.kind)
        {
            previous.kind = kind;
            width += 1;
            continue;
        }
        width = 1;
        merged.push(token);
    }
    merged
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let tokens = Lexer::new(input).tokenize()?;
    debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn tokenizes_simple_program() {
        let input = indoc! {r#"
            var total = 0;
            while (total < 10) {
                total += 2;
            }
            print("%d", total);
        "#};
        let expected = vec![
            TokenKind::Var,
            ident("total"),
            TokenKind::Equal,
            TokenKind::Number(0.0),
            TokenKind::Semicolon,
            TokenKind::While,
            TokenKind::LParen,
            ident("total"),
            TokenKind::Less,
            TokenKind::Number(10.0),
            TokenKind::RParen,
            TokenKind::LBrace,
            ident("total"),
            TokenKind::PlusEqual,
            TokenKind::Number(2.0),
            TokenKind::Semicolon,
            TokenKind::RBrace,
            TokenKind::Print,
            TokenKind::LParen,
            TokenKind::String("%d".to_string()),
            TokenKind::Comma,
            ident("total"),
            TokenKind::RParen,
            TokenKind::Semicolon,
            TokenKind::EOF,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn second_dot_starts_a_new_number() {
        assert_eq!(
            kinds("13.65.3"),
            vec![
                TokenKind::Number(13.65),
                TokenKind::Number(0.3),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn leading_dot_is_seeded_with_zero() {
        assert_eq!(kinds(".15"), vec![TokenKind::Number(0.15), TokenKind::EOF]);
    }

    #[test]
    fn dot_before_identifier_is_member_access() {
        assert_eq!(
            kinds("arr.size()"),
            vec![
                ident("arr"),
                TokenKind::Dot,
                ident("size"),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn identifiers_may_contain_digits() {
        assert_eq!(
            kinds("x1 _a2b 3c"),
            vec![
                ident("x1"),
                ident("_a2b"),
                TokenKind::Number(3.0),
                ident("c"),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn merges_adjacent_operators_greedily() {
        assert_eq!(
            kinds("a <<= b == c != d ++ -- && ||"),
            vec![
                ident("a"),
                TokenKind::ShiftLeftEqual,
                ident("b"),
                TokenKind::EqualEqual,
                ident("c"),
                TokenKind::BangEqual,
                ident("d"),
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::AmpersandAmpersand,
                TokenKind::PipePipe,
                TokenKind::EOF,
            ]
        );
        assert_eq!(
            kinds("i+++j"),
            vec![
                ident("i"),
                TokenKind::PlusPlus,
                TokenKind::Plus,
                ident("j"),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn separated_operators_stay_apart() {
        assert_eq!(
            kinds("a = = b"),
            vec![
                ident("a"),
                TokenKind::Equal,
                TokenKind::Equal,
                ident("b"),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn strings_keep_whitespace_and_resolve_escapes() {
        assert_eq!(
            kinds(r#""a  b\n\t\r\"c""#),
            vec![
                TokenKind::String("a  b\n\t\r\"c".to_string()),
                TokenKind::EOF
            ]
        );
    }

    #[test]
    fn records_line_and_column() {
        let tokens = tokenize("var a;\n  a = 1;").expect("tokenize should succeed");
        assert_eq!(tokens[0].span, Span::new(1, 1));
        assert_eq!(tokens[1].span, Span::new(1, 5));
        assert_eq!(tokens[3].span, Span::new(2, 3));
        assert_eq!(tokens[4].span, Span::new(2, 5));
    }

    #[test]
    fn errors_on_invalid_escape() {
        let err = tokenize(r#""bad \q""#).expect_err("expected lexing failure");
        assert_eq!(
            err,
            LexError::InvalidEscape {
                character: 'q',
                line: 1,
                column: 7
            }
        );
    }

    #[test]
    fn errors_on_unterminated_string() {
        let err = tokenize("var s = \"open").expect_err("expected lexing failure");
        assert_eq!(err, LexError::UnterminatedString { line: 1, column: 9 });
    }

    #[test]
    fn errors_on_backslash_outside_string() {
        let err = tokenize("a \\ b").expect_err("expected lexing failure");
        assert!(err.to_string().contains("Unexpected character '\\'"));
    }

    #[test]
    fn errors_on_invalid_character() {
        let err = tokenize("x = 1 @ 2;").expect_err("expected lexing failure");
        assert!(err.to_string().contains("Unexpected character '@'"));
        assert_eq!(err.column(), 7);
    }
}
