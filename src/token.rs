use std::fmt;

/// Source position of a token or statement (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    String(String),
    True,
    False,

    // Keywords
    Var,
    Function,
    If,
    Elif,
    Else,
    While,
    For,
    Break,
    Continue,
    Return,
    Exit,
    Print,
    New,

    // Operators
    Plus,                // +
    Minus,               // -
    Star,                // *
    Slash,               // /
    Percent,             // %
    Equal,               // =
    EqualEqual,          // ==
    Bang,                // !
    BangEqual,           // !=
    Less,                // <
    LessEqual,           // <=
    ShiftLeft,           // <<
    ShiftLeftEqual,      // <<=
    Greater,             // >
    GreaterEqual,        // >=
    ShiftRight,          // >>
    ShiftRightEqual,     // >>=
    PlusEqual,           // +=
    MinusEqual,          // -=
    StarEqual,           // *=
    SlashEqual,          // /=
    PlusPlus,            // ++
    MinusMinus,          // --
    Ampersand,           // &
    AmpersandAmpersand,  // &&
    Pipe,                // |
    PipePipe,            // ||

    // Delimiters
    LParen,              // (
    RParen,              // )
    LBracket,            // [
    RBracket,            // ]
    LBrace,              // {
    RBrace,              // }
    Comma,               // ,
    Semicolon,           // ;
    Dot,                 // .

    EOF,
}

impl TokenKind {
    pub(crate) fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "var" => Self::Var,
            "function" => Self::Function,
            "if" => Self::If,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "while" => Self::While,
            "for" => Self::For,
            "break" => Self::Break,
            "continue" => Self::Continue,
            "return" => Self::Return,
            "exit" => Self::Exit,
            "print" => Self::Print,
            "new" => Self::New,
            "true" => Self::True,
            "false" => Self::False,
            _ => return None,
        };
        Some(kind)
    }

    /// Operator produced by appending `next` to `self`, if the pair forms one.
    pub(crate) fn combine(&self, next: &TokenKind) -> Option<Self> {
        use TokenKind::*;
        let combined = match (self, next) {
            (Equal, Equal) => EqualEqual,
            (Bang, Equal) => BangEqual,
            (Less, Equal) => LessEqual,
            (Less, Less) => ShiftLeft,
            (ShiftLeft, Equal) => ShiftLeftEqual,
            (Greater, Equal) => GreaterEqual,
            (Greater, Greater) => ShiftRight,
            (ShiftRight, Equal) => ShiftRightEqual,
            (Plus, Equal) => PlusEqual,
            (Minus, Equal) => MinusEqual,
            (Star, Equal) => StarEqual,
            (Slash, Equal) => SlashEqual,
            (Plus, Plus) => PlusPlus,
            (Minus, Minus) => MinusMinus,
            (Ampersand, Ampersand) => AmpersandAmpersand,
            (Pipe, Pipe) => PipePipe,
            _ => return None,
        };
        Some(combined)
    }

    /// Source spelling used in diagnostics.
    pub fn describe(&self) -> String {
        use TokenKind::*;
        let text = match self {
            Identifier(name) => return format!("identifier '{name}'"),
            Number(value) => return format!("number {value}"),
            String(value) => return format!("string {value:?}"),
            True => "true",
            False => "false",
            Var => "var",
            Function => "function",
            If => "if",
            Elif => "elif",
            Else => "else",
            While => "while",
            For => "for",
            Break => "break",
            Continue => "continue",
            Return => "return",
            Exit => "exit",
            Print => "print",
            New => "new",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Equal => "=",
            EqualEqual => "==",
            Bang => "!",
            BangEqual => "!=",
            Less => "<",
            LessEqual => "<=",
            ShiftLeft => "<<",
            ShiftLeftEqual => "<<=",
            Greater => ">",
            GreaterEqual => ">=",
            ShiftRight => ">>",
            ShiftRightEqual => ">>=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            PlusPlus => "++",
            MinusMinus => "--",
            Ampersand => "&",
            AmpersandAmpersand => "&&",
            Pipe => "|",
            PipePipe => "||",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Semicolon => ";",
            Dot => ".",
            EOF => return "end of input".to_string(),
        };
        format!("'{text}'")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
