use std::fmt;

/// A single CCL token.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// Raw source text of a number literal, e.g. `"42"`, `"3.5"`, `"1e10"`.
    Number(String),
    /// An unquoted identifier: a column letter, column name, function name,
    /// `AND`/`OR`/`NEW`, matched case-insensitively by the parser.
    Ident(String),
    /// A single- or double-quoted string literal, already unquoted.
    String(String),

    /// `@`
    At,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `;` or a newline — both terminate a statement.
    StatementEnd,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `&`
    Ampersand,

    /// `=`
    Equal,
    /// `!=` or `<>`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
}

impl Token {
    /// `true` for the tokens that end a statement (`;` or a newline).
    pub fn is_statement_end(&self) -> bool {
        matches!(self, Token::StatementEnd)
    }

    /// Returns the ident text, case-folded, if this token is an identifier
    /// equal (ignoring case) to `keyword`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Ident(s) if s.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(s) => write!(f, "{s}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::String(s) => write!(f, "'{s}'"),
            Token::At => f.write_str("@"),
            Token::Dot => f.write_str("."),
            Token::Colon => f.write_str(":"),
            Token::Comma => f.write_str(","),
            Token::StatementEnd => f.write_str("<end of statement>"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Caret => f.write_str("^"),
            Token::Ampersand => f.write_str("&"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("!="),
            Token::Less => f.write_str("<"),
            Token::LessEqual => f.write_str("<="),
            Token::Greater => f.write_str(">"),
            Token::GreaterEqual => f.write_str(">="),
        }
    }
}
