use std::{
    fmt::{self, Display},
    ops::BitOr,
};

use crate::common::span::{Position, Span};

/// Every category the scanner can classify a lexeme as.
/// Whitespace, newlines and comments are recognized by the
/// transition table but never reach the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, proptest_derive::Arbitrary)]
pub enum TokenKind {
    Whitespace,
    Newline,
    Comment,

    // Keywords
    Fun,
    Let,
    If,
    Elif,
    Else,
    Macro,
    While,
    Use,
    Set,
    Field,

    // Leafs
    Int,
    Float,
    Bool,
    Ident,
    Key,
    MacroName,

    // Grouping
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,

    Str,
    Ellipsis,
}

impl TokenKind {
    pub const ALL: [TokenKind; 27] = [
        TokenKind::Whitespace,
        TokenKind::Newline,
        TokenKind::Comment,
        TokenKind::Fun,
        TokenKind::Let,
        TokenKind::If,
        TokenKind::Elif,
        TokenKind::Else,
        TokenKind::Macro,
        TokenKind::While,
        TokenKind::Use,
        TokenKind::Set,
        TokenKind::Field,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Bool,
        TokenKind::Ident,
        TokenKind::Key,
        TokenKind::MacroName,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::OpenSquare,
        TokenKind::CloseSquare,
        TokenKind::OpenCurly,
        TokenKind::CloseCurly,
        TokenKind::Str,
        TokenKind::Ellipsis,
    ];

    /// Recognizes reserved words. Booleans are spelled like keywords
    /// but scanned as literals.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        Some(match word {
            "fun" => Fun,
            "let" => Let,
            "if" => If,
            "elif" => Elif,
            "else" => Else,
            "macro" => Macro,
            "while" => While,
            "use" => Use,
            "set" => Set,
            "field" => Field,
            "true" | "false" => Bool,
            _ => {
                return None;
            },
        })
    }

    /// Whether the scanner drops this kind instead of emitting it.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    fn bit(self) -> u32 { 1 << (self as u32) }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let name = match self {
            Whitespace => "whitespace",
            Newline => "new line",
            Comment => "comment",
            Fun => "`fun`",
            Let => "`let`",
            If => "`if`",
            Elif => "`elif`",
            Else => "`else`",
            Macro => "`macro`",
            While => "`while`",
            Use => "`use`",
            Set => "`set`",
            Field => "`field`",
            Int => "integer",
            Float => "float",
            Bool => "boolean",
            Ident => "identifier",
            Key => "record key",
            MacroName => "macro name",
            OpenParen => "`(`",
            CloseParen => "`)`",
            OpenSquare => "`[`",
            CloseSquare => "`]`",
            OpenCurly => "`{`",
            CloseCurly => "`}`",
            Str => "string literal",
            Ellipsis => "`...`",
        };

        write!(f, "{}", name)
    }
}

/// A set of token kinds a grammar rule is willing to accept next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kinds(u32);

impl Kinds {
    pub const NONE: Kinds = Kinds(0);

    pub const fn of(kinds: &[TokenKind]) -> Kinds {
        let mut bits = 0;
        let mut index = 0;
        while index < kinds.len() {
            bits |= 1 << (kinds[index] as u32);
            index += 1;
        }
        Kinds(bits)
    }

    pub fn contains(self, kind: TokenKind) -> bool { self.0 & kind.bit() != 0 }

    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<TokenKind> for Kinds {
    fn from(kind: TokenKind) -> Kinds { Kinds(kind.bit()) }
}

impl BitOr for TokenKind {
    type Output = Kinds;

    fn bitor(self, other: TokenKind) -> Kinds { Kinds(self.bit() | other.bit()) }
}

impl BitOr<TokenKind> for Kinds {
    type Output = Kinds;

    fn bitor(self, other: TokenKind) -> Kinds { Kinds(self.0 | other.bit()) }
}

impl BitOr for Kinds {
    type Output = Kinds;

    fn bitor(self, other: Kinds) -> Kinds { Kinds(self.0 | other.0) }
}

impl Display for Kinds {
    /// Renders the set as a readable disjunction,
    /// e.g. "`fun`, `let` or identifier".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds = self.iter().collect::<Vec<_>>();

        for (index, kind) in kinds.iter().enumerate() {
            if index > 0 {
                let sep = if index + 1 == kinds.len() { " or " } else { ", " };
                write!(f, "{}", sep)?;
            }
            write!(f, "{}", kind)?;
        }

        Ok(())
    }
}

pub type Tokens = Vec<Token>;

/// A classified lexeme. String literal lexemes keep their quotes
/// but have already had their escapes processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:     TokenKind,
    pub lexeme:   String,
    pub position: Position,
    pub span:     Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: &str, position: Position, span: Span) -> Token {
        Token {
            kind,
            lexeme: lexeme.to_string(),
            position,
            span,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}` at {}", self.kind, self.lexeme, self.position)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn single_kind() {
        let kinds = Kinds::from(TokenKind::Ident);
        assert_eq!(format!("{}", kinds), "identifier");
    }

    #[test]
    fn pair_uses_or() {
        assert_eq!(
            format!("{}", TokenKind::Ident | TokenKind::Fun),
            "`fun` or identifier"
        );
    }

    #[test]
    fn longer_disjunction() {
        let kinds = TokenKind::CloseParen | TokenKind::Elif | TokenKind::Else;
        assert_eq!(format!("{}", kinds), "`elif`, `else` or `)`");
    }

    #[test]
    fn keywords() {
        assert_eq!(TokenKind::keyword("elif"), Some(TokenKind::Elif));
        assert_eq!(TokenKind::keyword("true"), Some(TokenKind::Bool));
        assert_eq!(TokenKind::keyword("iffy"), None);
    }

    #[test]
    fn all_is_in_declaration_order() {
        for (index, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index);
        }
    }

    proptest! {
        #[test]
        fn union_contains_both(a: TokenKind, b: TokenKind) {
            let kinds = a | b;
            prop_assert!(kinds.contains(a));
            prop_assert!(kinds.contains(b));
            prop_assert!(kinds.iter().count() <= 2);
        }
    }
}
