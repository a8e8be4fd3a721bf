//! The lexical transition table the scanner drives.
//!
//! Hosts may supply their own table; `Grammar` is the one the language
//! ships with. It is a list of rules, each recognizing one family of
//! lexemes at the start of the remaining input. The longest match wins,
//! and on a tie the rule listed first wins.

use crate::construct::token::TokenKind;

const PUNCTUATION: &str = "_-+*/%<>=?&|^~$!";

/// Given the remaining input, returns the kind and byte length of the
/// longest token at its start, or `None` if nothing matches.
pub trait TransitionTable {
    fn longest_match(&self, remaining: &str) -> Option<(TokenKind, usize)>;
}

type Rule = fn(&str) -> Option<(TokenKind, usize)>;

pub struct Grammar {
    rules: Vec<Rule>,
}

impl Default for Grammar {
    fn default() -> Grammar {
        Grammar {
            rules: vec![
                Grammar::delimiter,
                Grammar::ellipsis,
                Grammar::quote,
                Grammar::comment,
                Grammar::newline,
                Grammar::whitespace,
                Grammar::number,
                Grammar::word,
                Grammar::macro_name,
            ],
        }
    }
}

impl TransitionTable for Grammar {
    fn longest_match(&self, remaining: &str) -> Option<(TokenKind, usize)> {
        let mut best: Option<(TokenKind, usize)> = None;

        for rule in self.rules.iter() {
            if let Some((kind, len)) = rule(remaining) {
                match best {
                    Some((_, best_len)) if best_len >= len => (),
                    _ if len > 0 => best = Some((kind, len)),
                    _ => (),
                }
            }
        }

        best
    }
}

/// Number of leading bytes satisfying `pred`.
fn take_while(remaining: &str, pred: impl Fn(char) -> bool) -> usize {
    remaining
        .char_indices()
        .find(|(_, c)| !pred(*c))
        .map(|(index, _)| index)
        .unwrap_or(remaining.len())
}

pub fn is_ident_char(c: char) -> bool { c.is_alphanumeric() || PUNCTUATION.contains(c) }

impl Grammar {
    fn delimiter(remaining: &str) -> Option<(TokenKind, usize)> {
        use TokenKind::*;
        let kind = match remaining.chars().next()? {
            '(' => OpenParen,
            ')' => CloseParen,
            '[' => OpenSquare,
            ']' => CloseSquare,
            '{' => OpenCurly,
            '}' => CloseCurly,
            _ => {
                return None;
            },
        };
        Some((kind, 1))
    }

    fn ellipsis(remaining: &str) -> Option<(TokenKind, usize)> {
        remaining
            .starts_with("...")
            .then(|| (TokenKind::Ellipsis, 3))
    }

    /// Only the opening quote; the scanner reads the rest of the literal.
    fn quote(remaining: &str) -> Option<(TokenKind, usize)> {
        remaining
            .starts_with(|c: char| c == '"' || c == '\'')
            .then(|| (TokenKind::Str, 1))
    }

    /// Only the `;`; the scanner skips to the end of the line.
    fn comment(remaining: &str) -> Option<(TokenKind, usize)> {
        remaining.starts_with(';').then(|| (TokenKind::Comment, 1))
    }

    fn newline(remaining: &str) -> Option<(TokenKind, usize)> {
        remaining.starts_with('\n').then(|| (TokenKind::Newline, 1))
    }

    fn whitespace(remaining: &str) -> Option<(TokenKind, usize)> {
        let len = take_while(remaining, |c| c.is_whitespace() && c != '\n');
        Some((TokenKind::Whitespace, len))
    }

    /// Integers are `-?[0-9]+`, floats are `-?[0-9]+.[0-9]+`.
    fn number(remaining: &str) -> Option<(TokenKind, usize)> {
        let sign = if remaining.starts_with('-') { 1 } else { 0 };
        let digits = take_while(&remaining[sign..], |c| c.is_ascii_digit());
        if digits == 0 {
            return None;
        }

        let int = sign + digits;
        let rest = &remaining[int..];
        if rest.starts_with('.') {
            let fraction = take_while(&rest[1..], |c| c.is_ascii_digit());
            if fraction > 0 {
                return Some((TokenKind::Float, int + 1 + fraction));
            }
        }

        Some((TokenKind::Int, int))
    }

    /// Identifiers, keywords, booleans and record keys.
    fn word(remaining: &str) -> Option<(TokenKind, usize)> {
        let first = remaining.chars().next()?;
        if first.is_ascii_digit() || first == '!' || !is_ident_char(first) {
            return None;
        }

        let len = take_while(remaining, is_ident_char);
        if remaining[len..].starts_with(':') {
            return Some((TokenKind::Key, len + 1));
        }

        let kind = TokenKind::keyword(&remaining[..len]).unwrap_or(TokenKind::Ident);
        Some((kind, len))
    }

    fn macro_name(remaining: &str) -> Option<(TokenKind, usize)> {
        let rest = remaining.strip_prefix('!')?;
        let len = take_while(rest, is_ident_char);
        (len > 0).then(|| (TokenKind::MacroName, len + 1))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn matched(input: &str) -> Option<(TokenKind, usize)> {
        Grammar::default().longest_match(input)
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(matched("if x"), Some((TokenKind::If, 2)));
        assert_eq!(matched("iffy x"), Some((TokenKind::Ident, 4)));
        assert_eq!(matched("true)"), Some((TokenKind::Bool, 4)));
    }

    #[test]
    fn negative_numbers() {
        assert_eq!(matched("-5 "), Some((TokenKind::Int, 2)));
        assert_eq!(matched("-2.25"), Some((TokenKind::Float, 5)));
        assert_eq!(matched("- 5"), Some((TokenKind::Ident, 1)));
        assert_eq!(matched("-x"), Some((TokenKind::Ident, 2)));
        assert_eq!(matched("-5x"), Some((TokenKind::Ident, 3)));
    }

    #[test]
    fn trailing_dot_is_not_a_float() {
        assert_eq!(matched("1."), Some((TokenKind::Int, 1)));
    }

    #[test]
    fn keys_and_macro_names() {
        assert_eq!(matched("name: 1"), Some((TokenKind::Key, 5)));
        assert_eq!(matched("!first-and-rest 1"), Some((TokenKind::MacroName, 15)));
        assert_eq!(matched("! x"), None);
    }

    #[test]
    fn ellipsis_before_ident() {
        assert_eq!(matched("...rest"), Some((TokenKind::Ellipsis, 3)));
    }

    #[test]
    fn whitespace_stops_at_newline() {
        assert_eq!(matched(" \t\n"), Some((TokenKind::Whitespace, 2)));
        assert_eq!(matched("\n "), Some((TokenKind::Newline, 1)));
    }

    #[test]
    fn no_match() {
        assert_eq!(matched("@"), None);
        assert_eq!(matched(""), None);
    }
}
