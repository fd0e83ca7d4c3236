//! Tokenizer for infix formulas, generated by `logos`.
//!
//! Whitespace is skipped; `**` is an alias of `^`.

use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    Number,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    #[token("**")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub lexeme: &'a str,
    pub position: usize,
}

/// Splits `input` into tokens; `Err(position)` points at the first
/// character that starts no token.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken<'_>>, usize> {
    Token::lexer(input)
        .spanned()
        .map(|(token, span)| match token {
            Ok(token) => Ok(SpannedToken {
                token,
                lexeme: &input[span.clone()],
                position: span.start,
            }),
            Err(()) => Err(span.start),
        })
        .collect()
}
