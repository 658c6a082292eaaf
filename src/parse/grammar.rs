use winnow::combinator::{opt, preceded, repeat};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::token::{Piece, ReferenceKind, Token, TypeOverride, SIGILS};

// -- Words ------------------------------------------------------------------

fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

// -- References -------------------------------------------------------------

fn sigil(input: &mut &str) -> ModalResult<ReferenceKind> {
    one_of(SIGILS)
        .verify_map(|c: char| ReferenceKind::from_sigil(c).ok())
        .parse_next(input)
}

fn reference<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    let kind = sigil.parse_next(input)?;
    let name = word.parse_next(input)?;
    let path: Vec<&str> = repeat(0.., preceded('.', word)).parse_next(input)?;
    let type_override = opt(preceded("::", word)).parse_next(input)?;
    Ok(Token {
        kind,
        name,
        path,
        type_override: type_override.map(TypeOverride),
    })
}

// -- Top-level scanner ------------------------------------------------------

/// Split `text` into verbatim runs and references. Everything that does not
/// start a well-formed reference is kept as text, so the pieces concatenate
/// back to the input.
pub fn tokenize(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        match reference.parse_peek(rest) {
            Ok((remaining, token)) => {
                if literal_start < pos {
                    pieces.push(Piece::Text(&text[literal_start..pos]));
                }
                pieces.push(Piece::Ref(token));
                pos = text.len() - remaining.len();
                literal_start = pos;
            }
            Err(_) => {
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    if literal_start < text.len() {
        pieces.push(Piece::Text(&text[literal_start..]));
    }
    pieces
}
