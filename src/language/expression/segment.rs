//! Splits an expression into its elements before classification.

use crate::language::{errors::SyntaxErrorKind, token::Operator};

#[derive(Clone, Debug, PartialEq)]
pub enum Segment<'a> {
    Number(&'a str),
    Word(&'a str),
    /// `name(args)`, with `args` the text between the outer parentheses.
    Call { name: &'a str, args: &'a str },
    /// A quoted string including its quotes.
    Str(&'a str),
    Operator(Operator),
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
}

impl Segment<'_> {
    /// Whether a `-` right after this element may start a negative number.
    fn allows_sign(previous: Option<&Self>) -> bool {
        matches!(
            previous,
            None | Some(Segment::Operator(_)) | Some(Segment::OpenParen)
        )
    }
}

/// Operators allowed inside expressions; assignment forms only appear at
/// statement level.
pub fn expression_operator(symbol: &str) -> Option<Operator> {
    Operator::from_symbol(symbol)
        .filter(|op| op.is_arithmetic() || op.is_comparison() || op.is_logical())
}

const OPERATOR_CHARS: &str = "+-*/%^&|!=<>";

pub fn segment(source: &str) -> Result<Vec<Segment<'_>>, SyntaxErrorKind> {
    let bytes = source.as_bytes();
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut idx = 0;

    while idx < source.len() {
        let rest = &source[idx..];
        let Some(ch) = rest.chars().next() else {
            break;
        };

        if ch.is_whitespace() {
            idx += ch.len_utf8();
            continue;
        }

        let signed = ch == '-'
            && Segment::allows_sign(segments.last())
            && starts_number(&rest[1..]);
        if signed || starts_number(rest) {
            let len = number_len(rest, signed);
            segments.push(Segment::Number(&rest[..len]));
            idx += len;
            continue;
        }

        if ch.is_alphabetic() || ch == '_' {
            let len = rest
                .char_indices()
                .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
                .map_or(rest.len(), |(i, _)| i);
            let name = &rest[..len];
            if bytes.get(idx + len) == Some(&b'(') {
                let close = matching_paren(&rest[len..])
                    .ok_or(SyntaxErrorKind::UnbalancedParens)?;
                let args = &rest[len + 1..len + close];
                segments.push(Segment::Call { name, args });
                idx += len + close + 1;
            } else {
                segments.push(Segment::Word(name));
                idx += len;
            }
            continue;
        }

        match ch {
            '"' => {
                let len = string_len(rest).ok_or(SyntaxErrorKind::UnclosedString)?;
                segments.push(Segment::Str(&rest[..len]));
                idx += len;
            }
            '(' => {
                segments.push(Segment::OpenParen);
                idx += 1;
            }
            ')' => {
                segments.push(Segment::CloseParen);
                idx += 1;
            }
            '[' => {
                segments.push(Segment::OpenBracket);
                idx += 1;
            }
            ']' => {
                segments.push(Segment::CloseBracket);
                idx += 1;
            }
            c if OPERATOR_CHARS.contains(c) => {
                let (op, len) = longest_operator(rest).ok_or_else(|| {
                    SyntaxErrorKind::InvalidExpression(format!("unknown operator `{c}`"))
                })?;
                segments.push(Segment::Operator(op));
                idx += len;
            }
            other => return Err(SyntaxErrorKind::UnknownCharacter(other)),
        }
    }

    Ok(segments)
}

fn starts_number(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn number_len(text: &str, signed: bool) -> usize {
    let mut seen_decimal = false;
    let mut len = usize::from(signed);
    for c in text[len..].chars() {
        match c {
            '0'..='9' => len += 1,
            '.' if !seen_decimal => {
                seen_decimal = true;
                len += 1;
            }
            _ => break,
        }
    }
    len
}

fn longest_operator(text: &str) -> Option<(Operator, usize)> {
    [2usize, 1].into_iter().find_map(|len| {
        text.get(..len)
            .and_then(expression_operator)
            .map(|op| (op, len))
    })
}

/// Byte length of the quoted string at the start of `text`, quotes included.
fn string_len(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(idx + 1),
            _ => {}
        }
    }
    None
}

/// Index of the parenthesis closing the one `text` starts with, skipping
/// anything inside quotes.
pub fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quote = true,
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
