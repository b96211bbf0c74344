//! Turns raw source into one statement per line.
//!
//! Comments and blank lines disappear, every unquoted `{` and `}` lands on its
//! own line, top-level `;` splits statements, and a line that ends inside open
//! parentheses continues on the next one. Each output line remembers where
//! each of its pieces sat in the raw text so later errors can point there.

use crate::language::{
    errors::{SyntaxError, SyntaxErrorKind},
    span::{Position, Span},
};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedLine {
    pub text: String,
    pub origin: Position,
    /// Byte offset in `text` where each joined physical line starts, with the
    /// raw position of that byte. The first entry is always `(0, origin)`.
    segments: Vec<(usize, Position)>,
}

impl NormalizedLine {
    pub fn new(text: impl Into<String>, origin: Position) -> Self {
        Self {
            text: text.into(),
            origin,
            segments: vec![(0, origin)],
        }
    }

    /// Maps a byte offset in `text` back to the raw source.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let (start, origin) = self
            .segments
            .iter()
            .rev()
            .find(|(start, _)| *start <= offset)
            .copied()
            .unwrap_or((0, self.origin));
        let columns = self
            .text
            .get(start..offset)
            .map_or(0, |piece| piece.chars().count());
        origin.advanced(columns, offset - start)
    }

    /// The raw-source span covering `len` bytes of `text` from `offset`.
    pub fn span_at(&self, offset: usize, len: usize) -> Span {
        let start = self.position_at(offset);
        let end = self.position_at(offset + len);
        Span::new(start, end.offset.saturating_sub(start.offset))
    }

    /// The raw-source span of the whole statement.
    pub fn span(&self) -> Span {
        self.span_at(0, self.text.len())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub lines: Vec<NormalizedLine>,
}

impl Normalized {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NormalizedLine> {
        self.lines.iter()
    }
}

impl fmt::Display for Normalized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Normalizer {
    lines: Vec<NormalizedLine>,
    buffer: String,
    origin: Option<Position>,
    segments: Vec<(usize, Position)>,
    in_quote: bool,
    escaped: bool,
    in_comment: bool,
    joining: bool,
    quote_start: Position,
    parens: Vec<Position>,
    braces: Vec<Position>,
}

impl Normalizer {
    fn push(&mut self, ch: char, at: Position) {
        if self.buffer.is_empty() {
            if ch.is_whitespace() {
                return;
            }
            self.origin = Some(at);
            self.segments = vec![(0, at)];
        }
        if self.joining {
            if ch.is_whitespace() {
                return;
            }
            self.joining = false;
            self.segments.push((self.buffer.len(), at));
        }
        self.buffer.push(ch);
    }

    fn flush(&mut self) {
        let text = self.buffer.trim_end();
        if let (false, Some(origin)) = (text.is_empty(), self.origin) {
            self.lines.push(NormalizedLine {
                text: text.to_string(),
                origin,
                segments: std::mem::take(&mut self.segments),
            });
        }
        self.buffer.clear();
        self.segments.clear();
        self.origin = None;
        self.joining = false;
    }

    fn emit_delimiter(&mut self, ch: char, at: Position) {
        self.flush();
        self.lines.push(NormalizedLine::new(ch, at));
    }

    fn quoted(&mut self, ch: char, at: Position) -> Result<(), SyntaxError> {
        if ch == '\n' {
            return Err(SyntaxError::at(
                SyntaxErrorKind::UnclosedString,
                self.quote_start,
            ));
        }
        if self.escaped {
            self.escaped = false;
        } else if ch == '\\' {
            self.escaped = true;
        } else if ch == '"' {
            self.in_quote = false;
        }
        self.push(ch, at);
        Ok(())
    }

    fn step(&mut self, ch: char, at: Position) -> Result<(), SyntaxError> {
        if self.in_quote {
            return self.quoted(ch, at);
        }
        if self.in_comment {
            if ch == '\n' {
                self.in_comment = false;
                self.end_of_line();
            }
            return Ok(());
        }
        match ch {
            '"' => {
                self.in_quote = true;
                self.quote_start = at;
                self.push(ch, at);
            }
            '#' => self.in_comment = true,
            '\n' => self.end_of_line(),
            ';' if self.parens.is_empty() => self.flush(),
            '{' | '}' if !self.parens.is_empty() => {
                let open = self.parens.last().copied().unwrap_or(at);
                return Err(SyntaxError::at(SyntaxErrorKind::UnbalancedParens, open));
            }
            '{' => {
                self.braces.push(at);
                self.emit_delimiter(ch, at);
            }
            '}' => {
                if self.braces.pop().is_none() {
                    return Err(SyntaxError::at(SyntaxErrorKind::UnmatchedClosingBrace, at)
                        .with_help("remove this `}` or open a block before it"));
                }
                self.emit_delimiter(ch, at);
            }
            '(' => {
                self.parens.push(at);
                self.push(ch, at);
            }
            ')' => {
                if self.parens.pop().is_none() {
                    return Err(SyntaxError::at(SyntaxErrorKind::UnbalancedParens, at));
                }
                self.push(ch, at);
            }
            _ => self.push(ch, at),
        }
        Ok(())
    }

    fn end_of_line(&mut self) {
        if self.parens.is_empty() {
            self.flush();
        } else if !self.buffer.is_empty() {
            self.buffer.push(' ');
            self.joining = true;
        }
    }

    fn finish(mut self) -> Result<Normalized, SyntaxError> {
        if self.in_quote {
            return Err(SyntaxError::at(
                SyntaxErrorKind::UnclosedString,
                self.quote_start,
            ));
        }
        if let Some(open) = self.parens.first() {
            return Err(SyntaxError::at(SyntaxErrorKind::UnbalancedParens, *open)
                .with_help("close this parenthesis"));
        }
        if let Some(open) = self.braces.first() {
            return Err(SyntaxError::at(SyntaxErrorKind::UnmatchedOpeningBrace, *open)
                .with_help("this block is never closed with `}`"));
        }
        self.flush();
        Ok(Normalized { lines: self.lines })
    }
}

pub fn normalize(source: &str) -> Result<Normalized, SyntaxError> {
    let mut normalizer = Normalizer::default();
    let mut position = Position::new(1, 1, 0);
    for ch in source.chars() {
        if ch == '\r' {
            position = position.advanced(1, 1);
            continue;
        }
        normalizer.step(ch, position)?;
        position = if ch == '\n' {
            Position::new(position.line + 1, 1, position.offset + 1)
        } else {
            position.advanced(1, ch.len_utf8())
        };
    }
    let normalized = normalizer.finish()?;
    tracing::debug!(lines = normalized.len(), "normalized source");
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(source: &str) -> String {
        normalize(source).expect("normalize").to_string()
    }

    fn error_kind(source: &str) -> SyntaxErrorKind {
        normalize(source).expect_err("should fail").kind
    }

    #[test]
    fn braces_get_their_own_lines() {
        assert_eq!(
            text("if(true) { print(1) } else {print(2)}"),
            "if(true)\n{\nprint(1)\n}\nelse\n{\nprint(2)\n}"
        );
    }

    #[test]
    fn comments_and_blank_lines_vanish() {
        assert_eq!(
            text("  # header\n\nx = 1   # trailing\n\n   y = 2  \n"),
            "x = 1\ny = 2"
        );
    }

    #[test]
    fn quoted_text_is_preserved() {
        assert_eq!(
            text(r#"print("a # {b}; \"c\"  d")"#),
            r#"print("a # {b}; \"c\"  d")"#
        );
    }

    #[test]
    fn semicolons_split_statements() {
        assert_eq!(text("x = 1; y = 2;print(x; y)"), "x = 1\ny = 2\nprint(x; y)");
    }

    #[test]
    fn open_parens_continue_the_line() {
        assert_eq!(text("print(1,\n      2)\nx = 3"), "print(1, 2)\nx = 3");
    }

    #[test]
    fn lines_remember_their_origin() {
        let normalized = normalize("\n\n   x = 1 {\n}").expect("normalize");
        assert_eq!(normalized.lines[0].origin, Position::new(3, 4, 5));
        assert_eq!(normalized.lines[1].origin, Position::new(3, 10, 11));
        assert_eq!(normalized.lines[2].origin.line, 4);
    }

    #[test]
    fn continued_lines_map_back_to_their_own_row() {
        let source = "print(\"ééééé\", 1,\n  2 @ 3)";
        let normalized = normalize(source).expect("normalize");
        let line = &normalized.lines[0];
        assert_eq!(line.text, "print(\"ééééé\", 1, 2 @ 3)");

        let at = line.text.find('@').expect("@");
        let position = line.position_at(at);
        assert_eq!((position.line, position.column), (2, 5));
        assert_eq!(&source[position.offset..position.offset + 1], "@");

        let comma = line.position_at(line.text.find(',').expect(","));
        assert_eq!((comma.line, comma.column), (1, 14));
        assert_eq!(line.span().start, line.origin);
        assert_eq!(line.span().len, source.len());
    }

    #[test]
    fn unclosed_string_points_at_its_quote() {
        let err = normalize("x = 1\ny = \"oops\nz = 2").expect_err("should fail");
        assert_eq!(err.kind, SyntaxErrorKind::UnclosedString);
        assert_eq!((err.span.line(), err.span.column()), (2, 5));
        assert_eq!(error_kind("print(\"a)"), SyntaxErrorKind::UnclosedString);
    }

    #[test]
    fn extra_closing_brace_is_reported() {
        let err = normalize("if(true) {\n}\n}").expect_err("should fail");
        assert_eq!(err.kind, SyntaxErrorKind::UnmatchedClosingBrace);
        assert_eq!(err.span.line(), 3);
    }

    #[test]
    fn unclosed_block_points_at_earliest_brace() {
        let err = normalize("if(true) {\n if(true) {\n }").expect_err("should fail");
        assert_eq!(err.kind, SyntaxErrorKind::UnmatchedOpeningBrace);
        assert_eq!((err.span.line(), err.span.column()), (1, 10));
    }

    #[test]
    fn parens_must_balance() {
        assert_eq!(error_kind("print(1"), SyntaxErrorKind::UnbalancedParens);
        assert_eq!(error_kind("print(1))"), SyntaxErrorKind::UnbalancedParens);
        assert_eq!(error_kind("if(x {\n}"), SyntaxErrorKind::UnbalancedParens);
    }

    #[test]
    fn escaped_backslash_does_not_escape_the_quote() {
        assert_eq!(text(r#"x = "a\\" # note"#), r#"x = "a\\""#);
    }
}
