use miette::SourceSpan;

/// A point in the raw source text. Lines and columns are 1-based, `offset` is
/// a byte index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Moves the position `count` characters to the right on the same line,
    /// with `bytes` being the UTF-8 length of those characters.
    pub fn advanced(self, count: usize, bytes: usize) -> Self {
        Self {
            line: self.line,
            column: self.column + count,
            offset: self.offset + bytes,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub len: usize,
}

impl Span {
    pub fn new(start: Position, len: usize) -> Self {
        Self { start, len }
    }

    pub fn point(start: Position) -> Self {
        Self { start, len: 0 }
    }

    pub fn line(&self) -> usize {
        self.start.line
    }

    pub fn column(&self) -> usize {
        self.start.column
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_source_span(&self) -> SourceSpan {
        (self.start.offset, self.len).into()
    }
}
