//! Source positions shared by tokens, AST nodes and diagnostics

use serde::{Deserialize, Serialize};

/// Byte range in the source plus the line it starts on (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Zero-width span, used for the end-of-file token
    pub fn point(offset: usize, line: usize) -> Self {
        Self::new(offset, offset, line)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
