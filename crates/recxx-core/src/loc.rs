use std::fmt;

/// Source position carried by AST nodes and symbols and reported with
/// every diagnostic. `file` indexes the compilation context's file table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLoc {
    pub file: u32,
    pub line: u32,
    pub col: u32,
}

impl SourceLoc {
    pub fn new(file: u32, line: u32, col: u32) -> Self {
        Self { file, line, col }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}
