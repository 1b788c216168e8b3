// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser configuration.

/// Limits and modes for a single parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Stop at the first error.
    pub strict: bool,
    /// Deepest allowed nesting of expressions, blocks and types.
    pub max_depth: usize,
    /// Errors kept before the parse gives up.
    pub max_errors: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: 256,
            max_errors: 20,
        }
    }
}

impl ParseOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }
}
