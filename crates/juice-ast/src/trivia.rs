// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Comment trivia. Comments never reach the parser; tooling re-anchors them
//! to nodes by span.

use crate::Span;

/// A `//` comment, text includes the slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub span: Span,
    pub text: String,
}

/// Sorted list of comments with a cursor for sequential consumption.
pub struct CommentList {
    comments: Vec<Comment>,
    cursor: usize,
}

impl CommentList {
    pub fn new(mut comments: Vec<Comment>) -> Self {
        comments.sort_by_key(|c| c.span.start);
        Self { comments, cursor: 0 }
    }

    /// Take all comments whose start position is before `pos`.
    pub fn take_before(&mut self, pos: usize) -> Vec<Comment> {
        let start = self.cursor;
        while self.peek_next().is_some_and(|c| c.span.start < pos) {
            self.cursor += 1;
        }
        self.comments[start..self.cursor].to_vec()
    }

    /// Take the comments lying inside `span`, dropping any skipped ones before it.
    pub fn take_within(&mut self, span: Span) -> Vec<Comment> {
        self.take_before(span.start);
        let mut result = self.take_before(span.end);
        result.retain(|c| span.contains(c.span));
        result
    }

    /// Peek at the next unconsumed comment without advancing.
    pub fn peek_next(&self) -> Option<&Comment> {
        self.comments.get(self.cursor)
    }

    /// Drain any remaining comments.
    pub fn take_rest(&mut self) -> Vec<Comment> {
        let rest = self.comments[self.cursor..].to_vec();
        self.cursor = self.comments.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(start: usize, text: &str) -> Comment {
        Comment { span: Span::new(start, start + text.len()), text: text.to_string() }
    }

    #[test]
    fn sequential_consumption() {
        let mut list = CommentList::new(vec![comment(30, "// c"), comment(0, "// a"), comment(10, "// b")]);
        let leading = list.take_before(10);
        assert_eq!(leading, vec![comment(0, "// a")]);
        assert_eq!(list.peek_next(), Some(&comment(10, "// b")));
        let inner = list.take_within(Span::new(8, 20));
        assert_eq!(inner, vec![comment(10, "// b")]);
        assert_eq!(list.take_rest(), vec![comment(30, "// c")]);
        assert!(list.take_rest().is_empty());
    }
}
