// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for the Juice language.
//!
//! This crate defines the tokens, spans and tree nodes shared between the
//! lexer, the parser and the diagnostics renderer. Nodes own their children
//! outright and are never mutated once the parser has built them.

pub mod span;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod ty;
pub mod trivia;
pub mod sexpr;

pub use span::{LineMap, Span};
