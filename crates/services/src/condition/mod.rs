//! Restricted boolean-expression interpreter for notification rule
//! conditions. A small closed grammar over the record snapshot replaces
//! general-purpose expression evaluation: field access (`doc.status`),
//! comparisons, `and`/`or`/`not`, `in`, and date helpers `today()` /
//! `days(n)`. Nothing outside the supplied context is reachable.

mod eval;
mod lexer;
mod parser;

pub use eval::{Value, evaluate, evaluate_value, parse_date};
pub use parser::parse;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("Syntax error at offset {offset}: {message}")]
    Lex { offset: usize, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
    #[error("Type error: {0}")]
    Type(String),
}
