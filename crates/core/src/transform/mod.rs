//! Sandboxed expression language for reshaping fetched responses.
//!
//! An expression is evaluated with the identifier `response` bound to the
//! decoded response body. Source length, nesting depth and evaluation steps
//! are bounded by [`TransformLimits`]. Steps also pay for the size of values
//! an expression builds or copies, so memory is bounded along with time.
//!
//! ```
//! use fetchboard_core::transform::{evaluate, TransformLimits};
//! use serde_json::json;
//!
//! let out = evaluate(
//!     "response.items.filter(i => i.active).map(i => i.name)",
//!     json!({"items": [{"name": "a", "active": true}, {"name": "b", "active": false}]}),
//!     &TransformLimits::default(),
//! )
//! .unwrap();
//! assert_eq!(out, json!(["a"]));
//! ```

pub mod ast;
pub mod builtins;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

use serde_json::Value;

use self::eval::Evaluator;
use self::lexer::Lexer;
use self::parser::Parser;

/// Upper bounds applied to every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformLimits {
    /// Maximum expression length in bytes.
    pub max_source_len: usize,
    /// Maximum nesting depth, of the source (brackets, chains, template
    /// substitutions) and of the values it builds.
    pub max_depth: usize,
    /// Maximum number of evaluation steps.
    pub max_steps: u64,
}

impl Default for TransformLimits {
    fn default() -> Self {
        Self {
            max_source_len: 64 * 1024,
            max_depth: 128,
            max_steps: 1_000_000,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TransformError {
    #[error("SyntaxError: {message} (line {line}, column {column})")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{0}")]
    Runtime(String),

    #[error("RangeError: expression exceeds {limit} bytes")]
    TooLong { limit: usize },

    #[error("RangeError: evaluation exceeded {limit} steps")]
    StepLimit { limit: u64 },

    #[error("RangeError: nesting exceeds depth {limit}")]
    DepthLimit { limit: usize },
}

impl TransformError {
    /// Build a syntax error at a character offset into `source`.
    pub fn syntax(source: &str, message: &str, pos: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        for c in source.chars().take(pos) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self::Syntax {
            message: message.to_string(),
            line,
            column,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

/// Evaluate `expr` with `response` bound to the given value.
pub fn evaluate(
    expr: &str,
    response: Value,
    limits: &TransformLimits,
) -> Result<Value, TransformError> {
    if expr.len() > limits.max_source_len {
        return Err(TransformError::TooLong {
            limit: limits.max_source_len,
        });
    }
    let tokens = Lexer::new(expr, limits).tokenize()?;
    let ast = Parser::new(expr, tokens, limits).parse()?;
    Evaluator::new(response, limits).run(&ast)
}
