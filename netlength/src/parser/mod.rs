pub mod fields;
pub mod hyp;

use thiserror::Error;

use crate::board::BoardError;

pub use hyp::{HypParser, NetFilter, MILS_PER_UNIT};

#[derive(Debug, Error)]
pub enum HypParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: unknown object type: {text}")]
    UnknownObject { line: usize, text: String },
    #[error("line {line}: unknown layer type: {text}")]
    UnknownLayerType { line: usize, text: String },
    #[error("line {line}: unable to convert '{value}' to a number")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: missing field {field}")]
    MissingField { line: usize, field: String },
    #[error("line {line}: field {field} given twice")]
    DuplicateField { line: usize, field: String },
    #[error("line {line}: record is never closed")]
    UnterminatedBlock { line: usize },
    #[error("Invalid net pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("line {line}: {source}")]
    Board {
        line: usize,
        #[source]
        source: BoardError,
    },
}
