//! Errors raised at the crate boundary
//!
//! The simulation itself never fails: it skips a spawn or returns `None`
//! instead. Only loading external data or parsing operator symbols can error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown operator symbol: {0:?}")]
    UnknownOperator(String),
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
