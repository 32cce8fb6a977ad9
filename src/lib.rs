//! Cross-references the character chronology pages of the Marvel
//! Chronology Project: which figures appear in which comic, and what they
//! read just before and after it.

pub mod anomaly;
pub mod config;
pub mod error;
pub mod extract;
pub mod graph;
pub mod listing;
pub mod normalize;
pub mod resolve;
pub mod scanner;
pub mod segment;
pub mod token;
pub mod types;

pub use error::{ExtractError, Result};
pub use extract::{Extraction, extract};
