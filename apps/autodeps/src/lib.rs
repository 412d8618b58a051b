//! # autodeps
//!
//! Application layer around `autodeps-core`: model documents, the CLI and
//! its error type. The binary in `main.rs` only sets up logging and calls
//! [`cli::execute`].

pub mod cli;
pub mod document;
pub mod error;

pub use document::Format;
pub use error::AppError;
