//! # Analysis Primitives
//!
//! Hardcoded bounds for the autodeps CORE.
//!
//! These constants are compiled into the binary and are immutable at runtime.
//! Every analysis is a bounded traversal of the model; the bound below keeps
//! it that way for hostile or malformed input.

/// Maximum nesting depth of models inside models.
///
/// The root model is depth 0. Mapping a model nested deeper than this fails
/// with `SortingError::NestingTooDeep` instead of recursing further.
pub const MAX_NESTING_DEPTH: usize = 64;
