//! # autodeps-core
//!
//! The deterministic dependency sorter for autodeps - THE LOGIC.
//!
//! A model is a keyed collection of entries. Some entries are signatures
//! that read named inputs and publish a named result; the result name
//! usually differs from the entry key. This crate works out which entries
//! depend on which, in terms of entry keys, and writes that back onto the
//! model as depends-on annotations a scheduler can honour.
//!
//! ## Pipeline
//!
//! - `mapper`: model -> `Dag` (vertices for keys and result names)
//! - `graph`: cycle-safe edge insertion and topological sort
//! - `annotator`: sorted order -> per-entry depends-on lists
//! - `sorter`: the one-shot driver tying the three together
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO I/O and NO logging dependency (pure Rust)
//! - Deterministic: `BTreeMap` ordering, insertion-ordered tie-breaking
//! - Fail-fast: an analysis either annotates the whole model or nothing

// =============================================================================
// MODULES
// =============================================================================

pub mod annotator;
pub mod graph;
pub mod mapper;
pub mod model;
pub mod primitives;
pub mod sorter;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CycleError, DuplicateEntryError, ModelId, ModelPath, SortingError, Warning};

// =============================================================================
// RE-EXPORTS: Model & Pipeline
// =============================================================================

pub use annotator::{Annotation, Annotator, Resolution};
pub use graph::Dag;
pub use mapper::{Mapper, Mapping};
pub use model::{DependsOn, Entry, Model, ReturnPath, Signature};
pub use sorter::{Report, Schedule, Sorter, analyze};
