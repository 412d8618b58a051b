//! # Core Type Definitions
//!
//! This module contains the identifiers and the error taxonomy shared by the
//! graph, the mapper, the annotator and the sorter:
//! - Model identity (`ModelId`)
//! - Location of an entry inside a nested model (`ModelPath`)
//! - Non-fatal diagnostics (`Warning`)
//! - Error types (`CycleError`, `DuplicateEntryError`, `SortingError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module implement `Ord` so they can live in
//! `BTreeMap`/`BTreeSet` and always iterate in the same order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// MODEL IDENTIFIERS
// =============================================================================

/// Identifier of a model.
///
/// Only used to tell models apart in diagnostics; it plays no part in
/// dependency resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ModelId(pub u64);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a model inside the model tree.
///
/// The root model has an empty path. A model nested under the entry `outer`
/// of the root has the path `["outer"]`, and so on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct ModelPath(Vec<String>);

impl ModelPath {
    /// The path of the root model.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the model nested under `key` in this model.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// Path segments from the root down.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Nesting depth (0 for the root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ModelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "/{}", self.0.join("/"))
        }
    }
}

// =============================================================================
// WARNINGS
// =============================================================================

/// A non-fatal finding of an analysis run.
///
/// Warnings never change the computed order or annotations; they report
/// model shapes the sorter accepts but cannot fully resolve.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Two entries publish their result under the same name.
    /// The entry visited last owns the result.
    SharedReturnPath {
        result: String,
        previous: String,
        current: String,
    },

    /// `entry` reads `input`, which is the key of a signature entry rather
    /// than a published result name. Resolving it would take more than two
    /// hops, so no annotation is derived for it.
    UnresolvedChain { entry: String, input: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedReturnPath {
                result,
                previous,
                current,
            } => write!(
                f,
                "Result '{}' is published by both '{}' and '{}'; '{}' wins",
                result, previous, current, current
            ),
            Self::UnresolvedChain { entry, input } => write!(
                f,
                "Entry '{}' reads '{}', the key of a signature entry instead of its result; \
                 chains deeper than two hops are not resolved",
                entry, input
            ),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Adding an edge would close a cycle, or the sorted graph still has one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Edge between '{}' and '{}' introduces a cycle in the graph: {}",
    .from,
    .to,
    .cycle.join(" --> ")
)]
pub struct CycleError {
    /// Source of the rejected edge.
    pub from: String,
    /// Target of the rejected edge.
    pub to: String,
    /// The closed path, starting and ending at the same vertex.
    pub cycle: Vec<String>,
}

/// The same entry key appears twice in a flattened model with different values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Entry named: '{entry}' is duplicated in the model: '{model_name}({model_id})'\n{entry}={existing} (at {first_location})\n{entry}={duplicate} (at {duplicate_location})"
)]
pub struct DuplicateEntryError {
    pub entry: String,
    /// Model holding the conflicting occurrence.
    pub model_name: String,
    pub model_id: ModelId,
    /// Path of the model holding the first occurrence.
    pub first_location: ModelPath,
    /// Path of the model holding the conflicting occurrence.
    pub duplicate_location: ModelPath,
    /// Rendering of the value seen first.
    pub existing: String,
    /// Rendering of the conflicting value.
    pub duplicate: String,
}

/// The single error surfaced by an analysis run.
///
/// - No partial results: any error aborts the whole analysis
/// - No retry: every variant is a static defect of the model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortingError {
    /// Conflicting duplicate entry key.
    #[error(transparent)]
    Duplicate(#[from] DuplicateEntryError),

    /// The dependency graph is cyclic.
    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// Models are nested deeper than `MAX_NESTING_DEPTH`.
    #[error("Model '{model_name}' is nested {depth} levels deep (limit {limit})")]
    NestingTooDeep {
        model_name: String,
        depth: usize,
        limit: usize,
    },
}

impl SortingError {
    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
