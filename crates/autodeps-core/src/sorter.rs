//! # Sorter
//!
//! One-shot driver of an analysis run.
//!
//! ```text
//! Model ─▶ Mapper ─▶ Dag ─▶ topological order ─▶ Annotator ─▶ annotated Model
//! ```
//!
//! Every run builds its own graph and indexes and drops them when it
//! returns. Nothing is written to the model unless mapping and sorting both
//! succeed.

use crate::annotator::Annotator;
use crate::graph::Dag;
use crate::mapper::Mapper;
use crate::model::Model;
use crate::{SortingError, Warning};
use serde::Serialize;

/// Outcome of a successful run, besides the annotated model itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Every vertex of the dependency graph in evaluation order.
    pub order: Vec<String>,
    /// Number of entries that received an annotation.
    pub annotated: usize,
    /// Non-fatal findings.
    pub warnings: Vec<Warning>,
}

/// Evaluation order of a model, computed without annotating it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule {
    /// Every vertex of the dependency graph in evaluation order.
    pub order: Vec<String>,
    /// The entry keys among `order`, in the same order.
    pub entries: Vec<String>,
    /// Non-fatal findings of the mapping.
    pub warnings: Vec<Warning>,
}

/// The analysis driver.
pub struct Sorter;

impl Sorter {
    /// Analyse `model` in place: sort its dependency graph and replace its
    /// depends-on annotations.
    ///
    /// On error the model is left untouched.
    pub fn sort(model: &mut Model) -> Result<Report, SortingError> {
        let mapping = Mapper::map(model)?;
        let order = mapping.graph().topological_sort()?;
        let resolution = Annotator::new(&mapping).resolve(&order);

        let mut warnings = mapping.warnings().to_vec();
        warnings.extend(resolution.warnings.iter().cloned());

        let annotated = resolution.apply(model);

        Ok(Report {
            order,
            annotated,
            warnings,
        })
    }

    /// Build the dependency graph of `model` without annotating it.
    pub fn graph(model: &Model) -> Result<Dag, SortingError> {
        Ok(Mapper::map(model)?.into_graph())
    }

    /// Evaluation order of `model` without annotating it.
    pub fn order(model: &Model) -> Result<Vec<String>, SortingError> {
        Ok(Self::schedule(model)?.order)
    }

    /// Evaluation order of `model`, with its entry keys picked out.
    pub fn schedule(model: &Model) -> Result<Schedule, SortingError> {
        let mapping = Mapper::map(model)?;
        let order = mapping.graph().topological_sort()?;
        let entries = order
            .iter()
            .filter(|vertex| mapping.is_entry(vertex))
            .cloned()
            .collect();

        Ok(Schedule {
            order,
            entries,
            warnings: mapping.warnings().to_vec(),
        })
    }
}

/// Analyse `model` and return it with depends-on annotations attached.
///
/// # Errors
///
/// Returns `SortingError` on conflicting duplicate keys, cyclic dependencies
/// or excessive nesting. No partial result is produced.
pub fn analyze(mut model: Model) -> Result<Model, SortingError> {
    Sorter::sort(&mut model)?;
    Ok(model)
}

// =============================================================================
// TESTS
// =============================================================================
