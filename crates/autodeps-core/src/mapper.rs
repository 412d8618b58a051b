//! # Mapper
//!
//! Populates a [`Dag`] from a model.
//!
//! Mapping runs in two passes over the model tree, nested models included:
//! 1. Vertex pass: one vertex per entry key and per return-path name, plus
//!    the result-name and location indexes. Conflicting duplicate keys abort
//!    here, before any edge exists.
//! 2. Edge pass: `result -> entry` for every signature entry with a return
//!    path, then `input -> result` for each of its inputs.
//!
//! Both passes walk entries in key order, so the same model always yields
//! the same graph.

use crate::graph::Dag;
use crate::model::{Entry, Model};
use crate::primitives::MAX_NESTING_DEPTH;
use crate::{DuplicateEntryError, ModelPath, SortingError, Warning};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// MAPPING
// =============================================================================

/// The outcome of mapping one model: the graph plus the indexes the
/// annotator needs to translate result names back into entry keys.
///
/// A `Mapping` owns all of its data and does not borrow the model, so the
/// model can be annotated while the mapping is alive.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    graph: Dag,
    /// Result name -> key of the entry that publishes it.
    producers: BTreeMap<String, String>,
    /// Entry key -> paths of the models holding the entry, in visiting
    /// order. More than one path means identical duplicates.
    locations: BTreeMap<String, Vec<ModelPath>>,
    /// Keys of entries holding a signature with a return path.
    signature_entries: BTreeSet<String>,
    warnings: Vec<Warning>,
}

impl Mapping {
    /// The mapped graph.
    #[must_use]
    pub fn graph(&self) -> &Dag {
        &self.graph
    }

    /// Consume the mapping, keeping only the graph.
    #[must_use]
    pub fn into_graph(self) -> Dag {
        self.graph
    }

    /// Key of the entry publishing `result`, if any.
    #[must_use]
    pub fn producer_of(&self, result: &str) -> Option<&str> {
        self.producers.get(result).map(String::as_str)
    }

    /// Check if `name` is a published result name.
    #[must_use]
    pub fn is_result(&self, name: &str) -> bool {
        self.producers.contains_key(name)
    }

    /// Check if `name` is an entry key anywhere in the flattened model.
    #[must_use]
    pub fn is_entry(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Check if `name` is the key of a signature entry with a return path.
    #[must_use]
    pub fn is_signature_entry(&self, name: &str) -> bool {
        self.signature_entries.contains(name)
    }

    /// Paths of every model holding entry `key`; empty if `key` is not an
    /// entry.
    #[must_use]
    pub fn locations_of(&self, key: &str) -> &[ModelPath] {
        self.locations.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Warnings raised while mapping.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

// =============================================================================
// MAPPER
// =============================================================================

/// Builds a [`Mapping`] from a model.
///
/// A mapper is single-use: `Mapper::map` creates one, runs both passes and
/// hands back the finished mapping.
#[derive(Debug, Default)]
pub struct Mapper<'m> {
    mapping: Mapping,
    /// Entry key -> first value seen under that key, for duplicate detection.
    /// Values are compared with annotations ignored.
    seen: BTreeMap<&'m str, &'m Entry>,
}

impl<'m> Mapper<'m> {
    /// Map `model` and all nested models into a dependency graph.
    ///
    /// # Errors
    ///
    /// - `SortingError::Duplicate` if a key appears twice with different values
    /// - `SortingError::Cycle` if an edge would close a cycle
    /// - `SortingError::NestingTooDeep` if models nest beyond `MAX_NESTING_DEPTH`
    pub fn map(model: &'m Model) -> Result<Mapping, SortingError> {
        let mut mapper = Self::default();
        mapper.add_vertices(model, &ModelPath::root())?;
        mapper.add_edges(model)?;
        Ok(mapper.mapping)
    }

    /// Vertex pass.
    fn add_vertices(&mut self, model: &'m Model, path: &ModelPath) -> Result<(), SortingError> {
        if path.depth() > MAX_NESTING_DEPTH {
            return Err(SortingError::NestingTooDeep {
                model_name: model.name.clone(),
                depth: path.depth(),
                limit: MAX_NESTING_DEPTH,
            });
        }

        for (key, entry) in &model.entries {
            match self.seen.get(key.as_str()) {
                Some(existing) if !existing.content_eq(entry) => {
                    let first_location = self
                        .mapping
                        .locations_of(key)
                        .first()
                        .cloned()
                        .unwrap_or_default();
                    return Err(DuplicateEntryError {
                        entry: key.clone(),
                        model_name: model.name.clone(),
                        model_id: model.id,
                        first_location,
                        duplicate_location: path.clone(),
                        existing: existing.describe(),
                        duplicate: entry.describe(),
                    }
                    .into());
                }
                Some(_) => {}
                None => {
                    self.seen.insert(key.as_str(), entry);
                }
            }

            self.mapping.graph.add_vertex(key);
            self.mapping
                .locations
                .entry(key.clone())
                .or_default()
                .push(path.clone());

            if let Some(rp) = entry.return_path() {
                self.mapping.graph.add_vertex(&rp.name);
                self.mapping.signature_entries.insert(key.clone());
                self.register_producer(&rp.name, key);
            }
            if let Entry::Model(nested) = entry {
                self.add_vertices(nested, &path.child(key))?;
            }
        }

        Ok(())
    }

    /// Record `key` as the producer of `result`; the latest producer wins.
    fn register_producer(&mut self, result: &str, key: &str) {
        let previous = self
            .mapping
            .producers
            .insert(result.to_string(), key.to_string());

        if let Some(previous) = previous.filter(|previous| previous != key) {
            self.mapping.warnings.push(Warning::SharedReturnPath {
                result: result.to_string(),
                previous,
                current: key.to_string(),
            });
        }
    }

    /// Edge pass.
    fn add_edges(&mut self, model: &'m Model) -> Result<(), SortingError> {
        for (key, entry) in &model.entries {
            if let Some(rp) = entry.return_path() {
                self.mapping.graph.add_edge(&rp.name, key)?;
                for input in &rp.inputs {
                    self.mapping.graph.add_edge(input, &rp.name)?;
                }
            }
            if let Entry::Model(nested) = entry {
                self.add_edges(nested)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
