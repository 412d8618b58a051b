//! # Annotator
//!
//! Turns the sorted graph into depends-on annotations.
//!
//! Entries rarely read each other by key: a signature publishes its result
//! under its return-path name and consumers read that name. The annotator
//! walks the reverse index two hops from every entry to translate result
//! names back into the keys of the entries producing them:
//!
//! ```text
//! entry b  <-  rb (b's own result)  <-  ra (an input of rb)  ==> producer(ra) = a
//! ```
//!
//! so `b` is annotated with `[a]`. Chains that would need a third hop are
//! reported as `Warning::UnresolvedChain` and left alone.
//!
//! An entry present in several places as identical duplicates is annotated
//! in each of them.

use crate::mapper::Mapping;
use crate::model::{DependsOn, Model};
use crate::{ModelPath, Warning};

/// The annotation derived for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Entry key.
    pub entry: String,
    /// Paths of the models holding the entry.
    pub locations: Vec<ModelPath>,
    /// Entries that must be evaluated first.
    pub depends_on: DependsOn,
}

/// Annotations derived from one sorted mapping, in topological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub annotations: Vec<Annotation>,
    pub warnings: Vec<Warning>,
}

impl Resolution {
    /// Replace every annotation in `model` with the resolved ones.
    ///
    /// Prior annotations are cleared throughout the model tree first, so the
    /// result never depends on what an earlier run wrote. Returns the number
    /// of annotations written, counting every location.
    pub fn apply(&self, model: &mut Model) -> usize {
        model.clear_annotations();

        let mut written = 0;
        for annotation in &self.annotations {
            for location in &annotation.locations {
                if let Some(owner) = model.nested_mut(location.segments()) {
                    owner.annotate(annotation.entry.clone(), annotation.depends_on.clone());
                    written += 1;
                }
            }
        }
        written
    }
}

/// Derives depends-on annotations from a mapping and its sorted order.
pub struct Annotator<'a> {
    mapping: &'a Mapping,
}

impl<'a> Annotator<'a> {
    /// Create an annotator over a finished mapping.
    #[must_use]
    pub fn new(mapping: &'a Mapping) -> Self {
        Self { mapping }
    }

    /// Resolve annotations for every entry key in `order`.
    ///
    /// Vertices that are not entry keys (result names, external inputs) are
    /// skipped. Entries without upstream producers get no annotation.
    #[must_use]
    pub fn resolve(&self, order: &[String]) -> Resolution {
        let mut resolution = Resolution::default();

        for entry in order {
            if !self.mapping.is_entry(entry) {
                continue;
            }

            let depends_on = self.resolve_entry(entry, &mut resolution.warnings);
            if depends_on.is_empty() {
                continue;
            }

            resolution.annotations.push(Annotation {
                entry: entry.clone(),
                locations: self.mapping.locations_of(entry).to_vec(),
                depends_on,
            });
        }

        resolution
    }

    /// Two-hop walk for a single entry.
    fn resolve_entry(&self, entry: &str, warnings: &mut Vec<Warning>) -> DependsOn {
        let graph = self.mapping.graph();
        let mut depends_on = DependsOn::new();

        // Hop 1: results this entry waits on (its own return path)
        for result in graph.dependencies(entry) {
            if !self.mapping.is_result(result) {
                continue;
            }

            // Hop 2: names that result reads
            for input in graph.dependencies(result) {
                if let Some(producer) = self.mapping.producer_of(input) {
                    depends_on.push(producer);
                } else if self.mapping.is_signature_entry(input) {
                    let warning = Warning::UnresolvedChain {
                        entry: entry.to_string(),
                        input: input.to_string(),
                    };
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
            }
        }

        depends_on
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelId;
    use crate::mapper::Mapper;
    use crate::model::{ReturnPath, Signature};
    use serde_json::json;

    fn sig(result: &str, inputs: &[&str]) -> Signature {
        Signature::new("invoke").with_return_path(ReturnPath::with_inputs(result, inputs.to_vec()))
    }

    fn resolve(model: &Model) -> Resolution {
        let mapping = Mapper::map(model).expect("map");
        let order = mapping.graph().topological_sort().expect("sort");
        Annotator::new(&mapping).resolve(&order)
    }

    fn annotation_for<'r>(resolution: &'r Resolution, entry: &str) -> Option<&'r DependsOn> {
        resolution
            .annotations
            .iter()
            .find(|annotation| annotation.entry == entry)
            .map(|annotation| &annotation.depends_on)
    }

    #[test]
    fn consumer_depends_on_producer() {
        let model = Model::new("m", ModelId(1))
            .with_entry("a", sig("ra", &[]))
            .with_entry("b", sig("rb", &["ra"]));

        let resolution = resolve(&model);
        assert_eq!(
            annotation_for(&resolution, "b").map(DependsOn::entries),
            Some(&["a".to_string()][..])
        );
        assert!(annotation_for(&resolution, "a").is_none());
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn multiple_producers_keep_input_order() {
        let model = Model::new("m", ModelId(1))
            .with_entry("a", sig("ra", &[]))
            .with_entry("b", sig("rb", &[]))
            .with_entry("c", sig("rc", &["rb", "ra", "rb"]));

        let resolution = resolve(&model);
        let deps = annotation_for(&resolution, "c").expect("annotation");
        assert_eq!(deps.entries(), ["b", "a"]);
    }

    #[test]
    fn plain_value_inputs_add_nothing() {
        let model = Model::new("m", ModelId(1))
            .with_entry("rate", json!(0.25))
            .with_entry("a", sig("ra", &["rate", "external"]));

        let resolution = resolve(&model);
        assert!(resolution.annotations.is_empty());
        assert!(resolution.warnings.is_empty());
    }

    #[test]
    fn transitive_chain_annotates_each_link() {
        let model = Model::new("m", ModelId(1))
            .with_entry("a", sig("ra", &[]))
            .with_entry("b", sig("rb", &["ra"]))
            .with_entry("c", sig("rc", &["rb"]));

        let resolution = resolve(&model);
        let rendered = |entry: &str| annotation_for(&resolution, entry).map(|d| d.to_string());
        assert_eq!(rendered("b"), Some("[a]".into()));
        assert_eq!(rendered("c"), Some("[b]".into()));
        let order: Vec<_> = resolution.annotations.iter().map(|a| a.entry.as_str()).collect();
        assert_eq!(order, vec!["b", "c"]);
    }

    #[test]
    fn reading_an_entry_key_is_flagged_not_resolved() {
        let model = Model::new("m", ModelId(1))
            .with_entry("a", sig("ra", &[]))
            .with_entry("b", sig("rb", &["a"]));

        let resolution = resolve(&model);
        assert!(annotation_for(&resolution, "b").is_none());
        assert_eq!(
            resolution.warnings,
            vec![Warning::UnresolvedChain {
                entry: "b".into(),
                input: "a".into(),
            }]
        );
    }

    #[test]
    fn apply_writes_into_owning_model() {
        let inner = Model::new("inner", ModelId(2))
            .with_entry("inner", sig("ri", &[]))
            .with_entry("mid", sig("rm", &["ri"]));
        let mut model = Model::new("outer", ModelId(1))
            .with_entry("outer", inner)
            .with_entry("consumer", sig("rc", &["rm"]));

        let resolution = resolve(&model);
        let written = resolution.apply(&mut model);

        assert_eq!(written, 2);
        assert_eq!(
            model.dependencies_of("consumer").map(|d| d.to_string()),
            Some("[mid]".to_string())
        );
        let nested = model.nested(&["outer".to_string()]).expect("nested");
        assert_eq!(
            nested.dependencies_of("mid").map(|d| d.to_string()),
            Some("[inner]".to_string())
        );
        assert!(model.dependencies_of("mid").is_none());
    }

    #[test]
    fn apply_writes_every_identical_copy() {
        let shared = || {
            Model::new("shared", ModelId(2))
                .with_entry("a", sig("ra", &[]))
                .with_entry("b", sig("rb", &["ra"]))
        };
        let mut model = Model::new("root", ModelId(1))
            .with_entry("sub", shared())
            .with_entry(
                "other",
                Model::new("other", ModelId(3)).with_entry("sub", shared()),
            );

        let resolution = resolve(&model);
        assert_eq!(resolution.apply(&mut model), 2);

        for path in [vec!["sub".to_string()], vec!["other".to_string(), "sub".to_string()]] {
            let copy = model.nested(&path).expect("copy");
            assert_eq!(
                copy.dependencies_of("b").map(|d| d.to_string()),
                Some("[a]".into())
            );
        }
    }

    #[test]
    fn apply_discards_stale_annotations() {
        let mut model = Model::new("m", ModelId(1))
            .with_entry("a", sig("ra", &[]))
            .with_entry("b", json!(1));
        model.annotate("b", ["a"].into_iter().collect());

        let resolution = resolve(&model);
        assert_eq!(resolution.apply(&mut model), 0);
        assert!(model.depends_on.is_empty());
    }
}
