//! # Model
//!
//! The declarative model the sorter analyses.
//!
//! A `Model` is a keyed collection of entries. Each entry holds either an
//! opaque value, a `Signature` describing an invocable unit, or another
//! `Model`. Signatures may declare a `ReturnPath`: the name their result is
//! published under and the names they read before they can run.
//!
//! Entries and annotations are kept in `BTreeMap`s so that every walk over a
//! model visits keys in the same order.

use crate::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// RETURN PATH & SIGNATURE
// =============================================================================

/// Where a signature publishes its result, and what it reads first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPath {
    /// Name the result is published under. May differ from the entry key.
    pub name: String,
    /// Names read before the signature can run, in declaration order.
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl ReturnPath {
    /// A return path with no inputs.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
        }
    }

    /// A return path reading the given inputs.
    #[must_use]
    pub fn with_inputs<I, S>(name: impl Into<String>, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Description of an invocable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Operation selector.
    pub selector: String,
    /// Service type providing the operation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    /// Declared result location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_path: Option<ReturnPath>,
}

impl Signature {
    /// A signature without a return path.
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            service_type: None,
            return_path: None,
        }
    }

    /// Set the return path.
    #[must_use]
    pub fn with_return_path(mut self, return_path: ReturnPath) -> Self {
        self.return_path = Some(return_path);
        self
    }
}

// =============================================================================
// ENTRY
// =============================================================================

/// The value held by a model entry.
///
/// Only `Signature` entries with a return path take part in dependency edges;
/// `Model` entries are descended into and their contents flattened into the
/// same analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    /// Opaque data.
    Value(serde_json::Value),
    /// An invocable unit.
    Signature(Signature),
    /// A nested model.
    Model(Model),
}

impl Entry {
    /// The declared return path, if this entry is a signature that has one.
    #[must_use]
    pub fn return_path(&self) -> Option<&ReturnPath> {
        match self {
            Self::Signature(signature) => signature.return_path.as_ref(),
            Self::Value(_) | Self::Model(_) => None,
        }
    }

    /// Rendering used in diagnostics. Nested models are rendered with all
    /// their entries.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => value.to_string(),
            Self::Signature(signature) => match &signature.return_path {
                Some(rp) => format!(
                    "sig({} -> {} [{}])",
                    signature.selector,
                    rp.name,
                    rp.inputs.join(", ")
                ),
                None => format!("sig({})", signature.selector),
            },
            Self::Model(model) => {
                let entries: Vec<String> = model
                    .entries
                    .iter()
                    .map(|(key, entry)| format!("{}: {}", key, entry.describe()))
                    .collect();
                format!("model({}({}) {{{}}})", model.name, model.id, entries.join(", "))
            }
        }
    }

    /// Equality of content, ignoring depends-on annotations at any depth.
    #[must_use]
    pub fn content_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Model(a), Self::Model(b)) => a.content_eq(b),
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Signature(a), Self::Signature(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Signature> for Entry {
    fn from(signature: Signature) -> Self {
        Self::Signature(signature)
    }
}

impl From<Model> for Entry {
    fn from(model: Model) -> Self {
        Self::Model(model)
    }
}

impl From<serde_json::Value> for Entry {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

// =============================================================================
// DEPENDS-ON ANNOTATION
// =============================================================================

/// Ordered, duplicate-free list of entry keys that must be evaluated first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependsOn(Vec<String>);

impl DependsOn {
    /// Create an empty annotation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless it is already listed.
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if !self.0.contains(&entry) {
            self.0.push(entry);
        }
    }

    /// The listed entry keys, in order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.0
    }

    /// Check whether `entry` is listed.
    #[must_use]
    pub fn contains(&self, entry: &str) -> bool {
        self.0.iter().any(|e| e == entry)
    }

    /// Number of listed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DependsOn {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut depends_on = Self::new();
        for entry in iter {
            depends_on.push(entry);
        }
        depends_on
    }
}

impl fmt::Display for DependsOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

// =============================================================================
// MODEL
// =============================================================================

/// A named, keyed collection of entries, possibly nesting other models.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Model {
    /// Model name, for diagnostics.
    pub name: String,
    /// Model identifier, for diagnostics.
    #[serde(default)]
    pub id: ModelId,
    /// Entries by key.
    #[serde(default, deserialize_with = "deserialize_entries")]
    pub entries: BTreeMap<String, Entry>,
    /// Derived depends-on annotations by entry key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub depends_on: BTreeMap<String, DependsOn>,
}

impl Model {
    /// Create an empty model.
    #[must_use]
    pub fn new(name: impl Into<String>, id: ModelId) -> Self {
        Self {
            name: name.into(),
            id,
            ..Self::default()
        }
    }

    /// Builder-style insertion; replaces an existing entry with the same key.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.entries.insert(key.into(), entry.into());
        self
    }

    /// Insert an entry, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Option<Entry> {
        self.entries.insert(key.into(), entry.into())
    }

    /// Get an entry by key (this model only, not nested models).
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Get the annotation of an entry of this model.
    #[must_use]
    pub fn dependencies_of(&self, key: &str) -> Option<&DependsOn> {
        self.depends_on.get(key)
    }

    /// Attach an annotation to an entry of this model.
    pub fn annotate(&mut self, key: impl Into<String>, depends_on: DependsOn) {
        self.depends_on.insert(key.into(), depends_on);
    }

    /// Follow `segments` down through nested model entries.
    #[must_use]
    pub fn nested(&self, segments: &[String]) -> Option<&Model> {
        let mut current = self;
        for key in segments {
            match current.entries.get(key) {
                Some(Entry::Model(model)) => current = model,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Mutable variant of [`Model::nested`].
    pub fn nested_mut(&mut self, segments: &[String]) -> Option<&mut Model> {
        let mut current = self;
        for key in segments {
            match current.entries.get_mut(key) {
                Some(Entry::Model(model)) => current = model,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Remove every annotation in this model and all nested models.
    pub fn clear_annotations(&mut self) {
        self.depends_on.clear();
        for entry in self.entries.values_mut() {
            if let Entry::Model(model) = entry {
                model.clear_annotations();
            }
        }
    }

    /// Equality of name, id and entries, ignoring depends-on annotations
    /// here and in every nested model.
    #[must_use]
    pub fn content_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.id == other.id
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((ka, a), (kb, b))| ka == kb && a.content_eq(b))
    }

    /// Number of entries in this model and all nested models.
    #[must_use]
    pub fn flattened_len(&self) -> usize {
        self.entries
            .values()
            .map(|entry| match entry {
                Entry::Model(model) => 1 + model.flattened_len(),
                Entry::Value(_) | Entry::Signature(_) => 1,
            })
            .sum()
    }
}

/// Deserialize an entry map, rejecting a key repeated with a different value.
/// A key repeated with identical content is kept once.
fn deserialize_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, Entry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;

    struct EntriesVisitor;

    impl<'de> de::Visitor<'de> for EntriesVisitor {
        type Value = BTreeMap<String, Entry>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of entry keys to entries")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            let mut entries = BTreeMap::new();
            while let Some((key, entry)) = access.next_entry::<String, Entry>()? {
                match entries.get(&key) {
                    Some(existing) if !Entry::content_eq(existing, &entry) => {
                        return Err(de::Error::custom(format!(
                            "entry '{}' is defined twice with different values: {} and {}",
                            key,
                            existing.describe(),
                            entry.describe()
                        )));
                    }
                    Some(_) => {}
                    None => {
                        entries.insert(key, entry);
                    }
                }
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sig(result: &str, inputs: &[&str]) -> Signature {
        Signature::new("invoke").with_return_path(ReturnPath::with_inputs(result, inputs.to_vec()))
    }

    #[test]
    fn entry_return_path_only_for_signatures() {
        assert!(Entry::from(sig("ra", &[])).return_path().is_some());
        assert!(Entry::from(Signature::new("bare")).return_path().is_none());
        assert!(Entry::from(json!(3)).return_path().is_none());
        assert!(Entry::from(Model::default()).return_path().is_none());
    }

    #[test]
    fn depends_on_deduplicates_preserving_order() {
        let depends_on: DependsOn = ["b", "a", "b", "c", "a"].into_iter().collect();
        assert_eq!(depends_on.entries(), ["b", "a", "c"]);
        assert_eq!(depends_on.len(), 3);
        assert!(depends_on.contains("c"));
        assert_eq!(depends_on.to_string(), "[b, a, c]");
    }

    #[test]
    fn nested_lookup_follows_model_entries() {
        let inner = Model::new("inner", ModelId(2)).with_entry("x", json!(1));
        let outer = Model::new("outer", ModelId(1))
            .with_entry("sub", inner)
            .with_entry("leaf", json!("v"));

        let path = vec!["sub".to_string()];
        assert_eq!(outer.nested(&path).map(|m| m.name.as_str()), Some("inner"));
        assert!(outer.nested(&["leaf".to_string()]).is_none());
        assert!(outer.nested(&["missing".to_string()]).is_none());
        assert_eq!(outer.flattened_len(), 3);
    }

    #[test]
    fn clear_annotations_is_recursive() {
        let mut inner = Model::new("inner", ModelId(2)).with_entry("x", json!(1));
        inner.annotate("x", ["y"].into_iter().collect());
        let mut outer = Model::new("outer", ModelId(1)).with_entry("sub", inner);
        outer.annotate("sub", ["z"].into_iter().collect());

        outer.clear_annotations();

        assert!(outer.depends_on.is_empty());
        let path = vec!["sub".to_string()];
        assert!(outer.nested(&path).is_some_and(|m| m.depends_on.is_empty()));
    }

    #[test]
    fn model_deserializes_tagged_entries() {
        let doc = json!({
            "name": "pipeline",
            "id": 3,
            "entries": {
                "rate": { "value": 0.5 },
                "a": { "signature": {
                    "selector": "compute",
                    "return_path": { "name": "ra", "inputs": ["rate"] }
                } },
                "sub": { "model": { "name": "sub", "entries": {} } }
            }
        });

        let model: Model = serde_json::from_value(doc).expect("deserialize");
        assert_eq!(model.id, ModelId(3));
        assert!(matches!(model.entry("rate"), Some(Entry::Value(_))));
        assert!(matches!(model.entry("sub"), Some(Entry::Model(_))));
        let rp = model.entry("a").and_then(Entry::return_path);
        assert_eq!(rp.map(|rp| rp.inputs.clone()), Some(vec!["rate".to_string()]));
    }

    #[test]
    fn describe_renders_signature() {
        let entry = Entry::from(sig("rb", &["ra", "rc"]));
        assert_eq!(entry.describe(), "sig(invoke -> rb [ra, rc])");
    }

    #[test]
    fn describe_renders_model_contents() {
        let one = Entry::from(Model::new("m", ModelId(2)).with_entry("x", json!(1)));
        let two = Entry::from(Model::new("m", ModelId(2)).with_entry("x", json!(2)));

        assert_eq!(one.describe(), "model(m(2) {x: 1})");
        assert_ne!(one.describe(), two.describe());
    }

    #[test]
    fn content_eq_ignores_annotations() {
        let build = || {
            Model::new("inner", ModelId(2))
                .with_entry("a", sig("ra", &[]))
                .with_entry("b", sig("rb", &["ra"]))
        };
        let plain = Entry::from(build());
        let mut annotated_model = build();
        annotated_model.annotate("b", ["a"].into_iter().collect());
        let annotated =
            Entry::from(Model::new("outer", ModelId(1)).with_entry("sub", annotated_model));
        let reference = Entry::from(Model::new("outer", ModelId(1)).with_entry("sub", build()));

        assert!(plain.content_eq(&Entry::from(build())));
        assert!(annotated.content_eq(&reference));
        assert_ne!(annotated, reference);
        assert!(!plain.content_eq(&Entry::from(json!(1))));
        assert!(!plain.content_eq(&Entry::from(build().with_entry("c", json!(0)))));
    }

    #[test]
    fn repeated_key_with_different_value_is_rejected() {
        let doc = r#"{"name": "m", "entries": {"a": {"value": 1}, "a": {"value": 2}}}"#;
        let err = serde_json::from_str::<Model>(doc).expect_err("duplicate key");
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn repeated_key_with_same_value_is_accepted() {
        let doc = r#"{"name": "m", "entries": {"a": {"value": 1}, "a": {"value": 1}}}"#;
        let model: Model = serde_json::from_str(doc).expect("deserialize");
        assert_eq!(model.entries.len(), 1);
    }
}
