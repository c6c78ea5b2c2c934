//! Descriptive metadata carried by every signal.
//!
//! Annotations are free-form key/value pairs. Array annotations hold one
//! value per channel and follow the channels through selection and merging.
//! When two signals are combined, labels and annotations are reconciled by
//! the policies in this module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single annotation value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<AnnotationValue>),
    Map(BTreeMap<String, AnnotationValue>),
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<bool> for AnnotationValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<AnnotationValue>> From<Vec<T>> for AnnotationValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

pub type Annotations = BTreeMap<String, AnnotationValue>;

/// Per-channel annotation arrays, each of length equal to the channel count.
pub type ArrayAnnotations = BTreeMap<String, Vec<AnnotationValue>>;

/// Non-owning reference to the container that holds a signal.
///
/// The index points into an arena owned elsewhere; signals never
/// dereference it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerHandle(pub usize);

/// Labels and annotations of a signal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_origin: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: Annotations,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub array_annotations: ArrayAnnotations,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Labels only, with annotations dropped.
    pub fn labels_only(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            file_origin: self.file_origin.clone(),
            ..Self::default()
        }
    }

    /// Check that every array annotation has one entry per channel.
    pub(crate) fn check_channels(&self, channels: usize) -> Result<(), (usize, usize)> {
        for values in self.array_annotations.values() {
            if values.len() != channels {
                return Err((channels, values.len()));
            }
        }
        Ok(())
    }

    /// Keep the array-annotation entries for the given channels.
    pub(crate) fn select_channels(&self, channels: &[usize]) -> Self {
        let array_annotations = self
            .array_annotations
            .iter()
            .map(|(key, values)| {
                let picked = channels.iter().filter_map(|&c| values.get(c).cloned()).collect();
                (key.clone(), picked)
            })
            .collect();
        Self {
            array_annotations,
            ..self.clone()
        }
    }
}

/// Join two labels with `;` when they differ.
pub fn join_pair(left: &Option<String>, right: &Option<String>) -> Option<String> {
    match (left, right) {
        (Some(a), Some(b)) if a == b => Some(a.clone()),
        (Some(a), Some(b)) => Some(format!("{};{}", a, b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Combine labels as `op(a, b, ...)` unless they are all identical.
///
/// Missing labels render as `None` inside the joined form.
pub fn join_labels<'a, I>(op: &str, labels: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Option<String>>,
{
    let labels: Vec<&Option<String>> = labels.into_iter().collect();
    let first = labels.first()?;
    if labels.iter().all(|l| l == first) {
        return (*first).clone();
    }
    let parts: Vec<&str> = labels
        .iter()
        .map(|l| l.as_deref().unwrap_or("None"))
        .collect();
    Some(format!("{}({})", op, parts.join(", ")))
}

/// Merge two annotation values.
///
/// Equal values are kept, strings join with `;`, lists concatenate and
/// maps merge key by key. Any other conflict becomes the `;`-joined
/// rendering of both values.
pub fn merge_value(left: &AnnotationValue, right: &AnnotationValue) -> AnnotationValue {
    use AnnotationValue::*;

    if left == right {
        return left.clone();
    }
    match (left, right) {
        (Text(a), Text(b)) => Text(format!("{};{}", a, b)),
        (List(a), List(b)) => List(a.iter().chain(b.iter()).cloned().collect()),
        (Map(a), Map(b)) => Map(merge_annotations(a, b)),
        (a, b) => Text(format!("{};{}", a, b)),
    }
}

/// Merge two annotation maps; keys present on one side only are kept.
pub fn merge_annotations(left: &Annotations, right: &Annotations) -> Annotations {
    let mut merged = left.clone();
    for (key, value) in right {
        let combined = match left.get(key) {
            Some(existing) => merge_value(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Concatenate array annotations channel-wise across inputs.
///
/// Keys missing from any input are dropped.
pub(crate) fn stack_array_annotations(inputs: &[&Metadata]) -> ArrayAnnotations {
    let mut stacked = ArrayAnnotations::new();
    let Some(first) = inputs.first() else {
        return stacked;
    };

    for key in first.array_annotations.keys() {
        if inputs.iter().all(|m| m.array_annotations.contains_key(key)) {
            let values = inputs
                .iter()
                .filter_map(|m| m.array_annotations.get(key))
                .flat_map(|v| v.iter().cloned())
                .collect();
            stacked.insert(key.clone(), values);
        } else {
            tracing::warn!("Dropping array annotation '{}': not present on every input", key);
        }
    }
    for meta in inputs.iter().skip(1) {
        for key in meta.array_annotations.keys() {
            if !first.array_annotations.contains_key(key) {
                tracing::warn!("Dropping array annotation '{}': not present on every input", key);
            }
        }
    }
    stacked
}

/// Keep array annotations that are identical on every input.
pub(crate) fn common_array_annotations(inputs: &[&Metadata]) -> ArrayAnnotations {
    let Some(first) = inputs.first() else {
        return ArrayAnnotations::new();
    };
    first
        .array_annotations
        .iter()
        .filter(|(key, values)| {
            let shared = inputs
                .iter()
                .all(|m| m.array_annotations.get(*key) == Some(*values));
            if !shared {
                tracing::warn!("Dropping array annotation '{}': values differ between inputs", key);
            }
            shared
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
