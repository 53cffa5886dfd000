//! Block state conditions.
//!
//! A condition is a boolean predicate over a block's properties. Multipart
//! `when` objects and variant keys both compile down to this tree.

use crate::types::PropertyBag;
use smallvec::SmallVec;
use std::fmt;

/// Accepted values of a single property test. Most tests list one or two.
pub type PropertyValues = SmallVec<[String; 2]>;

/// A predicate over a block's properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Every child must match. Empty matches everything.
    All(Vec<Condition>),
    /// At least one child must match. Empty matches nothing.
    Any(Vec<Condition>),
    /// The property must be present and equal to one of `values`.
    Property { name: String, values: PropertyValues },
}

impl Condition {
    /// The condition that always matches.
    pub fn always() -> Self {
        Condition::All(Vec::new())
    }

    /// The condition that never matches.
    pub fn never() -> Self {
        Condition::Any(Vec::new())
    }

    /// Conjunction of `children`. A single child is returned as-is.
    pub fn and(children: Vec<Condition>) -> Self {
        match <[Condition; 1]>::try_from(children) {
            Ok([only]) => only,
            Err(children) => Condition::All(children),
        }
    }

    /// Disjunction of `children`. A single child is returned as-is.
    pub fn or(children: Vec<Condition>) -> Self {
        match <[Condition; 1]>::try_from(children) {
            Ok([only]) => only,
            Err(children) => Condition::Any(children),
        }
    }

    /// Property test from its source form, where `|` separates alternatives
    /// (e.g., `"north|south"`). Empty segments are kept.
    pub fn property(name: impl Into<String>, values: &str) -> Self {
        Condition::Property {
            name: name.into(),
            values: values.split('|').map(str::to_string).collect(),
        }
    }

    /// Check if the condition matches the given block properties.
    pub fn matches<P: PropertyBag + ?Sized>(&self, properties: &P) -> bool {
        match self {
            Condition::All(children) => children.iter().all(|c| c.matches(properties)),
            Condition::Any(children) => children.iter().any(|c| c.matches(properties)),
            Condition::Property { name, values } => properties
                .property(name)
                .is_some_and(|actual| values.iter().any(|v| v == actual)),
        }
    }

    /// Parse a variant key such as `"facing=north,half=bottom"`.
    ///
    /// The empty key matches every state. Entries without `=` are ignored,
    /// which keeps legacy keys like `"normal"` matching everything.
    pub fn from_variant_key(key: &str) -> Self {
        let properties = key
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, value)| Condition::property(name.trim(), value.trim()))
            .collect();
        Condition::and(properties)
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::always()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All(children) if children.is_empty() => f.write_str("true"),
            Condition::Any(children) if children.is_empty() => f.write_str("false"),
            Condition::All(children) => write_list(f, "AND", children),
            Condition::Any(children) => write_list(f, "OR", children),
            Condition::Property { name, values } => write!(f, "{}={}", name, values.join("|")),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, op: &str, children: &[Condition]) -> fmt::Result {
    write!(f, "{}(", op)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", child)?;
    }
    f.write_str(")")
}
