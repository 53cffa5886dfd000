//! Multipart blockstates.
//!
//! A multipart definition is an ordered list of parts, each pairing a
//! condition with the variants it applies. Every part whose condition holds
//! contributes to the block, so a fence gets its post plus one side per
//! connected neighbour.

use super::condition::Condition;
use super::variant::{ApplyVariants, VariantSet};
use crate::types::PropertyBag;

/// A single conditional entry of a multipart definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<V> {
    /// When this part applies. Parts without a `when` use [`Condition::always`].
    pub condition: Condition,
    /// Variants contributed when the condition matches.
    pub apply: V,
}

impl<V> Part<V> {
    pub fn new(condition: Condition, apply: V) -> Self {
        Self { condition, apply }
    }

    /// Check if this part applies to the given block properties.
    pub fn applies_to<P: PropertyBag + ?Sized>(&self, properties: &P) -> bool {
        self.condition.matches(properties)
    }
}

/// An ordered list of conditional parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart<V = VariantSet> {
    parts: Vec<Part<V>>,
}

impl<V> Default for Multipart<V> {
    fn default() -> Self {
        Self { parts: Vec::new() }
    }
}

impl<V> Multipart<V> {
    pub fn from_parts(parts: Vec<Part<V>>) -> Self {
        Self { parts }
    }

    /// All parts, in document order.
    pub fn parts(&self) -> &[Part<V>] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Part<V>> {
        self.parts.iter()
    }

    /// Parts whose condition matches, in document order.
    pub fn matching_parts<'a, P: PropertyBag + ?Sized>(
        &'a self,
        properties: &'a P,
    ) -> impl Iterator<Item = &'a Part<V>> + 'a {
        self.parts.iter().filter(move |part| part.applies_to(properties))
    }
}

impl<V: ApplyVariants> Multipart<V> {
    /// Emit the variants of every matching part for the block at (x, y, z).
    pub fn for_each<P, F>(&self, block: &P, x: i32, y: i32, z: i32, mut sink: F)
    where
        P: PropertyBag + ?Sized,
        F: FnMut(&V::Variant),
    {
        for part in &self.parts {
            if part.applies_to(block) {
                part.apply.emit(x, y, z, &mut sink);
            }
        }
    }
}

impl<'a, V> IntoIterator for &'a Multipart<V> {
    type Item = &'a Part<V>;
    type IntoIter = std::slice::Iter<'a, Part<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
