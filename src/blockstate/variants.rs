//! The "variants" blockstate format.
//!
//! Keys are property lists like `"facing=north,half=bottom"`; the first entry
//! (in document order) whose key matches the block is used.

use super::condition::Condition;
use super::variant::{ApplyVariants, ModelVariant, VariantSet};
use crate::types::PropertyBag;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// One keyed entry of a variants definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantEntry {
    /// The key as written in the document.
    pub key: String,
    pub condition: Condition,
    pub apply: VariantSet,
}

/// Keyed variants, kept in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variants {
    entries: Vec<VariantEntry>,
}

impl Variants {
    pub fn entries(&self) -> &[VariantEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry matching the block.
    pub fn find<P: PropertyBag + ?Sized>(&self, properties: &P) -> Option<&VariantEntry> {
        self.entries
            .iter()
            .find(|entry| entry.condition.matches(properties))
    }

    /// Emit the variant of the first matching entry for the block at (x, y, z).
    pub fn for_each<P, F>(&self, block: &P, x: i32, y: i32, z: i32, mut sink: F)
    where
        P: PropertyBag + ?Sized,
        F: FnMut(&ModelVariant),
    {
        if let Some(entry) = self.find(block) {
            entry.apply.emit(x, y, z, &mut sink);
        }
    }
}

impl<'de> Deserialize<'de> for Variants {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VariantsVisitor;

        impl<'de> Visitor<'de> for VariantsVisitor {
            type Value = Variants;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property keys to variants")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Variants, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, apply)) = map.next_entry::<String, VariantSet>()? {
                    entries.push(VariantEntry {
                        condition: Condition::from_variant_key(&key),
                        key,
                        apply,
                    });
                }
                Ok(Variants { entries })
            }
        }

        deserializer.deserialize_map(VariantsVisitor)
    }
}
