//! Blockstate definition parsing and evaluation.
//!
//! Blockstates define how block properties map to model variants.
//! There are two formats: "variants" (first matching key wins) and
//! "multipart" (every matching case contributes).

pub mod condition;
pub mod multipart;
pub mod parser;
pub mod variant;
pub mod variants;

#[cfg(test)]
mod property_tests;

pub use condition::{Condition, PropertyValues};
pub use multipart::{Multipart, Part};
pub use parser::{
    parse_multipart, parse_multipart_reader, parse_multipart_with, ParserConfig, COMMENT_KEY,
    DEFAULT_MAX_CONDITION_DEPTH,
};
pub use variant::{ApplyVariants, ModelVariant, VariantSet};
pub use variants::{VariantEntry, Variants};

use crate::types::{BlockPosition, PropertyBag};
use serde::Deserialize;

/// A blockstate definition from blockstates/*.json.
///
/// Both sections may be present; variants are evaluated before multipart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlockstateDefinition {
    #[serde(default)]
    pub variants: Option<Variants>,
    #[serde(default)]
    pub multipart: Option<Multipart>,
}

impl BlockstateDefinition {
    /// Emit every variant selected for the block at (x, y, z).
    pub fn for_each<P, F>(&self, block: &P, x: i32, y: i32, z: i32, mut sink: F)
    where
        P: PropertyBag + ?Sized,
        F: FnMut(&ModelVariant),
    {
        if let Some(variants) = &self.variants {
            variants.for_each(block, x, y, z, &mut sink);
        }
        if let Some(multipart) = &self.multipart {
            multipart.for_each(block, x, y, z, &mut sink);
        }
    }

    /// Collect the model variants for a block at a position.
    pub fn resolve<P: PropertyBag + ?Sized>(
        &self,
        block: &P,
        position: BlockPosition,
    ) -> Vec<ModelVariant> {
        let mut result = Vec::new();
        self.for_each(block, position.x, position.y, position.z, |variant| {
            result.push(variant.clone())
        });
        result
    }

    pub fn is_empty(&self) -> bool {
        self.variants.as_ref().map_or(true, Variants::is_empty)
            && self.multipart.as_ref().map_or(true, Multipart::is_empty)
    }
}
