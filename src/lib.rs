//! # Blockstate Multipart
//!
//! A Rust library for parsing and evaluating Minecraft blockstate definitions,
//! with a focus on the conditional "multipart" format.
//!
//! ## Overview
//!
//! A multipart definition is a list of cases. Each case has an optional
//! `when` condition and an `apply` payload; every case whose condition holds
//! for a block contributes its variants, in document order.
//!
//! ## Quick Start
//!
//! ```
//! use blockstate_multipart::{parse_multipart, InputBlock, ModelVariant, Multipart};
//!
//! let multipart: Multipart = parse_multipart(r#"[
//!     { "apply": { "model": "block/oak_fence_post" } },
//!     { "when": { "north": "true" }, "apply": { "model": "block/oak_fence_side" } }
//! ]"#)?;
//!
//! let block = InputBlock::new("minecraft:oak_fence").with_property("north", "true");
//! let mut models = Vec::new();
//! multipart.for_each(&block, 0, 64, 0, |v: &ModelVariant| models.push(v.model.clone()));
//! assert_eq!(models, ["block/oak_fence_post", "block/oak_fence_side"]);
//! # Ok::<(), blockstate_multipart::MultipartError>(())
//! ```
//!
//! ## Custom payloads
//!
//! The `apply` value can be any `serde` type. Implement [`ApplyVariants`] for
//! it to use [`Multipart::for_each`]:
//!
//! ```ignore
//! let multipart: Multipart<MyGeometry> = parse_multipart(json)?;
//! ```

pub mod blockstate;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use blockstate::{
    parse_multipart, parse_multipart_reader, parse_multipart_with, ApplyVariants,
    BlockstateDefinition, Condition, ModelVariant, Multipart, Part, ParserConfig, VariantSet,
    Variants,
};
pub use error::{MultipartError, Result, SourcePosition};
pub use types::{BlockPosition, InputBlock, PropertyBag};

/// Load a blockstate definition from a JSON string.
pub fn load_blockstate(json: &str) -> Result<BlockstateDefinition> {
    serde_json::from_str(json).map_err(MultipartError::from_structure)
}

/// Load a blockstate definition from JSON bytes.
pub fn load_blockstate_from_slice(data: &[u8]) -> Result<BlockstateDefinition> {
    serde_json::from_slice(data).map_err(MultipartError::from_structure)
}
