//! Shared types used throughout the library.

use std::collections::{BTreeMap, HashMap};

/// Read-only access to the named properties of a block.
///
/// Conditions only ever look properties up by name, so anything that can
/// answer "what is the value of `facing`?" can be evaluated against.
pub trait PropertyBag {
    /// Get the value of a property, or `None` if the block does not have it.
    fn property(&self, name: &str) -> Option<&str>;
}

impl PropertyBag for HashMap<String, String> {
    fn property(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl PropertyBag for BTreeMap<String, String> {
    fn property(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: PropertyBag + ?Sized> PropertyBag for &T {
    fn property(&self, name: &str) -> Option<&str> {
        (**self).property(name)
    }
}

/// A block position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// A block with its state, e.g. `minecraft:oak_fence[north=true]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBlock {
    /// Block name, e.g., "minecraft:stone"
    pub name: String,
    /// Block properties, e.g., {"facing": "north"}
    pub properties: HashMap<String, String>,
}

impl InputBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl PropertyBag for InputBlock {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties.property(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_block_properties() {
        let block = InputBlock::new("minecraft:oak_fence").with_property("north", "true");
        assert_eq!(block.property("north"), Some("true"));
        assert_eq!(block.property("south"), None);
    }

    #[test]
    fn test_btree_map_bag() {
        let props: BTreeMap<String, String> =
            [("axis".to_string(), "y".to_string())].into_iter().collect();
        assert_eq!(props.property("axis"), Some("y"));
        assert_eq!((&props).property("facing"), None);
    }
}
