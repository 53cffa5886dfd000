//! Model variants applied by blockstates.

use serde::{Deserialize, Deserializer, Serialize};

/// A payload that contributes model variants for a block at a position.
///
/// Multipart parts hold one of these as their `apply` value.
pub trait ApplyVariants {
    type Variant;

    /// Hand the variants selected for the block at (x, y, z) to `sink`.
    fn emit<F>(&self, x: i32, y: i32, z: i32, sink: &mut F)
    where
        F: FnMut(&Self::Variant);
}

/// A model variant reference with optional rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVariant {
    /// Model resource location (e.g., "block/stone" or "minecraft:block/stone").
    pub model: String,
    /// X rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub x: i32,
    /// Y rotation in degrees (0, 90, 180, 270).
    #[serde(default)]
    pub y: i32,
    /// If true, UV coordinates don't rotate with the block.
    #[serde(default)]
    pub uvlock: bool,
    /// Weight for random selection (default 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl ModelVariant {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            x: 0,
            y: 0,
            uvlock: false,
            weight: 1,
        }
    }

    pub fn with_rotation(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Get the full resource location for the model.
    pub fn model_location(&self) -> String {
        if self.model.contains(':') {
            self.model.clone()
        } else {
            format!("minecraft:{}", self.model)
        }
    }
}

/// One or more weighted variants; a single one is picked per block position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct VariantSet {
    variants: Vec<ModelVariant>,
}

/// A variant value can be a single model or an array of weighted models.
#[derive(Deserialize)]
#[serde(untagged)]
enum VariantValue {
    Single(ModelVariant),
    Multiple(Vec<ModelVariant>),
}

impl<'de> Deserialize<'de> for VariantSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let variants = match VariantValue::deserialize(deserializer)? {
            VariantValue::Single(v) => vec![v],
            VariantValue::Multiple(v) => v,
        };
        Ok(Self { variants })
    }
}

/// Seed mixed into the position hash used for weighted selection.
const SELECTION_SEED: i64 = 827_364;

impl VariantSet {
    pub fn new(variants: Vec<ModelVariant>) -> Self {
        Self { variants }
    }

    pub fn variants(&self) -> &[ModelVariant] {
        &self.variants
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    fn total_weight(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.weight)).sum()
    }

    /// Pick the variant for a block position. The same position always
    /// yields the same variant.
    pub fn select(&self, x: i32, y: i32, z: i32) -> Option<&ModelVariant> {
        match self.variants.as_slice() {
            [] => None,
            [only] => Some(only),
            variants => {
                let total = self.total_weight();
                if total == 0 {
                    return variants.first();
                }
                let mut selection = f64::from(hash_to_unit(x, y, z, SELECTION_SEED)) * total as f64;
                for variant in variants {
                    selection -= f64::from(variant.weight);
                    if selection < 0.0 {
                        return Some(variant);
                    }
                }
                variants.last()
            }
        }
    }
}

impl ApplyVariants for VariantSet {
    type Variant = ModelVariant;

    fn emit<F>(&self, x: i32, y: i32, z: i32, sink: &mut F)
    where
        F: FnMut(&ModelVariant),
    {
        if let Some(variant) = self.select(x, y, z) {
            sink(variant);
        }
    }
}

/// Hash a block position to a float in `[0, 1)`.
///
/// The coordinate products wrap at 32 bits before widening; rendering
/// elsewhere relies on the exact same picks.
fn hash_to_unit(x: i32, y: i32, z: i32, seed: i64) -> f32 {
    let position = x.wrapping_mul(73_428_767)
        ^ y.wrapping_mul(9_122_569)
        ^ z.wrapping_mul(4_382_893);
    let hash = i64::from(position) ^ seed.wrapping_mul(457);
    let mixed = hash.wrapping_mul(hash.wrapping_add(456_149)) & 0x00ff_ffff;
    mixed as f32 / 0x0100_0000 as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(set: &VariantSet, x: i32, y: i32, z: i32) -> Vec<String> {
        let mut out = Vec::new();
        set.emit(x, y, z, &mut |v: &ModelVariant| out.push(v.model.clone()));
        out
    }

    #[test]
    fn test_parse_single_and_array() {
        let single: VariantSet =
            serde_json::from_str(r#"{ "model": "block/fence_post" }"#).unwrap();
        assert_eq!(single.variants().len(), 1);
        assert_eq!(single.variants()[0].weight, 1);

        let multiple: VariantSet = serde_json::from_str(
            r#"[
                { "model": "block/stone", "weight": 10 },
                { "model": "block/stone_mirrored", "y": 90, "weight": 5 }
            ]"#,
        )
        .unwrap();
        assert_eq!(multiple.variants().len(), 2);
        assert_eq!(multiple.variants()[1].y, 90);
    }

    #[test]
    fn test_model_location() {
        assert_eq!(
            ModelVariant::new("block/stone").model_location(),
            "minecraft:block/stone"
        );
        assert_eq!(
            ModelVariant::new("mymod:block/lamp").model_location(),
            "mymod:block/lamp"
        );
    }

    #[test]
    fn test_emit_single() {
        let set = VariantSet::new(vec![ModelVariant::new("block/stone")]);
        assert_eq!(collect(&set, 5, 64, -3), vec!["block/stone"]);
    }

    #[test]
    fn test_emit_empty() {
        assert!(collect(&VariantSet::default(), 0, 0, 0).is_empty());
    }

    #[test]
    fn test_weighted_selection_is_deterministic() {
        let set = VariantSet::new(vec![
            ModelVariant::new("block/a"),
            ModelVariant::new("block/b"),
            ModelVariant::new("block/c"),
        ]);
        for x in -8..8 {
            for z in -8..8 {
                let first = collect(&set, x, 70, z);
                assert_eq!(first.len(), 1);
                assert_eq!(first, collect(&set, x, 70, z));
            }
        }
    }

    #[test]
    fn test_weighted_selection_spreads() {
        let set = VariantSet::new(vec![
            ModelVariant::new("block/a"),
            ModelVariant::new("block/b"),
        ]);
        let mut seen = std::collections::HashSet::new();
        for x in 0..64 {
            seen.extend(collect(&set, x, 0, 0));
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let set = VariantSet::new(vec![
            ModelVariant::new("block/never").with_weight(0),
            ModelVariant::new("block/always"),
        ]);
        for x in 0..64 {
            assert_eq!(collect(&set, x, x, -x), vec!["block/always"]);
        }
    }

    #[test]
    fn test_hash_wraps_coordinates_at_32_bits() {
        // 30 * 73428767 overflows i32; the wrapped product must be used.
        let wrapped = 30i32.wrapping_mul(73_428_767);
        assert_ne!(i64::from(wrapped), 30i64 * 73_428_767);

        let hash = i64::from(wrapped) ^ SELECTION_SEED * 457;
        let expected =
            (hash.wrapping_mul(hash.wrapping_add(456_149)) & 0x00ff_ffff) as f32 / 0x0100_0000 as f32;
        assert_eq!(hash_to_unit(30, 0, 0, SELECTION_SEED), expected);

        let far = hash_to_unit(-1_000_000, 300, 29_999_999, SELECTION_SEED);
        assert!((0.0..1.0).contains(&far));
    }

    #[test]
    fn test_hash_to_unit_range() {
        for x in -100..100 {
            let v = hash_to_unit(x, x * 3, -x, SELECTION_SEED);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
